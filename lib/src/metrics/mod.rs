//! Classification metrics computed on the held-out partition.
//!
//! Averaging follows the usual conventions: `weighted` averages per-class
//! scores by support, `macro` is the plain mean. Classes that appear neither in
//! the truth nor in the predictions are left out of both averages and of the
//! report, but keep their row and column in the confusion matrix. A score with
//! a zero denominator is 0.

use crate::error::{ObesityError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fraction of exact matches.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// `matrix[true][predicted]` counts over `n_classes` labels.
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Vec<Vec<usize>> {
    let mut matrix = vec![vec![0; n_classes]; n_classes];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        if t < n_classes && p < n_classes {
            matrix[t][p] += 1;
        }
    }
    matrix
}

fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Per-class scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// An averaged row of the report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaging mode for multiclass scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Average {
    Macro,
    Weighted,
}

/// Per-class breakdown plus averages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

impl ClassificationReport {
    fn from_confusion(matrix: &[Vec<usize>], labels: &[String]) -> Self {
        let n = labels.len();
        let total: usize = matrix.iter().flatten().sum();
        let correct: usize = (0..n).map(|i| matrix[i][i]).sum();

        let mut classes = Vec::new();
        for (k, label) in labels.iter().enumerate() {
            let tp = matrix[k][k] as f64;
            let support: usize = matrix[k].iter().sum();
            let predicted: usize = matrix.iter().map(|row| row[k]).sum();
            if support == 0 && predicted == 0 {
                continue;
            }
            let precision = safe_div(tp, predicted as f64);
            let recall = safe_div(tp, support as f64);
            let f1 = safe_div(2.0 * precision * recall, precision + recall);
            classes.push(ClassMetrics {
                label: label.clone(),
                precision,
                recall,
                f1,
                support,
            });
        }

        Self {
            accuracy: safe_div(correct as f64, total as f64),
            macro_avg: average(&classes, Average::Macro),
            weighted_avg: average(&classes, Average::Weighted),
            classes,
        }
    }

    pub fn average(&self, mode: Average) -> &AverageMetrics {
        match mode {
            Average::Macro => &self.macro_avg,
            Average::Weighted => &self.weighted_avg,
        }
    }
}

fn average(classes: &[ClassMetrics], mode: Average) -> AverageMetrics {
    let support: usize = classes.iter().map(|c| c.support).sum();
    let weight = |c: &ClassMetrics| match mode {
        Average::Macro => 1.0,
        Average::Weighted => c.support as f64,
    };
    let denom: f64 = classes.iter().map(weight).sum();
    let mean = |f: fn(&ClassMetrics) -> f64| {
        safe_div(classes.iter().map(|c| weight(c) * f(c)).sum(), denom)
    };
    AverageMetrics {
        precision: mean(|c| c.precision),
        recall: mean(|c| c.recall),
        f1: mean(|c| c.f1),
        support,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.weighted_avg.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        Ok(())
    }
}

/// Everything a training run reports about its held-out partition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    pub accuracy: f64,
    /// Support-weighted precision.
    pub precision: f64,
    /// Support-weighted recall.
    pub recall: f64,
    /// Support-weighted F1.
    pub f1: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    /// Rows are true classes, columns predicted, both in label order.
    pub confusion_matrix: Vec<Vec<usize>>,
    pub report: ClassificationReport,
}

impl MetricsBundle {
    /// Compute all metrics for class indices into `labels`.
    ///
    /// # Errors
    /// - [`ObesityError::EmptyData`] when there are no samples
    /// - [`ObesityError::InvalidParameter`] on a length mismatch or an index outside `labels`
    pub fn compute(y_true: &[usize], y_pred: &[usize], labels: &[String]) -> Result<Self> {
        if y_true.is_empty() {
            return Err(ObesityError::EmptyData(
                "Cannot compute metrics without samples".to_string(),
            ));
        }
        if y_true.len() != y_pred.len() {
            return Err(ObesityError::InvalidParameter(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }
        if let Some(bad) = y_true.iter().chain(y_pred).find(|&&c| c >= labels.len()) {
            return Err(ObesityError::InvalidParameter(format!(
                "class index {} out of range for {} labels",
                bad,
                labels.len()
            )));
        }

        let confusion_matrix = confusion_matrix(y_true, y_pred, labels.len());
        let report = ClassificationReport::from_confusion(&confusion_matrix, labels);

        Ok(Self {
            accuracy: accuracy(y_true, y_pred),
            precision: report.weighted_avg.precision,
            recall: report.weighted_avg.recall,
            f1: report.weighted_avg.f1,
            macro_precision: report.macro_avg.precision,
            macro_recall: report.macro_avg.recall,
            macro_f1: report.macro_avg.f1,
            confusion_matrix,
            report,
        })
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Value of `metric`.
    pub fn score(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Accuracy => self.accuracy,
            Metric::F1Weighted => self.f1,
            Metric::RecallWeighted => self.recall,
            Metric::PrecisionWeighted => self.precision,
            Metric::F1Macro => self.macro_f1,
        }
    }
}

/// Scalar scores used for cross-validation and model selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
    F1Weighted,
    RecallWeighted,
    PrecisionWeighted,
    F1Macro,
}

impl Metric {
    /// The metrics reported by cross-validation, in report order.
    pub const REPORTED: [Metric; 4] = [
        Metric::Accuracy,
        Metric::F1Weighted,
        Metric::RecallWeighted,
        Metric::PrecisionWeighted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::F1Weighted => "f1_weighted",
            Metric::RecallWeighted => "recall_weighted",
            Metric::PrecisionWeighted => "precision_weighted",
            Metric::F1Macro => "f1_macro",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ObesityError;

    fn from_str(s: &str) -> Result<Self> {
        [
            Metric::Accuracy,
            Metric::F1Weighted,
            Metric::RecallWeighted,
            Metric::PrecisionWeighted,
            Metric::F1Macro,
        ]
        .into_iter()
        .find(|m| m.as_str() == s)
        .ok_or_else(|| ObesityError::InvalidParameter(format!("unknown metric '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("class_{}", i)).collect()
    }

    #[test]
    fn test_accuracy_and_confusion() {
        let y_true = [0, 0, 1, 1, 2];
        let y_pred = [0, 1, 1, 1, 0];
        assert!((accuracy(&y_true, &y_pred) - 0.6).abs() < 1e-12);
        let cm = confusion_matrix(&y_true, &y_pred, 3);
        assert_eq!(cm, vec![vec![1, 1, 0], vec![0, 2, 0], vec![1, 0, 0]]);
    }

    #[test]
    fn test_bundle_weighted_and_macro() {
        // class 0: tp 1, support 2, predicted 2 -> p .5 r .5 f1 .5
        // class 1: tp 2, support 2, predicted 3 -> p 2/3 r 1 f1 .8
        // class 2: tp 0, support 1, predicted 0 -> 0 0 0
        let y_true = [0, 0, 1, 1, 2];
        let y_pred = [0, 1, 1, 1, 0];
        let m = MetricsBundle::compute(&y_true, &y_pred, &labels(3)).unwrap();

        let macro_f1 = (0.5 + 0.8 + 0.0) / 3.0;
        let weighted_f1 = (0.5 * 2.0 + 0.8 * 2.0) / 5.0;
        assert!((m.macro_f1 - macro_f1).abs() < 1e-12);
        assert!((m.f1 - weighted_f1).abs() < 1e-12);
        assert!((m.precision - (0.5 * 2.0 + 2.0 / 3.0 * 2.0) / 5.0).abs() < 1e-12);
        assert!((m.recall - 0.6).abs() < 1e-12);
        assert_eq!(m.report.weighted_avg.support, 5);
    }

    #[test]
    fn test_absent_class_is_skipped_in_report() {
        let m = MetricsBundle::compute(&[0, 1], &[0, 1], &labels(4)).unwrap();
        assert_eq!(m.report.classes.len(), 2);
        assert_eq!(m.confusion_matrix.len(), 4);
        assert_eq!(m.macro_f1, 1.0);
    }

    #[test]
    fn test_compute_rejects_bad_input() {
        assert!(matches!(
            MetricsBundle::compute(&[], &[], &labels(2)),
            Err(ObesityError::EmptyData(_))
        ));
        assert!(MetricsBundle::compute(&[0, 1], &[0], &labels(2)).is_err());
        assert!(MetricsBundle::compute(&[0, 5], &[0, 1], &labels(2)).is_err());
    }

    #[test]
    fn test_report_display() {
        let m = MetricsBundle::compute(&[0, 1, 1], &[0, 1, 0], &labels(2)).unwrap();
        let text = m.report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("class_1"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("accuracy"));
    }

    #[test]
    fn test_metric_names() {
        assert_eq!("f1_weighted".parse::<Metric>().unwrap(), Metric::F1Weighted);
        assert!("auc".parse::<Metric>().is_err());
        let m = MetricsBundle::compute(&[0, 1], &[0, 0], &labels(2)).unwrap();
        assert_eq!(m.score(Metric::Accuracy), 0.5);
        assert!(m.to_json().unwrap().contains("confusion_matrix"));
    }
}
