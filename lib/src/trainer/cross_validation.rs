//! K-fold cross-validation.
//!
//! Each fold refits the preprocessor on its own training rows, so no statistic
//! leaks from the held-out fold.

use super::{fit_on, kfold_indices, score_on};
use crate::dataset::LabeledDataset;
use crate::encoding::{EncodingScheme, FeatureEncoder};
use crate::error::{ObesityError, Result};
use crate::metrics::{Metric, MetricsBundle};
use crate::model::Classifier;
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cross-validation settings. Defaults: 5 stratified, shuffled folds, seed 42.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationOptions {
    pub n_folds: usize,
    pub shuffle: bool,
    pub seed: u64,
    pub stratify: bool,
    pub scheme: EncodingScheme,
}

impl Default for CrossValidationOptions {
    fn default() -> Self {
        Self {
            n_folds: 5,
            shuffle: true,
            seed: 42,
            stratify: true,
            scheme: EncodingScheme::Full,
        }
    }
}

impl CrossValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_folds(mut self, n: usize) -> Self {
        self.n_folds = n;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn stratify(mut self, stratify: bool) -> Self {
        self.stratify = stratify;
        self
    }

    pub fn scheme(mut self, scheme: EncodingScheme) -> Self {
        self.scheme = scheme;
        self
    }
}

/// Metrics of every fold, in fold order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationResult {
    pub folds: Vec<MetricsBundle>,
}

impl CrossValidationResult {
    /// Per-fold values of `metric`.
    pub fn scores(&self, metric: Metric) -> Vec<f64> {
        self.folds.iter().map(|m| m.score(metric)).collect()
    }

    pub fn mean(&self, metric: Metric) -> f64 {
        let scores = self.scores(metric);
        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().sum::<f64>() / scores.len() as f64
    }

    /// Population standard deviation across folds.
    pub fn std(&self, metric: Metric) -> f64 {
        let scores = self.scores(metric);
        if scores.is_empty() {
            return 0.0;
        }
        let mean = self.mean(metric);
        let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;
        var.sqrt()
    }
}

impl fmt::Display for CrossValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for metric in Metric::REPORTED {
            writeln!(
                f,
                "{}: {:.4} ± {:.4}",
                metric,
                self.mean(metric),
                self.std(metric)
            )?;
        }
        Ok(())
    }
}

/// Cross-validate `estimator` on `dataset`.
///
/// # Errors
/// - [`ObesityError::EmptyData`] for an empty dataset
/// - [`ObesityError::InvalidParameter`] for a fold count outside `2..=n`
pub fn cross_validate<C: Classifier>(
    dataset: &LabeledDataset,
    estimator: &C,
    options: &CrossValidationOptions,
) -> Result<CrossValidationResult> {
    if dataset.is_empty() {
        return Err(ObesityError::EmptyData(
            "Cannot cross-validate on an empty dataset".to_string(),
        ));
    }

    let x = FeatureEncoder::new(options.scheme).encode_batch(dataset.records())?;
    let y = dataset.label_indices();
    let folds = kfold_indices(
        &y,
        options.n_folds,
        options.shuffle,
        options.seed,
        options.stratify,
    )?;

    let mut in_test = vec![false; y.len()];
    let mut results = Vec::with_capacity(folds.len());

    for (k, test_idx) in folds.iter().enumerate() {
        in_test.iter_mut().for_each(|t| *t = false);
        for &i in test_idx {
            in_test[i] = true;
        }
        let train_idx: Vec<usize> = (0..y.len()).filter(|&i| !in_test[i]).collect();

        let x_train = x.select(Axis(0), &train_idx);
        let x_test = x.select(Axis(0), test_idx);
        let y_train: Vec<usize> = train_idx.iter().map(|&i| y[i]).collect();
        let y_test: Vec<usize> = test_idx.iter().map(|&i| y[i]).collect();

        let (preprocessor, fitted) = fit_on(estimator, &x_train, &y_train)?;
        let metrics = score_on(&preprocessor, &fitted, &x_test, &y_test)?;
        log::debug!(
            "Fold {}/{}: accuracy {:.4}",
            k + 1,
            folds.len(),
            metrics.accuracy
        );
        results.push(metrics);
    }

    let result = CrossValidationResult { folds: results };
    for metric in Metric::REPORTED {
        log::info!(
            "{}: {:.4} ± {:.4}",
            metric,
            result.mean(metric),
            result.std(metric)
        );
    }
    Ok(result)
}
