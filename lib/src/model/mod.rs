//! Classifiers for the obesity levels.
//!
//! This module splits every estimator into two states:
//! - [`Classifier`]: hyperparameters only; `fit` consumes training data.
//! - [`FittedClassifier`]: inference-only, serializable predictor free of
//!   training state.
//!
//! Built-in estimators:
//!
//! | Estimator | Fitted | Notes |
//! |-----------|--------|-------|
//! | [`DecisionTreeClassifier`] | [`FittedDecisionTree`] | CART, Gini impurity |
//! | [`RandomForestClassifier`] | [`FittedRandomForest`] | bagging, sqrt feature sampling |
//! | [`GradientBoostingClassifier`] | [`FittedGradientBoosting`] | XGBoost-style softmax boosting |
//!
//! [`EstimatorConfig`] / [`FittedEstimator`] wrap the built-ins so a trained
//! model can be stored without knowing its concrete type.

pub mod boosting;
pub mod forest;
pub mod tree;

pub use boosting::{FittedGradientBoosting, GradientBoostingClassifier};
pub use forest::{FittedRandomForest, RandomForestClassifier};
pub use tree::{DecisionTreeClassifier, FittedDecisionTree, MaxFeatures, Node, Tree};

use crate::error::{ObesityError, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// An unfitted estimator.
pub trait Classifier {
    type Fitted: FittedClassifier;

    /// Fit on a preprocessed feature matrix and class indices in `0..n_classes`.
    ///
    /// # Errors
    /// - [`ObesityError::EmptyData`] when `x` has no rows
    /// - [`ObesityError::InvalidParameter`] for mismatched lengths, a bad label
    ///   or a bad hyperparameter
    fn fit(&self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<Self::Fitted>;

    /// Short name used for logging and default model file names.
    fn name(&self) -> &'static str;
}

/// A fitted estimator ready for inference.
pub trait FittedClassifier {
    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize;

    /// Per-class scores, one row per sample; every row sums to 1.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Most likely class per row. Ties go to the lower class index.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.rows().into_iter().map(|row| argmax(row.iter())).collect())
    }

    /// Structural check after deserialization.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn check_features(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features() {
            return Err(ObesityError::FeatureMismatch {
                expected_features: self.n_features(),
                got_features: x.ncols(),
            });
        }
        Ok(())
    }
}

/// Index of the largest value; the first one wins ties.
pub fn argmax<'a>(values: impl Iterator<Item = &'a f64>) -> usize {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, &v) in values.enumerate() {
        if v > best.1 {
            best = (i, v);
        }
    }
    best.0
}

/// Row-wise softmax.
pub(crate) fn softmax_in_place(margins: &mut Array2<f64>) {
    for mut row in margins.axis_iter_mut(Axis(0)) {
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|m| (m - max).exp());
        let sum = row.sum();
        row /= sum;
    }
}

pub(crate) fn check_fit_inputs(x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<()> {
    if x.nrows() == 0 {
        return Err(ObesityError::EmptyData(
            "Cannot fit a classifier on empty data".to_string(),
        ));
    }
    if x.nrows() != y.len() {
        return Err(ObesityError::InvalidParameter(format!(
            "{} feature rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    if n_classes < 2 {
        return Err(ObesityError::InvalidParameter(
            "at least two classes are required".to_string(),
        ));
    }
    if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
        return Err(ObesityError::InvalidParameter(format!(
            "label {} out of range for {} classes",
            bad, n_classes
        )));
    }
    Ok(())
}

/// Serializable choice of built-in estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorConfig {
    DecisionTree(DecisionTreeClassifier),
    RandomForest(RandomForestClassifier),
    GradientBoosting(GradientBoostingClassifier),
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig::GradientBoosting(GradientBoostingClassifier::default())
    }
}

impl From<DecisionTreeClassifier> for EstimatorConfig {
    fn from(model: DecisionTreeClassifier) -> Self {
        EstimatorConfig::DecisionTree(model)
    }
}

impl From<RandomForestClassifier> for EstimatorConfig {
    fn from(model: RandomForestClassifier) -> Self {
        EstimatorConfig::RandomForest(model)
    }
}

impl From<GradientBoostingClassifier> for EstimatorConfig {
    fn from(model: GradientBoostingClassifier) -> Self {
        EstimatorConfig::GradientBoosting(model)
    }
}

impl Classifier for EstimatorConfig {
    type Fitted = FittedEstimator;

    fn fit(&self, x: &Array2<f64>, y: &[usize], n_classes: usize) -> Result<Self::Fitted> {
        Ok(match self {
            EstimatorConfig::DecisionTree(m) => {
                FittedEstimator::DecisionTree(m.fit(x, y, n_classes)?)
            }
            EstimatorConfig::RandomForest(m) => {
                FittedEstimator::RandomForest(m.fit(x, y, n_classes)?)
            }
            EstimatorConfig::GradientBoosting(m) => {
                FittedEstimator::GradientBoosting(m.fit(x, y, n_classes)?)
            }
        })
    }

    fn name(&self) -> &'static str {
        match self {
            EstimatorConfig::DecisionTree(m) => m.name(),
            EstimatorConfig::RandomForest(m) => m.name(),
            EstimatorConfig::GradientBoosting(m) => m.name(),
        }
    }
}

/// Any fitted built-in estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FittedEstimator {
    DecisionTree(FittedDecisionTree),
    RandomForest(FittedRandomForest),
    GradientBoosting(FittedGradientBoosting),
}

impl FittedEstimator {
    fn inner(&self) -> &dyn FittedClassifier {
        match self {
            FittedEstimator::DecisionTree(m) => m,
            FittedEstimator::RandomForest(m) => m,
            FittedEstimator::GradientBoosting(m) => m,
        }
    }

    /// Estimator kind, as in [`Classifier::name`].
    pub fn kind(&self) -> &'static str {
        match self {
            FittedEstimator::DecisionTree(_) => "decision_tree",
            FittedEstimator::RandomForest(_) => "random_forest",
            FittedEstimator::GradientBoosting(_) => "xgb_boosting",
        }
    }
}

impl FittedClassifier for FittedEstimator {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn n_classes(&self) -> usize {
        self.inner().n_classes()
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.inner().predict_proba(x)
    }

    fn validate(&self) -> Result<()> {
        self.inner().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::SerializableParams;
    use ndarray::array;

    #[test]
    fn test_argmax_first_wins_ties() {
        assert_eq!(argmax([0.2, 0.4, 0.4].iter()), 1);
        assert_eq!(argmax([0.9].iter()), 0);
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let mut m = array![[0.0, 0.0], [1000.0, 0.0]];
        softmax_in_place(&mut m);
        assert!((m[[0, 0]] - 0.5).abs() < 1e-12);
        assert!((m[[1, 0]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_check_fit_inputs() {
        let x = array![[1.0], [2.0]];
        assert!(check_fit_inputs(&x, &[0, 1], 2).is_ok());
        assert!(matches!(
            check_fit_inputs(&x, &[0], 2),
            Err(ObesityError::InvalidParameter(_))
        ));
        assert!(matches!(
            check_fit_inputs(&x, &[0, 2], 2),
            Err(ObesityError::InvalidParameter(_))
        ));
        assert!(matches!(
            check_fit_inputs(&Array2::zeros((0, 1)), &[], 2),
            Err(ObesityError::EmptyData(_))
        ));
    }

    #[test]
    fn test_estimator_config_json() {
        let config: EstimatorConfig =
            serde_json::from_str(r#"{"kind":"random_forest","n_estimators":10,"max_depth":null,"min_samples_split":2,"min_samples_leaf":1,"max_features":"Sqrt","bootstrap":true,"seed":1}"#)
                .unwrap();
        assert_eq!(
            config,
            EstimatorConfig::RandomForest(RandomForestClassifier::new().n_estimators(10).seed(1))
        );
        assert_eq!(config.name(), "random_forest");
    }

    #[test]
    fn test_fitted_estimator_bytes_roundtrip() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = [0, 0, 1, 1];
        let fitted = EstimatorConfig::from(DecisionTreeClassifier::new())
            .fit(&x, &y, 2)
            .unwrap();
        let restored = FittedEstimator::from_bytes(&fitted.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, fitted);
        assert!(restored.validate().is_ok());
        assert_eq!(restored.predict(&x).unwrap(), y.to_vec());
        assert_eq!(restored.kind(), "decision_tree");
    }
}
