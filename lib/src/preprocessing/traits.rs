//! Core traits for preprocessing transformers.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: Used during fitting; has hyperparameters and can learn from data.
//! - [`FittedTransformer`]: After fitting; ready for inference and serialization.
//!
//! Both operate on encoded feature matrices of shape `(n_samples, n_features)`.

use crate::error::ObesityError;
use crate::serialization::SerializableParams;
use ndarray::Array2;

/// Trait for unfitted transformers with hyperparameters.
///
/// A transformer learns parameters from training data and can then transform
/// new data using those learned parameters. This trait represents the
/// configurable, unfitted state.
///
/// # Example
/// ```ignore
/// use obesity_risk::preprocessing::{Transformer, StandardScaler};
///
/// let scaler = StandardScaler::new();
/// let fitted = scaler.fit(&train)?;
/// let transformed = fitted.transform(&test)?;
/// ```
pub trait Transformer: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Params = Self::Params>;

    /// Fit the transformer to the training data.
    ///
    /// # Errors
    /// Returns [`ObesityError::EmptyData`] when `data` has no rows.
    fn fit(&self, data: &Array2<f64>) -> Result<Self::Fitted, ObesityError>;

    /// Fit the transformer and transform the data in one step.
    fn fit_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, ObesityError> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// Trait for fitted transformers ready for inference.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` is a round-trip.
/// - `transform` is a pure function of the learned parameters and its input.
pub trait FittedTransformer: Clone {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Transform data using learned parameters.
    ///
    /// # Errors
    /// Returns [`ObesityError::FeatureMismatch`] if the column count differs from fit time.
    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, ObesityError>;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted transformer from parameters.
    fn from_params(params: Self::Params) -> Result<Self, ObesityError>
    where
        Self: Sized;

    /// Returns the number of features seen during fit.
    fn n_features_in(&self) -> usize;

    /// Check the column count of `data` against the fit-time width.
    fn check_features(&self, data: &Array2<f64>) -> Result<(), ObesityError> {
        if data.ncols() != self.n_features_in() {
            return Err(ObesityError::FeatureMismatch {
                expected_features: self.n_features_in(),
                got_features: data.ncols(),
            });
        }
        Ok(())
    }
}
