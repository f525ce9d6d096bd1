//! Median imputation of empty numeric answers.
//!
//! NaN marks a missing value. Only the survey CSV loader produces one, for an
//! empty numeric cell, so the imputer fills gaps in training data; inference
//! rejects incomplete records before they reach the preprocessor.

use crate::error::ObesityError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Serializable parameters for a fitted SimpleImputer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimpleImputerParams {
    /// Fill value (training median) for each feature.
    pub statistics: Vec<f64>,
}

/// Fills NaN with the per-column median of the data it was fitted on.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleImputer;

impl SimpleImputer {
    pub fn new() -> Self {
        SimpleImputer
    }
}

/// Median of the non-NaN values; 0 for a column with none.
fn column_median(values: impl Iterator<Item = f64>) -> f64 {
    let mut present: Vec<f64> = values.filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return 0.0;
    }
    present.sort_by(f64::total_cmp);
    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        (present[mid - 1] + present[mid]) / 2.0
    } else {
        present[mid]
    }
}

impl Transformer for SimpleImputer {
    type Params = SimpleImputerParams;
    type Fitted = FittedSimpleImputer;

    fn fit(&self, data: &Array2<f64>) -> Result<Self::Fitted, ObesityError> {
        if data.nrows() == 0 {
            return Err(ObesityError::EmptyData(
                "Cannot fit SimpleImputer on empty data".to_string(),
            ));
        }

        Ok(FittedSimpleImputer {
            statistics: data
                .columns()
                .into_iter()
                .map(|column| column_median(column.iter().copied()))
                .collect(),
        })
    }
}

/// Fitted SimpleImputer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedSimpleImputer {
    statistics: Vec<f64>,
}

impl FittedSimpleImputer {
    /// Fill value for each feature.
    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }
}

impl FittedTransformer for FittedSimpleImputer {
    type Params = SimpleImputerParams;

    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, ObesityError> {
        self.check_features(data)?;

        let mut result = data.clone();
        for (mut column, &fill) in result.columns_mut().into_iter().zip(&self.statistics) {
            column.mapv_inplace(|v| if v.is_nan() { fill } else { v });
        }
        Ok(result)
    }

    fn extract_params(&self) -> Self::Params {
        SimpleImputerParams {
            statistics: self.statistics.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, ObesityError> {
        if params.statistics.iter().any(|v| !v.is_finite()) {
            return Err(ObesityError::InvalidParameter(
                "SimpleImputer fill values must be finite".to_string(),
            ));
        }
        Ok(Self {
            statistics: params.statistics,
        })
    }

    fn n_features_in(&self) -> usize {
        self.statistics.len()
    }
}
