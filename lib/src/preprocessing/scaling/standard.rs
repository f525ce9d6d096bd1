//! Z-score scaling of the encoded survey features.
//!
//! ```text
//! z = (x - u) / s
//! ```
//! `u` is the training mean and `s` the population standard deviation of each
//! column. Constant columns (a one-hot level never seen in training, say)
//! keep `s = 1` so they map to zero instead of NaN.

use crate::error::ObesityError;
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StandardScalerParams {
    pub mean: Vec<f64>,
    /// Always finite and strictly positive.
    pub scale: Vec<f64>,
}

/// StandardScaler transformer (unfitted).
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardScaler;

impl StandardScaler {
    pub fn new() -> Self {
        StandardScaler
    }
}

impl Transformer for StandardScaler {
    type Params = StandardScalerParams;
    type Fitted = FittedStandardScaler;

    fn fit(&self, data: &Array2<f64>) -> Result<Self::Fitted, ObesityError> {
        let mean = data.mean_axis(Axis(0)).ok_or_else(|| {
            ObesityError::EmptyData("Cannot fit StandardScaler on empty data".to_string())
        })?;
        let scale = data
            .std_axis(Axis(0), 0.0)
            .iter()
            .map(|&s| if s > 0.0 && s.is_finite() { s } else { 1.0 })
            .collect();

        Ok(FittedStandardScaler {
            mean: mean.to_vec(),
            scale,
        })
    }
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug)]
pub struct FittedStandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl FittedStandardScaler {
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}

impl FittedTransformer for FittedStandardScaler {
    type Params = StandardScalerParams;

    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, ObesityError> {
        self.check_features(data)?;

        let mut result = data.clone();
        for mut row in result.rows_mut() {
            for ((v, &m), &s) in row.iter_mut().zip(&self.mean).zip(&self.scale) {
                *v = (*v - m) / s;
            }
        }
        Ok(result)
    }

    fn extract_params(&self) -> Self::Params {
        StandardScalerParams {
            mean: self.mean.clone(),
            scale: self.scale.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, ObesityError> {
        if params.mean.len() != params.scale.len() {
            return Err(ObesityError::InvalidParameter(format!(
                "StandardScaler params disagree: {} means vs {} scales",
                params.mean.len(),
                params.scale.len()
            )));
        }
        if params.scale.iter().any(|&s| !(s > 0.0 && s.is_finite())) {
            return Err(ObesityError::InvalidParameter(
                "StandardScaler scale must be finite and positive".to_string(),
            ));
        }
        Ok(Self {
            mean: params.mean,
            scale: params.scale,
        })
    }

    fn n_features_in(&self) -> usize {
        self.mean.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn heights_and_weights() -> Array2<f64> {
        array![[1.60, 60.0], [1.70, 70.0], [1.80, 95.0]]
    }

    #[test]
    fn test_fit_learns_column_means() {
        let fitted = StandardScaler::new().fit(&heights_and_weights()).unwrap();
        assert!((fitted.mean()[0] - 1.70).abs() < 1e-10);
        assert!((fitted.mean()[1] - 75.0).abs() < 1e-10);
    }

    #[test]
    fn test_transform_is_zero_mean_unit_variance() {
        let data = heights_and_weights();
        let transformed = StandardScaler::new().fit_transform(&data).unwrap();

        let mean = transformed.mean_axis(Axis(0)).unwrap();
        let std = transformed.std_axis(Axis(0), 0.0);
        for j in 0..2 {
            assert!(mean[j].abs() < 1e-10, "mean[{}] = {}", j, mean[j]);
            assert!((std[j] - 1.0).abs() < 1e-8, "std[{}] = {}", j, std[j]);
        }
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        // An MTRANS level absent from training.
        let data = array![[0.0, 1.0], [0.0, 2.0]];
        let fitted = StandardScaler::new().fit(&data).unwrap();
        assert_eq!(fitted.scale()[0], 1.0);
        let out = fitted.transform(&array![[0.0, 1.5]]).unwrap();
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[0, 1]], 0.0);
    }

    #[test]
    fn test_params_roundtrip() {
        let data = heights_and_weights();
        let fitted = StandardScaler::new().fit(&data).unwrap();
        let restored = FittedStandardScaler::from_params(fitted.extract_params()).unwrap();
        assert_eq!(
            fitted.transform(&data).unwrap(),
            restored.transform(&data).unwrap()
        );
    }

    #[test]
    fn test_from_params_rejects_bad_scale() {
        let params = StandardScalerParams {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 0.0],
        };
        assert!(FittedStandardScaler::from_params(params).is_err());
    }

    #[test]
    fn test_feature_mismatch() {
        let fitted = StandardScaler::new().fit(&heights_and_weights()).unwrap();
        let wrong = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            fitted.transform(&wrong),
            Err(ObesityError::FeatureMismatch {
                expected_features: 2,
                got_features: 3
            })
        ));
    }

    #[test]
    fn test_empty_data() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            StandardScaler::new().fit(&empty),
            Err(ObesityError::EmptyData(_))
        ));
    }
}
