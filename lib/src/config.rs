//! JSON configuration for a training run.
//!
//! Every field has a default, so `{}` is a valid config:
//!
//! ```json
//! {
//!   "dataset_path": "data/ObesityDataSet.csv",
//!   "model_name": "xgb_model",
//!   "persist": true,
//!   "estimator": { "kind": "gradient_boosting", "n_estimators": 200 }
//! }
//! ```

use crate::encoding::EncodingScheme;
use crate::error::{ObesityError, Result};
use crate::model::EstimatorConfig;
use crate::trainer::{CrossValidationOptions, TrainOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Labeled survey CSV. When absent, callers fall back to their own source.
    pub dataset_path: Option<PathBuf>,
    pub model_name: String,
    pub model_dir: PathBuf,
    pub persist: bool,
    pub test_size: f64,
    pub seed: u64,
    pub stratify: bool,
    pub scheme: EncodingScheme,
    pub estimator: EstimatorConfig,
    /// Folds for an extra cross-validation report; 0 disables it.
    pub cv_folds: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let options = TrainOptions::default();
        Self {
            dataset_path: None,
            model_name: options.model_name,
            model_dir: options.model_dir,
            persist: options.persist,
            test_size: options.test_size,
            seed: options.seed,
            stratify: options.stratify,
            scheme: options.scheme,
            estimator: EstimatorConfig::default(),
            cv_folds: 0,
        }
    }
}

impl TrainingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ObesityError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ObesityError::InvalidParameter(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.model_name.trim().is_empty() {
            return Err(ObesityError::InvalidParameter(
                "model_name must not be empty".to_string(),
            ));
        }
        if self.cv_folds == 1 {
            return Err(ObesityError::InvalidParameter(
                "cv_folds must be 0 or at least 2".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_train_options(&self) -> TrainOptions {
        TrainOptions::new()
            .persist(self.persist)
            .model_name(self.model_name.clone())
            .model_dir(self.model_dir.clone())
            .test_size(self.test_size)
            .seed(self.seed)
            .stratify(self.stratify)
            .scheme(self.scheme)
    }

    /// Cross-validation settings, when `cv_folds` is set.
    pub fn to_cv_options(&self) -> Option<CrossValidationOptions> {
        (self.cv_folds >= 2).then(|| {
            CrossValidationOptions::new()
                .n_folds(self.cv_folds)
                .seed(self.seed)
                .stratify(self.stratify)
                .scheme(self.scheme)
        })
    }
}
