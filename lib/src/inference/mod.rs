//! Production inference: load a trained model once, predict many times.
//!
//! A [`TrainedModel`] bundles everything fitted during training: the encoding
//! scheme, the fitted preprocessor and the fitted estimator. It is immutable
//! and `Send + Sync`; wrap it in an `Arc` to share it.
//!
//! ```no_run
//! use obesity_risk::dataset::InputMap;
//! use obesity_risk::inference::{load_model, predict_from_input};
//!
//! let model = load_model("models/xgb_model.bin").unwrap();
//! let input: InputMap = serde_json::from_str(r#"{
//!     "Gender": "Female", "Age": 21, "Height": 1.62, "Weight": 64,
//!     "family_history": "yes", "FAVC": "no", "FCVC": 2, "NCP": 3,
//!     "CAEC": "Sometimes", "SMOKE": "no", "CH2O": 2, "SCC": "no",
//!     "FAF": 0, "TUE": 1, "CALC": "no", "MTRANS": "Public_Transportation"
//! }"#).unwrap();
//! let result = predict_from_input(&model, &input).unwrap();
//! println!("{} ({:.1}%)", result.label, result.confidence() * 100.0);
//! ```

pub mod artifact;

use crate::dataset::{InputMap, ObesityLevel, RawRecord};
use crate::encoding::{EncodingScheme, FeatureEncoder, RangeWarning};
use crate::error::{EncodingError, ObesityError, Result};
use crate::metrics::MetricsBundle;
use crate::model::{argmax, FittedClassifier, FittedEstimator};
use crate::preprocessing::{FittedPipeline, FittedTransformer};
use artifact::ArtifactPayload;
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Label, per-class scores and encoding warnings for one input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: ObesityLevel,
    /// One score per level in [`ObesityLevel::ALL`] order; sums to 1.
    pub scores: Vec<f64>,
    pub warnings: Vec<RangeWarning>,
}

impl PredictionResult {
    pub fn score(&self, level: ObesityLevel) -> f64 {
        self.scores.get(level.index()).copied().unwrap_or(0.0)
    }

    /// Combined score of the three obesity types.
    pub fn obesity_probability(&self) -> f64 {
        ObesityLevel::ALL
            .iter()
            .filter(|l| l.is_obese())
            .map(|&l| self.score(l))
            .sum()
    }

    pub fn is_obese(&self) -> bool {
        self.label.is_obese()
    }

    /// Score of the predicted label.
    pub fn confidence(&self) -> f64 {
        self.score(self.label)
    }
}

/// A fitted encoder + preprocessor + estimator, ready for inference.
#[derive(Clone, Debug)]
pub struct TrainedModel {
    model_name: String,
    scheme: EncodingScheme,
    preprocessor: FittedPipeline,
    estimator: FittedEstimator,
    classes: Vec<ObesityLevel>,
    trained_at: DateTime<Utc>,
    metrics: Option<MetricsBundle>,
}

impl TrainedModel {
    /// Assemble a model from fitted parts.
    ///
    /// # Errors
    /// Returns [`ObesityError::FeatureMismatch`] when the preprocessor or the
    /// estimator was fitted on a width other than the scheme's, and
    /// [`ObesityError::InvalidParameter`] when the estimator does not predict
    /// the seven levels.
    pub fn new(
        model_name: impl Into<String>,
        scheme: EncodingScheme,
        preprocessor: FittedPipeline,
        estimator: FittedEstimator,
        metrics: Option<MetricsBundle>,
    ) -> Result<Self> {
        let model = Self {
            model_name: model_name.into(),
            scheme,
            preprocessor,
            estimator,
            classes: ObesityLevel::ALL.to_vec(),
            trained_at: Utc::now(),
            metrics,
        };
        model.check_consistency()?;
        Ok(model)
    }

    fn check_consistency(&self) -> Result<()> {
        let width = self.scheme.feature_names().len();
        for got in [self.preprocessor.n_features_in(), self.estimator.n_features()] {
            if got != width {
                return Err(ObesityError::FeatureMismatch {
                    expected_features: width,
                    got_features: got,
                });
            }
        }
        if self.estimator.n_classes() != self.classes.len()
            || self.classes.as_slice() != ObesityLevel::ALL.as_slice()
        {
            return Err(ObesityError::InvalidParameter(format!(
                "estimator predicts {} classes, expected the {} obesity levels",
                self.estimator.n_classes(),
                ObesityLevel::COUNT
            )));
        }
        Ok(())
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn scheme(&self) -> EncodingScheme {
        self.scheme
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        self.scheme.feature_names()
    }

    pub fn classes(&self) -> &[ObesityLevel] {
        &self.classes
    }

    pub fn estimator(&self) -> &FittedEstimator {
        &self.estimator
    }

    pub fn preprocessor(&self) -> &FittedPipeline {
        &self.preprocessor
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Held-out metrics from the training run, if recorded.
    pub fn metrics(&self) -> Option<&MetricsBundle> {
        self.metrics.as_ref()
    }

    /// Predict one record.
    ///
    /// # Errors
    /// Besides encoding failures, a record with an empty numeric answer is
    /// [`EncodingError::InvalidValue`]: inference never imputes.
    pub fn predict_record(&self, record: &RawRecord) -> Result<PredictionResult> {
        check_complete(record)?;
        let encoded = FeatureEncoder::new(self.scheme).encode(record)?;
        let x = Array2::from_shape_vec((1, encoded.features.len()), encoded.features)?;
        let proba = self
            .estimator
            .predict_proba(&self.preprocessor.transform(&x)?)?;
        let scores = proba.row(0).to_vec();
        let label = self.classes[argmax(scores.iter())];
        Ok(PredictionResult {
            label,
            scores,
            warnings: encoded.warnings,
        })
    }

    pub fn predict_input(&self, input: &InputMap) -> Result<PredictionResult> {
        self.predict_record(&RawRecord::from_input(input)?)
    }

    /// Labels for many records. Any invalid record fails the whole batch.
    pub fn predict_batch(&self, records: &[RawRecord]) -> Result<Vec<ObesityLevel>> {
        records.iter().try_for_each(check_complete)?;
        let x = FeatureEncoder::new(self.scheme).encode_batch(records)?;
        let predicted = self.estimator.predict(&self.preprocessor.transform(&x)?)?;
        Ok(predicted.into_iter().map(|i| self.classes[i]).collect())
    }

    fn to_payload(&self) -> ArtifactPayload {
        ArtifactPayload {
            model_name: self.model_name.clone(),
            scheme: self.scheme,
            preprocessor: self.preprocessor.extract_params(),
            estimator: self.estimator.clone(),
            classes: self.classes.clone(),
            trained_at: self.trained_at,
            metrics: self.metrics.clone(),
        }
    }

    fn from_payload(payload: ArtifactPayload) -> Result<Self> {
        let corrupt = |e: ObesityError| ObesityError::ArtifactCorrupt(e.to_string());

        payload.estimator.validate().map_err(corrupt)?;
        let preprocessor = FittedPipeline::from_params(payload.preprocessor).map_err(corrupt)?;
        let model = Self {
            model_name: payload.model_name,
            scheme: payload.scheme,
            preprocessor,
            estimator: payload.estimator,
            classes: payload.classes,
            trained_at: payload.trained_at,
            metrics: payload.metrics,
        };
        model.check_consistency().map_err(corrupt)?;
        Ok(model)
    }

    /// Write the model artifact, creating parent directories.
    ///
    /// # Errors
    /// Returns [`ObesityError::ArtifactPersist`] on any write failure.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        artifact::write_file(path.as_ref(), &self.to_payload())
    }

    /// Read and validate a model artifact.
    ///
    /// # Errors
    /// - [`ObesityError::ArtifactNotFound`] when the file does not exist
    /// - [`ObesityError::ArtifactCorrupt`] for a bad header, version or payload
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let model = Self::from_payload(artifact::read_file(path)?)?;
        log::info!(
            "Loaded model '{}' ({}, scheme {}) from {}",
            model.model_name,
            model.estimator.kind(),
            model.scheme,
            path.display()
        );
        Ok(model)
    }
}

/// Load a model artifact from `path`.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<TrainedModel> {
    TrainedModel::load_from_file(path)
}

fn check_complete(record: &RawRecord) -> Result<()> {
    match record.first_missing() {
        Some(field) => Err(EncodingError::InvalidValue {
            field: field.to_string(),
            reason: "value is missing".to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

/// Predict one survey response with a loaded model.
///
/// # Errors
/// [`ObesityError::Encoding`] when the input is missing a field, has a value
/// of the wrong kind or an unknown category.
pub fn predict_from_input(model: &TrainedModel, input: &InputMap) -> Result<PredictionResult> {
    model.predict_input(input)
}

/// Pick the artifact to serve from a model directory.
///
/// Among `*.bin` files in sorted order, the first whose name contains `xgb`
/// (any case) wins; otherwise the first file.
///
/// # Errors
/// Returns [`ObesityError::ArtifactNotFound`] when the directory is missing or
/// holds no artifact.
pub fn discover_model<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ObesityError::ArtifactNotFound(dir.to_path_buf()),
        _ => ObesityError::Io(format!("Failed to list {}: {}", dir.display(), e)),
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "bin") {
            candidates.push(path);
        }
    }
    candidates.sort();

    let preferred = candidates.iter().position(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_lowercase().contains("xgb"))
            .unwrap_or(false)
    });
    match preferred {
        Some(i) => Ok(candidates.swap_remove(i)),
        None if !candidates.is_empty() => Ok(candidates.swap_remove(0)),
        None => Err(ObesityError::ArtifactNotFound(dir.to_path_buf())),
    }
}
