//! # obesity-risk
//!
//! Obesity-level classification from survey answers: feature encoding, tree
//! ensembles, a reproducible training pipeline and a production inference API.
//!
//! ## Core Design Principles
//!
//! - **Training/Inference Separation**: Fitted estimators and transformers carry
//!   only prediction parameters; fitting logic lives in their unfitted
//!   counterparts and the [`trainer`].
//! - **One Encoding, Versioned**: A trained model records the
//!   [`EncodingScheme`] it was trained with, so inference encodes identically.
//! - **Explicit Failure**: Unknown categories, missing fields and corrupt
//!   artifacts are errors, never silent defaults.
//! - **Reproducibility**: Splits, bootstraps and subsampling draw from seeded
//!   `ChaCha8Rng` streams.
//!
//! ## Quick Start
//!
//! ```rust
//! use obesity_risk::dataset::generate_survey;
//! use obesity_risk::model::RandomForestClassifier;
//! use obesity_risk::{predict_from_input, train_model, EstimatorConfig, TrainOptions};
//!
//! let dataset = generate_survey(140, 42);
//! let estimator = EstimatorConfig::from(RandomForestClassifier::new().n_estimators(10));
//! let outcome = train_model(&dataset, &estimator, &TrainOptions::new()).unwrap();
//! println!("accuracy: {:.3}", outcome.metrics.accuracy);
//!
//! let input = dataset.records()[0].to_input();
//! let result = predict_from_input(&outcome.model, &input).unwrap();
//! println!("{} (p_obese = {:.2})", result.label, result.obesity_probability());
//! ```
//!
//! ## Module Structure
//!
//! - `dataset`: Survey records, obesity levels, CSV loading, synthetic data
//! - `encoding`: Raw answers to fixed-order feature vectors
//! - `preprocessing`: Median imputation and standard scaling
//! - `model`: Decision tree, random forest and gradient boosting classifiers
//! - `metrics`: Accuracy, precision/recall/F1, confusion matrix, report
//! - `trainer`: Split, fit, evaluate, cross-validate, search
//! - `inference`: Model artifacts and prediction
//! - `session`: Per-session prediction history
//! - `config`: JSON training configuration

/// JSON training configuration.
pub mod config;

/// Survey records, target classes and dataset loading.
pub mod dataset;

/// Feature encoding of raw survey answers.
pub mod encoding;

pub mod error;

/// Trained model artifacts and prediction.
pub mod inference;

/// Classification metrics.
pub mod metrics;

/// Classifiers with separate unfitted and fitted states.
pub mod model;

/// Data preprocessing transformers for ML pipelines.
pub mod preprocessing;

/// Model persistence formats.
pub mod serialization;

pub mod session;

/// Training pipeline orchestration.
pub mod trainer;

pub use config::TrainingConfig;
pub use dataset::{InputMap, LabeledDataset, ObesityLevel, RawRecord, RawValue};
pub use encoding::{EncodingScheme, FeatureEncoder};
pub use error::{EncodingError, ObesityError, Result};
pub use inference::{discover_model, load_model, predict_from_input, PredictionResult, TrainedModel};
pub use metrics::MetricsBundle;
pub use model::{Classifier, EstimatorConfig, FittedClassifier};
pub use session::PredictionSession;
pub use trainer::{train_model, TrainOptions, TrainOutcome};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::generate_survey;
    use crate::model::{GradientBoostingClassifier, RandomForestClassifier};
    use std::sync::Arc;

    fn scenario_input() -> InputMap {
        serde_json::from_str(
            r#"{
                "Gender": "Male", "Age": 25, "Height": 1.75, "Weight": 70,
                "family_history": "yes", "FAVC": "no", "FCVC": 2, "NCP": 3,
                "CAEC": "Sometimes", "SMOKE": "no", "CH2O": 2, "SCC": "no",
                "FAF": 1, "TUE": 2, "CALC": "no", "MTRANS": "Public_Transportation"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_train_persist_load_predict() {
        let dataset = generate_survey(210, 42);
        let dir = std::env::temp_dir().join("obesity_risk_e2e_models");
        let options = TrainOptions::new()
            .persist(true)
            .model_dir(&dir)
            .model_name("xgb_model");
        let estimator = EstimatorConfig::from(GradientBoostingClassifier::new().n_estimators(10));
        let outcome = train_model(&dataset, &estimator, &options).unwrap();
        assert_eq!(outcome.artifact_path.as_deref(), Some(dir.join("xgb_model.bin").as_path()));

        let path = discover_model(&dir).unwrap();
        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded.estimator().kind(), "xgb_boosting");

        let input = scenario_input();
        let before = predict_from_input(&outcome.model, &input).unwrap();
        let after = predict_from_input(&loaded, &input).unwrap();
        assert_eq!(before, after);
        assert!(ObesityLevel::ALL.contains(&after.label));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_same_seed_same_metrics() {
        let dataset = generate_survey(140, 7);
        let estimator = EstimatorConfig::from(RandomForestClassifier::new().n_estimators(10));
        let options = TrainOptions::new().seed(42);
        let a = train_model(&dataset, &estimator, &options).unwrap();
        let b = train_model(&dataset, &estimator, &options).unwrap();
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.metrics.to_json().unwrap(), b.metrics.to_json().unwrap());
    }

    #[test]
    fn test_scenario_prediction_is_deterministic() {
        let dataset = generate_survey(140, 1);
        let estimator = EstimatorConfig::from(RandomForestClassifier::new().n_estimators(10));
        let model = train_model(&dataset, &estimator, &TrainOptions::new())
            .unwrap()
            .model;
        let input = scenario_input();
        let first = predict_from_input(&model, &input).unwrap();
        assert!(ObesityLevel::ALL.contains(&first.label));
        assert!(first.warnings.is_empty());
        for _ in 0..3 {
            assert_eq!(predict_from_input(&model, &input).unwrap(), first);
        }
    }

    #[test]
    fn test_alien_gender_is_unknown_category() {
        let dataset = generate_survey(70, 1);
        let model = train_model(&dataset, &EstimatorConfig::default(), &TrainOptions::new())
            .unwrap()
            .model;
        let mut input = scenario_input();
        input.insert("Gender".to_string(), RawValue::from("Alien"));
        assert!(matches!(
            predict_from_input(&model, &input),
            Err(ObesityError::Encoding(EncodingError::UnknownCategory { .. }))
        ));
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let path = std::env::temp_dir().join("obesity_risk_e2e_missing.bin");
        assert!(matches!(
            load_model(&path),
            Err(ObesityError::ArtifactNotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_shared_model_across_threads() {
        let dataset = generate_survey(70, 5);
        let estimator = EstimatorConfig::from(RandomForestClassifier::new().n_estimators(5));
        let model = Arc::new(
            train_model(&dataset, &estimator, &TrainOptions::new())
                .unwrap()
                .model,
        );
        let expected = predict_from_input(&model, &scenario_input()).unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let model = Arc::clone(&model);
                std::thread::spawn(move || predict_from_input(&model, &scenario_input()).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
