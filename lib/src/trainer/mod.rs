//! Training pipeline: split, preprocess, fit, evaluate, persist.
//!
//! [`train_model`] is the entry point. It encodes the dataset with the chosen
//! scheme, splits it with a seeded (by default stratified) split, fits the
//! median-impute + standard-scale preprocessor and the estimator on the train
//! partition only, scores the held-out partition, and optionally writes the
//! model artifact.
//!
//! ```no_run
//! use obesity_risk::dataset::load_csv;
//! use obesity_risk::model::{EstimatorConfig, GradientBoostingClassifier};
//! use obesity_risk::trainer::{train_model, TrainOptions};
//!
//! let dataset = load_csv("data/ObesityDataSet.csv").unwrap();
//! let estimator = EstimatorConfig::from(GradientBoostingClassifier::new());
//! let options = TrainOptions::new().persist(true).model_name("xgb_model");
//! let outcome = train_model(&dataset, &estimator, &options).unwrap();
//! println!("{}", outcome.metrics.report);
//! ```

pub mod cross_validation;
pub mod search;
pub mod split;

pub use cross_validation::{cross_validate, CrossValidationOptions, CrossValidationResult};
pub use search::{grid_search, random_search, CandidateScore, SearchResult};
pub use split::{kfold_indices, train_test_split, SplitIndices};

use crate::dataset::{LabeledDataset, ObesityLevel};
use crate::encoding::{EncodingScheme, FeatureEncoder};
use crate::error::{ObesityError, Result};
use crate::inference::TrainedModel;
use crate::metrics::MetricsBundle;
use crate::model::{Classifier, EstimatorConfig, FittedClassifier};
use crate::preprocessing::{FittedPipeline, FittedTransformer, Pipeline, Transformer};
use ndarray::{Array2, Axis};
use std::path::PathBuf;

/// Options for a training run.
///
/// Defaults:
/// - `persist`: false
/// - `model_name`: `"model"`
/// - `model_dir`: `"models"`
/// - `test_size`: 0.3
/// - `seed`: 42
/// - `stratify`: true
/// - `scheme`: [`EncodingScheme::Full`]
#[derive(Clone, Debug, PartialEq)]
pub struct TrainOptions {
    pub persist: bool,
    pub model_name: String,
    pub model_dir: PathBuf,
    pub test_size: f64,
    pub seed: u64,
    pub stratify: bool,
    pub scheme: EncodingScheme,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            persist: false,
            model_name: "model".to_string(),
            model_dir: PathBuf::from("models"),
            test_size: 0.3,
            seed: 42,
            stratify: true,
            scheme: EncodingScheme::Full,
        }
    }
}

impl TrainOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the artifact to [`TrainOptions::artifact_path`] after training.
    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    pub fn test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
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

    /// `<model_dir>/<model_name>.bin`
    pub fn artifact_path(&self) -> PathBuf {
        self.model_dir.join(format!("{}.bin", self.model_name))
    }
}

/// The two partitions, as encoded (unscaled) features and labels.
#[derive(Clone, Debug)]
pub struct SplitInfo {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Vec<ObesityLevel>,
    pub y_test: Vec<ObesityLevel>,
}

/// A fitted preprocessor/estimator pair with its held-out evaluation.
#[derive(Clone, Debug)]
pub struct Evaluation<F> {
    pub preprocessor: FittedPipeline,
    pub estimator: F,
    pub metrics: MetricsBundle,
    pub split: SplitInfo,
}

/// Result of [`train_model`].
#[derive(Clone, Debug)]
pub struct TrainOutcome {
    pub model: TrainedModel,
    pub metrics: MetricsBundle,
    pub split: SplitInfo,
    /// Where the artifact was written, when persisted.
    pub artifact_path: Option<PathBuf>,
}

pub(crate) fn class_labels() -> Vec<String> {
    ObesityLevel::ALL
        .iter()
        .map(|l| l.as_str().to_string())
        .collect()
}

fn labels_at(labels: &[ObesityLevel], indices: &[usize]) -> Vec<ObesityLevel> {
    indices.iter().map(|&i| labels[i]).collect()
}

/// Fit the preprocessor and `estimator` on `(x, y)` rows.
pub(crate) fn fit_on<C: Classifier>(
    estimator: &C,
    x: &Array2<f64>,
    y: &[usize],
) -> Result<(FittedPipeline, C::Fitted)> {
    let preprocessor = Pipeline::numeric_default().fit(x)?;
    let x_scaled = preprocessor.transform(x)?;
    let fitted = estimator.fit(&x_scaled, y, ObesityLevel::COUNT)?;
    Ok((preprocessor, fitted))
}

/// Score a fitted pair on `(x, y)` rows.
pub(crate) fn score_on<F: FittedClassifier>(
    preprocessor: &FittedPipeline,
    estimator: &F,
    x: &Array2<f64>,
    y: &[usize],
) -> Result<MetricsBundle> {
    let x_scaled = preprocessor.transform(x)?;
    let y_pred = estimator.predict(&x_scaled)?;
    MetricsBundle::compute(y, &y_pred, &class_labels())
}

/// Split, fit and evaluate any [`Classifier`] without persisting anything.
///
/// # Errors
/// - [`ObesityError::EmptyData`] for an empty dataset
/// - [`ObesityError::InvalidParameter`] for a bad `test_size`
/// - [`ObesityError::Encoding`] when a record cannot be encoded
pub fn fit_and_evaluate<C: Classifier>(
    dataset: &LabeledDataset,
    estimator: &C,
    options: &TrainOptions,
) -> Result<Evaluation<C::Fitted>> {
    if dataset.is_empty() {
        return Err(ObesityError::EmptyData(
            "Cannot train on an empty dataset".to_string(),
        ));
    }

    let encoder = FeatureEncoder::new(options.scheme);
    let x = encoder.encode_batch(dataset.records())?;
    let y = dataset.label_indices();

    let split = train_test_split(&y, options.test_size, options.seed, options.stratify)?;
    let x_train = x.select(Axis(0), &split.train);
    let x_test = x.select(Axis(0), &split.test);
    let y_train: Vec<usize> = split.train.iter().map(|&i| y[i]).collect();
    let y_test: Vec<usize> = split.test.iter().map(|&i| y[i]).collect();

    log::info!(
        "Training {} on {} rows ({} train / {} test, scheme {})",
        estimator.name(),
        dataset.len(),
        split.train.len(),
        split.test.len(),
        options.scheme
    );

    let (preprocessor, fitted) = fit_on(estimator, &x_train, &y_train)?;
    let metrics = score_on(&preprocessor, &fitted, &x_test, &y_test)?;

    log::info!(
        "Test metrics: accuracy {:.4}, f1 {:.4}, recall {:.4}, precision {:.4}",
        metrics.accuracy,
        metrics.f1,
        metrics.recall,
        metrics.precision
    );

    Ok(Evaluation {
        preprocessor,
        estimator: fitted,
        metrics,
        split: SplitInfo {
            y_train: labels_at(dataset.labels(), &split.train),
            y_test: labels_at(dataset.labels(), &split.test),
            train_indices: split.train,
            test_indices: split.test,
            x_train,
            x_test,
        },
    })
}

/// Train a built-in estimator, evaluate it and optionally persist it.
///
/// # Errors
/// Everything [`fit_and_evaluate`] returns, plus
/// [`ObesityError::ArtifactPersist`] when `options.persist` is set and the
/// artifact cannot be written.
pub fn train_model(
    dataset: &LabeledDataset,
    estimator: &EstimatorConfig,
    options: &TrainOptions,
) -> Result<TrainOutcome> {
    let evaluation = fit_and_evaluate(dataset, estimator, options)?;

    let model = TrainedModel::new(
        options.model_name.clone(),
        options.scheme,
        evaluation.preprocessor,
        evaluation.estimator,
        Some(evaluation.metrics.clone()),
    )?;

    let artifact_path = if options.persist {
        let path = options.artifact_path();
        model.save_to_file(&path)?;
        log::info!("Model saved to {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(TrainOutcome {
        model,
        metrics: evaluation.metrics,
        split: evaluation.split,
        artifact_path,
    })
}
