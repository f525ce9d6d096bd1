//! Pipeline for chaining transformers.
//!
//! A Pipeline allows chaining multiple transformers together, where the output
//! of one transformer becomes the input to the next.
//!
//! # Example
//! ```ignore
//! use obesity_risk::preprocessing::{Pipeline, SimpleImputer, StandardScaler, Transformer};
//!
//! let pipeline = Pipeline::new()
//!     .add_simple_imputer(SimpleImputer::new())
//!     .add_standard_scaler(StandardScaler::new());
//!
//! let fitted = pipeline.fit(&train)?;
//! let transformed = fitted.transform(&test)?;
//! ```

use crate::error::ObesityError;
use crate::preprocessing::imputation::{FittedSimpleImputer, SimpleImputer, SimpleImputerParams};
use crate::preprocessing::scaling::{FittedStandardScaler, StandardScaler, StandardScalerParams};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A fitted step that can be part of a pipeline.
pub trait PipelineStep: Clone {
    /// Transform the data.
    fn transform_step(&self, data: &Array2<f64>) -> Result<Array2<f64>, ObesityError>;
    /// Get the step name for debugging.
    fn step_name(&self) -> &'static str;
}

/// A fitted step in the pipeline.
#[derive(Clone, Debug)]
pub enum PipelineStepEnum {
    /// SimpleImputer step.
    SimpleImputer(FittedSimpleImputer),
    /// StandardScaler step.
    StandardScaler(FittedStandardScaler),
}

impl PipelineStep for PipelineStepEnum {
    fn transform_step(&self, data: &Array2<f64>) -> Result<Array2<f64>, ObesityError> {
        match self {
            PipelineStepEnum::SimpleImputer(t) => t.transform(data),
            PipelineStepEnum::StandardScaler(t) => t.transform(data),
        }
    }

    fn step_name(&self) -> &'static str {
        match self {
            PipelineStepEnum::SimpleImputer(_) => "SimpleImputer",
            PipelineStepEnum::StandardScaler(_) => "StandardScaler",
        }
    }
}

/// Serializable parameters of one fitted step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PipelineStepParams {
    SimpleImputer(SimpleImputerParams),
    StandardScaler(StandardScalerParams),
}

/// Serializable representation of a fitted pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Fitted steps in application order.
    pub steps: Vec<PipelineStepParams>,
    /// Number of features seen during fit.
    pub n_features: usize,
}

/// A step in the unfitted pipeline.
#[derive(Clone, Debug)]
enum UnfittedStepEnum {
    SimpleImputer(SimpleImputer),
    StandardScaler(StandardScaler),
}

impl UnfittedStepEnum {
    fn fit(&self, data: &Array2<f64>) -> Result<PipelineStepEnum, ObesityError> {
        match self {
            UnfittedStepEnum::SimpleImputer(t) => t.fit(data).map(PipelineStepEnum::SimpleImputer),
            UnfittedStepEnum::StandardScaler(t) => {
                t.fit(data).map(PipelineStepEnum::StandardScaler)
            }
        }
    }
}

/// Pipeline transformer (unfitted).
///
/// Chains multiple transformers together.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    steps: Vec<UnfittedStepEnum>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Median imputation followed by z-scoring: the preprocessing every
    /// obesity model is trained with.
    pub fn numeric_default() -> Self {
        Self::new()
            .add_simple_imputer(SimpleImputer::new())
            .add_standard_scaler(StandardScaler::new())
    }

    /// Add a SimpleImputer to the pipeline.
    pub fn add_simple_imputer(mut self, imputer: SimpleImputer) -> Self {
        self.steps.push(UnfittedStepEnum::SimpleImputer(imputer));
        self
    }

    /// Add a StandardScaler to the pipeline.
    pub fn add_standard_scaler(mut self, scaler: StandardScaler) -> Self {
        self.steps.push(UnfittedStepEnum::StandardScaler(scaler));
        self
    }

    /// Get the number of steps in the pipeline.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Transformer for Pipeline {
    type Params = PipelineParams;
    type Fitted = FittedPipeline;

    fn fit(&self, data: &Array2<f64>) -> Result<Self::Fitted, ObesityError> {
        if self.steps.is_empty() {
            return Err(ObesityError::InvalidParameter(
                "Cannot fit an empty pipeline".to_string(),
            ));
        }

        let (rows, cols) = data.dim();
        if rows == 0 {
            return Err(ObesityError::EmptyData(
                "Cannot fit pipeline on empty data".to_string(),
            ));
        }

        let mut fitted_steps = Vec::with_capacity(self.steps.len());
        let mut current_data = data.clone();

        for step in &self.steps {
            let fitted = step.fit(&current_data)?;
            current_data = fitted.transform_step(&current_data)?;
            fitted_steps.push(fitted);
        }

        Ok(FittedPipeline {
            steps: fitted_steps,
            n_features: cols,
        })
    }
}

/// Fitted Pipeline ready for inference.
#[derive(Clone, Debug)]
pub struct FittedPipeline {
    steps: Vec<PipelineStepEnum>,
    n_features: usize,
}

impl FittedPipeline {
    /// Get the number of steps in the pipeline.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get the names of all steps in the pipeline.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.step_name()).collect()
    }
}

impl FittedTransformer for FittedPipeline {
    type Params = PipelineParams;

    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, ObesityError> {
        self.check_features(data)?;

        let mut result = data.clone();
        for step in &self.steps {
            result = step.transform_step(&result)?;
        }
        Ok(result)
    }

    fn extract_params(&self) -> Self::Params {
        let steps = self
            .steps
            .iter()
            .map(|step| match step {
                PipelineStepEnum::SimpleImputer(t) => {
                    PipelineStepParams::SimpleImputer(t.extract_params())
                }
                PipelineStepEnum::StandardScaler(t) => {
                    PipelineStepParams::StandardScaler(t.extract_params())
                }
            })
            .collect();

        PipelineParams {
            steps,
            n_features: self.n_features,
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, ObesityError> {
        let steps = params
            .steps
            .into_iter()
            .map(|step| match step {
                PipelineStepParams::SimpleImputer(p) => {
                    FittedSimpleImputer::from_params(p).map(PipelineStepEnum::SimpleImputer)
                }
                PipelineStepParams::StandardScaler(p) => {
                    FittedStandardScaler::from_params(p).map(PipelineStepEnum::StandardScaler)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        for step in &steps {
            let width = match step {
                PipelineStepEnum::SimpleImputer(t) => t.n_features_in(),
                PipelineStepEnum::StandardScaler(t) => t.n_features_in(),
            };
            if width != params.n_features {
                return Err(ObesityError::FeatureMismatch {
                    expected_features: params.n_features,
                    got_features: width,
                });
            }
        }

        Ok(Self {
            steps,
            n_features: params.n_features,
        })
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }
}
