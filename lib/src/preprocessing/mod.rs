//! Numeric preprocessing applied after encoding.
//!
//! Transformers follow a fit/fitted split:
//!
//! - [`Transformer`]: unfitted transformer with hyperparameters
//! - [`FittedTransformer`]: fitted transformer ready for inference, with
//!   serializable parameters
//!
//! The training pipeline fits [`Pipeline::numeric_default`] (median imputation,
//! then z-scoring) on the train partition only, and stores the fitted result in
//! the model artifact so inference applies exactly the same transform.
//!
//! # Example
//!
//! ```ignore
//! use obesity_risk::preprocessing::{FittedTransformer, Pipeline, Transformer};
//!
//! let fitted = Pipeline::numeric_default().fit(&x_train)?;
//! let x_test = fitted.transform(&x_test)?;
//! ```

pub mod imputation;
pub mod pipeline;
pub mod scaling;
pub mod traits;

pub use imputation::{FittedSimpleImputer, SimpleImputer, SimpleImputerParams};
pub use pipeline::{
    FittedPipeline, Pipeline, PipelineParams, PipelineStep, PipelineStepEnum, PipelineStepParams,
};
pub use scaling::{
    FittedStandardScaler, StandardScaler, StandardScalerParams,
};
pub use traits::{FittedTransformer, Transformer};
