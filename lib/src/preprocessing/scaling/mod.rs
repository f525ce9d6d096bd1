//! Scaling transformers for feature normalization.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`StandardScaler`] | Z-score normalization (mean=0, std=1) |
//!
//! Tree ensembles are scale-invariant. Every artifact still carries the fitted
//! scaler, whichever estimator it wraps.

pub mod standard;

pub use standard::{
    FittedStandardScaler, StandardScaler, StandardScalerParams,
};
