//! Imputation of missing numeric answers.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`SimpleImputer`] | Fill NaN with the training median of each column |
//!
//! # Example
//!
//! ```ignore
//! use obesity_risk::preprocessing::{SimpleImputer, Transformer};
//!
//! let fitted = SimpleImputer::new().fit(&train)?;
//! let imputed = fitted.transform(&new_data)?;
//! ```

pub mod simple;

pub use simple::{FittedSimpleImputer, SimpleImputer, SimpleImputerParams};
