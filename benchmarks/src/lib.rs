//! Tooling and benchmark helpers for obesity-risk.
//!
//! - Dataset loading with a synthetic fallback
//! - JSON prediction input
//! - Latency measurement for the inference path

pub mod data;
pub mod utils;

pub use data::{load_or_generate, read_input_json, DEFAULT_SYNTHETIC_ROWS};
pub use utils::{measure_latency, LatencyStats, Timer};
