//! Serialization of fitted parameters.
//!
//! Fitted transformers and estimators expose plain-data parameter structs
//! (`Vec<f64>`, node tables, class lists). Anything that is serde-serializable
//! gets a bincode byte representation through [`SerializableParams`].

use std::error::Error;

/// A trait for parameter representations that can be serialized to and from bytes.
///
/// Implementors should contain only plain data, not lookup caches that can be
/// rebuilt from that data.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stats {
        mean: Vec<f64>,
        n_features: usize,
    }

    #[test]
    fn test_params_bytes_roundtrip() {
        let stats = Stats {
            mean: vec![1.5, -0.25],
            n_features: 2,
        };
        let bytes = stats.to_bytes().unwrap();
        let back = Stats::from_bytes(&bytes).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn test_truncated_bytes_fail() {
        let stats = Stats {
            mean: vec![1.0, 2.0, 3.0],
            n_features: 3,
        };
        let bytes = stats.to_bytes().unwrap();
        assert!(Stats::from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }
}
