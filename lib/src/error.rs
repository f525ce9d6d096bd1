//! Error types for the obesity-risk pipeline.
//!
//! Encoding failures have their own [`EncodingError`] so the presentation layer
//! can tell "bad form input" apart from "bad model file". Everything else is an
//! [`ObesityError`].

use std::fmt;
use std::path::PathBuf;

/// Failure while turning raw survey answers into a feature vector.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodingError {
    /// A categorical field holds a value outside its fixed table.
    UnknownCategory { field: String, value: String },
    /// A required field is absent from the input mapping.
    MissingField(String),
    /// A field is present but has the wrong kind of value.
    InvalidValue { field: String, reason: String },
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::UnknownCategory { field, value } => {
                write!(f, "Unknown category '{}' for field {}", value, field)
            }
            EncodingError::MissingField(field) => {
                write!(f, "Missing required field: {}", field)
            }
            EncodingError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for field {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for EncodingError {}

/// Error type for dataset loading, training, persistence and inference.
#[derive(Debug)]
pub enum ObesityError {
    /// Raw input could not be encoded.
    Encoding(EncodingError),
    /// No model artifact exists at the given location.
    ArtifactNotFound(PathBuf),
    /// The artifact exists but cannot be decoded.
    ArtifactCorrupt(String),
    /// Writing a trained model to disk failed.
    ArtifactPersist(String),
    /// The dataset file is malformed.
    Dataset(String),
    /// Invalid hyperparameter or option value.
    InvalidParameter(String),
    /// Empty data provided where non-empty was required.
    EmptyData(String),
    /// Feature dimension mismatch.
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
    /// I/O error outside artifact handling.
    Io(String),
}

impl fmt::Display for ObesityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObesityError::Encoding(err) => write!(f, "Encoding error: {}", err),
            ObesityError::ArtifactNotFound(path) => {
                write!(f, "Model artifact not found: {}", path.display())
            }
            ObesityError::ArtifactCorrupt(msg) => write!(f, "Corrupt model artifact: {}", msg),
            ObesityError::ArtifactPersist(msg) => {
                write!(f, "Failed to persist model artifact: {}", msg)
            }
            ObesityError::Dataset(msg) => write!(f, "Dataset error: {}", msg),
            ObesityError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            ObesityError::EmptyData(msg) => write!(f, "Empty data: {}", msg),
            ObesityError::FeatureMismatch {
                expected_features,
                got_features,
            } => write!(
                f,
                "Feature mismatch: expected {} features, got {}",
                expected_features, got_features
            ),
            ObesityError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ObesityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObesityError::Encoding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EncodingError> for ObesityError {
    fn from(err: EncodingError) -> Self {
        ObesityError::Encoding(err)
    }
}

impl From<std::io::Error> for ObesityError {
    fn from(err: std::io::Error) -> Self {
        ObesityError::Io(err.to_string())
    }
}

impl From<csv::Error> for ObesityError {
    fn from(err: csv::Error) -> Self {
        ObesityError::Dataset(err.to_string())
    }
}

impl From<serde_json::Error> for ObesityError {
    fn from(err: serde_json::Error) -> Self {
        ObesityError::InvalidParameter(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ObesityError {
    fn from(err: ndarray::ShapeError) -> Self {
        ObesityError::InvalidParameter(format!("array shape: {}", err))
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ObesityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_category() {
        let err = EncodingError::UnknownCategory {
            field: "Gender".to_string(),
            value: "Alien".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Unknown category"));
        assert!(msg.contains("Alien"));
        assert!(msg.contains("Gender"));
    }

    #[test]
    fn test_error_display_missing_field() {
        let err = EncodingError::MissingField("Age".to_string());
        assert!(err.to_string().contains("Missing required field: Age"));
    }

    #[test]
    fn test_error_display_artifact_not_found() {
        let err = ObesityError::ArtifactNotFound(PathBuf::from("models/none.bin"));
        assert!(err.to_string().contains("models/none.bin"));
    }

    #[test]
    fn test_error_display_feature_mismatch() {
        let err = ObesityError::FeatureMismatch {
            expected_features: 20,
            got_features: 12,
        };
        assert!(err.to_string().contains("Feature mismatch"));
    }

    #[test]
    fn test_error_from_encoding_error() {
        let err: ObesityError = EncodingError::MissingField("TUE".to_string()).into();
        assert!(matches!(
            err,
            ObesityError::Encoding(EncodingError::MissingField(_))
        ));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: ObesityError = io_err.into();
        assert!(matches!(err, ObesityError::Io(_)));
    }

    #[test]
    fn test_error_is_std_error() {
        let err = ObesityError::InvalidParameter("test".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
