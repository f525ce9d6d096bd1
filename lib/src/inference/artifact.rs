//! On-disk model artifact.
//!
//! Layout: 4-byte magic `OBRM`, little-endian `u16` format version, then the
//! bincode-encoded [`ArtifactPayload`].

use crate::dataset::ObesityLevel;
use crate::encoding::EncodingScheme;
use crate::error::{ObesityError, Result};
use crate::metrics::MetricsBundle;
use crate::model::FittedEstimator;
use crate::preprocessing::PipelineParams;
use crate::serialization::SerializableParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

pub const MAGIC: [u8; 4] = *b"OBRM";
pub const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = MAGIC.len() + 2;

/// Everything a trained model needs at inference time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactPayload {
    pub model_name: String,
    pub scheme: EncodingScheme,
    pub preprocessor: PipelineParams,
    pub estimator: FittedEstimator,
    pub classes: Vec<ObesityLevel>,
    pub trained_at: DateTime<Utc>,
    pub metrics: Option<MetricsBundle>,
}

/// Header plus payload bytes.
pub fn encode(payload: &ArtifactPayload) -> Result<Vec<u8>> {
    let body = payload
        .to_bytes()
        .map_err(|e| ObesityError::ArtifactPersist(format!("Failed to encode model: {}", e)))?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Check the header and decode the payload.
pub fn decode(bytes: &[u8]) -> Result<ArtifactPayload> {
    if bytes.len() < HEADER_LEN || bytes[..MAGIC.len()] != MAGIC {
        return Err(ObesityError::ArtifactCorrupt(
            "missing model artifact header".to_string(),
        ));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != FORMAT_VERSION {
        return Err(ObesityError::ArtifactCorrupt(format!(
            "unsupported artifact version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }
    ArtifactPayload::from_bytes(&bytes[HEADER_LEN..])
        .map_err(|e| ObesityError::ArtifactCorrupt(format!("undecodable payload: {}", e)))
}

/// Write atomically: a sibling temp file renamed over `path`.
pub fn write_file(path: &Path, payload: &ArtifactPayload) -> Result<()> {
    let persist_err = |e: io::Error| {
        ObesityError::ArtifactPersist(format!("Failed to write {}: {}", path.display(), e))
    };

    let bytes = encode(payload)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(persist_err)?;
    }
    let tmp = path.with_extension("bin.tmp");
    fs::write(&tmp, &bytes).map_err(persist_err)?;
    fs::rename(&tmp, path).map_err(|e| {
        fs::remove_file(&tmp).ok();
        persist_err(e)
    })
}

pub fn read_file(path: &Path) -> Result<ArtifactPayload> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ObesityError::ArtifactNotFound(path.to_path_buf()),
        _ => ObesityError::Io(format!("Failed to read {}: {}", path.display(), e)),
    })?;
    decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Classifier, DecisionTreeClassifier, EstimatorConfig};
    use crate::preprocessing::{FittedTransformer, Pipeline, Transformer};
    use ndarray::array;

    fn payload() -> ArtifactPayload {
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 1.0], [3.0, 0.0]];
        let preprocessor = Pipeline::numeric_default().fit(&x).unwrap();
        let estimator = EstimatorConfig::from(DecisionTreeClassifier::new())
            .fit(&preprocessor.transform(&x).unwrap(), &[0, 0, 1, 1], 2)
            .unwrap();
        ArtifactPayload {
            model_name: "tiny".to_string(),
            scheme: EncodingScheme::Full,
            preprocessor: preprocessor.extract_params(),
            estimator,
            classes: ObesityLevel::ALL.to_vec(),
            trained_at: Utc::now(),
            metrics: None,
        }
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(&payload()).unwrap();
        assert_eq!(&bytes[..4], b"OBRM");
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), FORMAT_VERSION);
        let back = decode(&bytes).unwrap();
        assert_eq!(back.model_name, "tiny");
        assert_eq!(back.classes.len(), 7);
    }

    #[test]
    fn test_bad_magic_is_corrupt() {
        let mut bytes = encode(&payload()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(ObesityError::ArtifactCorrupt(_))));
        assert!(matches!(decode(b"OB"), Err(ObesityError::ArtifactCorrupt(_))));
    }

    #[test]
    fn test_unknown_version_is_corrupt() {
        let mut bytes = encode(&payload()).unwrap();
        bytes[4] = 9;
        match decode(&bytes) {
            Err(ObesityError::ArtifactCorrupt(msg)) => assert!(msg.contains("version 9")),
            other => panic!("expected ArtifactCorrupt, got {:?}", other.map(|p| p.model_name)),
        }
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let bytes = encode(&payload()).unwrap();
        assert!(matches!(
            decode(&bytes[..bytes.len() / 2]),
            Err(ObesityError::ArtifactCorrupt(_))
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let path = std::env::temp_dir().join("obesity_risk_no_such_artifact.bin");
        assert!(matches!(
            read_file(&path),
            Err(ObesityError::ArtifactNotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_write_then_read() {
        let dir = std::env::temp_dir().join("obesity_risk_artifact_test");
        let path = dir.join("nested").join("tiny.bin");
        write_file(&path, &payload()).unwrap();
        assert!(!path.with_extension("bin.tmp").exists());
        let back = read_file(&path).unwrap();
        assert_eq!(back.estimator.kind(), "decision_tree");
        fs::remove_dir_all(&dir).ok();
    }
}
