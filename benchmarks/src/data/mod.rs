//! Data sources for the tooling binaries and benches.

use obesity_risk::dataset::{generate_survey, load_csv, InputMap, LabeledDataset};
use obesity_risk::{ObesityError, Result};
use std::path::Path;

/// Rows generated when no dataset path is given.
pub const DEFAULT_SYNTHETIC_ROWS: usize = 2100;

/// Load the survey CSV at `path`, or generate `n_rows` synthetic rows.
pub fn load_or_generate(path: Option<&Path>, n_rows: usize, seed: u64) -> Result<LabeledDataset> {
    match path {
        Some(path) => load_csv(path),
        None => {
            log::info!("No dataset given, generating {} synthetic rows", n_rows);
            Ok(generate_survey(n_rows, seed))
        }
    }
}

/// Read one prediction input (a JSON object keyed by field name).
pub fn read_input_json(path: &Path) -> Result<InputMap> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ObesityError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&text)?)
}
