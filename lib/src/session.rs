//! Per-session prediction state for a presentation layer.
//!
//! A [`PredictionSession`] shares one loaded model and owns its own history
//! and last result. Nothing here is process-global: two sessions over the same
//! `Arc<TrainedModel>` never see each other's entries.

use crate::dataset::{InputMap, ObesityLevel, RawValue, FIELD_NAMES};
use crate::error::Result;
use crate::inference::{PredictionResult, TrainedModel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;

/// Default number of history entries kept per session.
pub const DEFAULT_HISTORY_CAPACITY: usize = 200;

/// One recorded prediction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub user_type: String,
    pub user_name: String,
    pub inputs: InputMap,
    pub label: ObesityLevel,
    pub obesity_probability: f64,
}

#[derive(Debug)]
pub struct PredictionSession {
    model: Arc<TrainedModel>,
    history: VecDeque<HistoryEntry>,
    capacity: usize,
    last: Option<PredictionResult>,
}

impl PredictionSession {
    pub fn new(model: Arc<TrainedModel>) -> Self {
        Self::with_capacity(model, DEFAULT_HISTORY_CAPACITY)
    }

    /// A session keeping at most `capacity` history entries.
    pub fn with_capacity(model: Arc<TrainedModel>, capacity: usize) -> Self {
        Self {
            model,
            history: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
            last: None,
        }
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    /// Predict and record the result. Failed predictions leave the session
    /// untouched.
    pub fn predict(
        &mut self,
        input: &InputMap,
        user_type: &str,
        user_name: &str,
    ) -> Result<&PredictionResult> {
        let result = self.model.predict_input(input)?;

        if self.capacity > 0 {
            if self.history.len() == self.capacity {
                self.history.pop_back();
            }
            self.history.push_front(HistoryEntry {
                timestamp: Utc::now(),
                user_type: user_type.to_string(),
                user_name: user_name.to_string(),
                inputs: input.clone(),
                label: result.label,
                obesity_probability: result.obesity_probability(),
            });
        }

        Ok(&*self.last.insert(result))
    }

    pub fn last_result(&self) -> Option<&PredictionResult> {
        self.last.as_ref()
    }

    /// Entries, newest first.
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.last = None;
    }

    /// Write the history as CSV, newest first.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec!["timestamp", "user_type", "user_name"];
        header.extend_from_slice(&FIELD_NAMES);
        header.extend_from_slice(&["label", "obesity_probability"]);
        wtr.write_record(&header)?;

        for entry in &self.history {
            let mut row = vec![
                entry.timestamp.to_rfc3339(),
                entry.user_type.clone(),
                entry.user_name.clone(),
            ];
            for field in FIELD_NAMES {
                row.push(match entry.inputs.get(field) {
                    Some(RawValue::Number(n)) => n.to_string(),
                    Some(RawValue::Text(s)) => s.clone(),
                    None => String::new(),
                });
            }
            row.push(entry.label.as_str().to_string());
            row.push(format!("{:.4}", entry.obesity_probability));
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
