//! Survey data: raw records, target classes and labeled datasets.
//!
//! # Core Concepts
//!
//! - **Raw record** ([`RawRecord`]): one survey response with eight categorical
//!   and eight numeric answers, keyed by the dataset column names.
//! - **Input map** ([`InputMap`]): the loose `field -> value` form the
//!   production API accepts.
//! - **Labeled dataset** ([`LabeledDataset`]): records paired with their
//!   [`ObesityLevel`].
//!
//! # Example
//!
//! ```no_run
//! use obesity_risk::dataset::load_csv;
//!
//! let dataset = load_csv("data/ObesityDataSet.csv").unwrap();
//! println!("{} rows, class counts {:?}", dataset.len(), dataset.class_counts());
//! ```

pub mod level;
pub mod record;
pub mod survey;
pub mod synthetic;

pub use self::level::ObesityLevel;
pub use self::record::{
    InputMap, RawRecord, RawValue, CATEGORICAL_FIELDS, FIELD_NAMES, NUMERIC_FIELDS,
};
pub use self::survey::{load_csv, read_csv, save_csv, write_csv};
pub use self::synthetic::generate_survey;

use crate::error::{ObesityError, Result};

/// Survey records paired with their target class.
#[derive(Clone, Debug, Default)]
pub struct LabeledDataset {
    records: Vec<RawRecord>,
    labels: Vec<ObesityLevel>,
}

impl LabeledDataset {
    /// Creates a dataset, checking that records and labels line up.
    ///
    /// # Errors
    ///
    /// Returns [`ObesityError::InvalidParameter`] if the lengths differ.
    pub fn new(records: Vec<RawRecord>, labels: Vec<ObesityLevel>) -> Result<Self> {
        if records.len() != labels.len() {
            return Err(ObesityError::InvalidParameter(format!(
                "{} records but {} labels",
                records.len(),
                labels.len()
            )));
        }
        Ok(Self { records, labels })
    }

    pub(crate) fn from_parts(records: Vec<RawRecord>, labels: Vec<ObesityLevel>) -> Self {
        debug_assert_eq!(records.len(), labels.len());
        Self { records, labels }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks whether the dataset has no samples.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn labels(&self) -> &[ObesityLevel] {
        &self.labels
    }

    /// Class indices of the labels, in sample order.
    pub fn label_indices(&self) -> Vec<usize> {
        self.labels.iter().map(|l| l.index()).collect()
    }

    /// Number of samples per class, indexed by [`ObesityLevel::index`].
    pub fn class_counts(&self) -> [usize; ObesityLevel::COUNT] {
        let mut counts = [0; ObesityLevel::COUNT];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }

    /// Iterate over `(record, label)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&RawRecord, ObesityLevel)> {
        self.records.iter().zip(self.labels.iter().copied())
    }

    /// Copy out the samples at `indices`, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`ObesityError::InvalidParameter`] on an out-of-range index.
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        let mut records = Vec::with_capacity(indices.len());
        let mut labels = Vec::with_capacity(indices.len());
        for &i in indices {
            let record = self.records.get(i).ok_or_else(|| {
                ObesityError::InvalidParameter(format!(
                    "sample index {} out of range for {} samples",
                    i,
                    self.len()
                ))
            })?;
            records.push(record.clone());
            labels.push(self.labels[i]);
        }
        Ok(Self { records, labels })
    }

    /// Append one sample.
    pub fn push(&mut self, record: RawRecord, label: ObesityLevel) {
        self.records.push(record);
        self.labels.push(label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_length_mismatch() {
        let ds = generate_survey(3, 0);
        let result = LabeledDataset::new(ds.records().to_vec(), vec![ObesityLevel::NormalWeight]);
        assert!(matches!(result, Err(ObesityError::InvalidParameter(_))));
    }

    #[test]
    fn test_subset_and_counts() {
        let ds = generate_survey(14, 0);
        let sub = ds.subset(&[0, 7, 1]).unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.labels()[0], ObesityLevel::InsufficientWeight);
        assert_eq!(sub.labels()[1], ObesityLevel::InsufficientWeight);
        assert_eq!(sub.labels()[2], ObesityLevel::NormalWeight);
        assert_eq!(sub.class_counts()[0], 2);
        assert!(ds.subset(&[99]).is_err());
    }

    #[test]
    fn test_push_and_empty() {
        let mut ds = LabeledDataset::default();
        assert!(ds.is_empty());
        let src = generate_survey(1, 0);
        ds.push(src.records()[0].clone(), ObesityLevel::ObesityTypeIII);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.label_indices(), vec![6]);
    }
}
