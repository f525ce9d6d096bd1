//! Fixed category tables.
//!
//! Lookups are exact and case-sensitive; the dataset spells every answer one way.

use crate::error::EncodingError;

/// A closed set of category names and their codes.
#[derive(Debug, Clone, Copy)]
pub struct CategoryTable {
    entries: &'static [(&'static str, u8)],
}

impl CategoryTable {
    const fn new(entries: &'static [(&'static str, u8)]) -> Self {
        Self { entries }
    }

    /// Code for `value`, or [`EncodingError::UnknownCategory`] naming `field`.
    pub fn code(&self, field: &str, value: &str) -> Result<u8, EncodingError> {
        self.entries
            .iter()
            .find(|(name, _)| *name == value)
            .map(|&(_, code)| code)
            .ok_or_else(|| EncodingError::UnknownCategory {
                field: field.to_string(),
                value: value.to_string(),
            })
    }

    /// Category names in code order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|&(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub const GENDER: CategoryTable = CategoryTable::new(&[("Female", 0), ("Male", 1)]);

pub const YES_NO: CategoryTable = CategoryTable::new(&[("no", 0), ("yes", 1)]);

/// CAEC and CALC answers.
pub const FREQUENCY: CategoryTable = CategoryTable::new(&[
    ("no", 0),
    ("Sometimes", 1),
    ("Frequently", 2),
    ("Always", 3),
]);

pub const TRANSPORT: CategoryTable = CategoryTable::new(&[
    ("Automobile", 0),
    ("Bike", 1),
    ("Motorbike", 2),
    ("Public_Transportation", 3),
    ("Walking", 4),
]);

/// Frequency code collapsed to "at least frequently".
pub fn frequency_binary(code: u8) -> u8 {
    u8::from(code >= 2)
}

/// Transport code collapsed to "motorized".
pub fn transport_motorized(code: u8) -> u8 {
    // Automobile, Motorbike, Public_Transportation
    u8::from(matches!(code, 0 | 2 | 3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup() {
        assert_eq!(GENDER.code("Gender", "Male"), Ok(1));
        assert_eq!(FREQUENCY.code("CAEC", "Always"), Ok(3));
        assert_eq!(TRANSPORT.code("MTRANS", "Walking"), Ok(4));
    }

    #[test]
    fn test_table_lookup_is_case_sensitive() {
        assert_eq!(
            YES_NO.code("SMOKE", "Yes"),
            Err(EncodingError::UnknownCategory {
                field: "SMOKE".to_string(),
                value: "Yes".to_string()
            })
        );
    }

    #[test]
    fn test_binary_collapses() {
        let bins: Vec<u8> = (0..4).map(frequency_binary).collect();
        assert_eq!(bins, vec![0, 0, 1, 1]);
        let motorized: Vec<u8> = (0..5).map(transport_motorized).collect();
        assert_eq!(motorized, vec![1, 0, 1, 1, 0]);
    }

    #[test]
    fn test_names_in_code_order() {
        let names: Vec<_> = TRANSPORT.names().collect();
        assert_eq!(names[3], "Public_Transportation");
        assert_eq!(TRANSPORT.len(), 5);
    }
}
