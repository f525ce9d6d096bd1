//! Expected ranges of the numeric survey answers.
//!
//! Out-of-range values are still encoded; they only produce a [`RangeWarning`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// `(field, min, max)` as observed in the survey.
pub const NUMERIC_RANGES: [(&str, f64, f64); 8] = [
    ("Age", 14.0, 61.0),
    ("Height", 1.45, 1.98),
    ("Weight", 39.0, 173.0),
    ("FCVC", 1.0, 3.0),
    ("NCP", 1.0, 4.0),
    ("CH2O", 1.0, 3.0),
    ("FAF", 0.0, 3.0),
    ("TUE", 0.0, 2.0),
];

/// A numeric answer outside its expected range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeWarning {
    pub field: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} outside expected range [{}, {}]",
            self.field, self.value, self.min, self.max
        )
    }
}

/// Check `value` against the range of `field`. NaN is never flagged.
pub fn check_range(field: &str, value: f64) -> Option<RangeWarning> {
    let &(name, min, max) = NUMERIC_RANGES.iter().find(|(name, _, _)| *name == field)?;
    if value.is_nan() || (min..=max).contains(&value) {
        return None;
    }
    Some(RangeWarning {
        field: name.to_string(),
        value,
        min,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_is_silent() {
        assert_eq!(check_range("Age", 25.0), None);
        assert_eq!(check_range("Height", 1.45), None);
        assert_eq!(check_range("FAF", f64::NAN), None);
    }

    #[test]
    fn test_out_of_range_warns() {
        let w = check_range("Age", 90.0).unwrap();
        assert_eq!(w.field, "Age");
        assert_eq!(w.max, 61.0);
        assert!(w.to_string().contains("Age=90"));
    }

    #[test]
    fn test_unknown_field_is_silent() {
        assert_eq!(check_range("Gender", 5.0), None);
    }
}
