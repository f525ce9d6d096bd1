//! The seven obesity levels, in their fixed class-index order.

use crate::error::EncodingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target class of the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObesityLevel {
    #[serde(rename = "Insufficient_Weight")]
    InsufficientWeight,
    #[serde(rename = "Normal_Weight")]
    NormalWeight,
    #[serde(rename = "Overweight_Level_I")]
    OverweightLevelI,
    #[serde(rename = "Overweight_Level_II")]
    OverweightLevelII,
    #[serde(rename = "Obesity_Type_I")]
    ObesityTypeI,
    #[serde(rename = "Obesity_Type_II")]
    ObesityTypeII,
    #[serde(rename = "Obesity_Type_III")]
    ObesityTypeIII,
}

impl ObesityLevel {
    /// Every level, ordered by class index.
    pub const ALL: [ObesityLevel; 7] = [
        ObesityLevel::InsufficientWeight,
        ObesityLevel::NormalWeight,
        ObesityLevel::OverweightLevelI,
        ObesityLevel::OverweightLevelII,
        ObesityLevel::ObesityTypeI,
        ObesityLevel::ObesityTypeII,
        ObesityLevel::ObesityTypeIII,
    ];

    /// Number of classes.
    pub const COUNT: usize = 7;

    /// Class index used by the estimators.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Level for a class index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Dataset spelling, e.g. `Overweight_Level_I`.
    pub fn as_str(self) -> &'static str {
        match self {
            ObesityLevel::InsufficientWeight => "Insufficient_Weight",
            ObesityLevel::NormalWeight => "Normal_Weight",
            ObesityLevel::OverweightLevelI => "Overweight_Level_I",
            ObesityLevel::OverweightLevelII => "Overweight_Level_II",
            ObesityLevel::ObesityTypeI => "Obesity_Type_I",
            ObesityLevel::ObesityTypeII => "Obesity_Type_II",
            ObesityLevel::ObesityTypeIII => "Obesity_Type_III",
        }
    }

    /// Human-readable spelling, e.g. `Overweight Level I`.
    pub fn display_name(self) -> String {
        self.as_str().replace('_', " ")
    }

    /// True for the three `Obesity_Type_*` levels.
    pub fn is_obese(self) -> bool {
        matches!(
            self,
            ObesityLevel::ObesityTypeI | ObesityLevel::ObesityTypeII | ObesityLevel::ObesityTypeIII
        )
    }
}

impl fmt::Display for ObesityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObesityLevel {
    type Err = EncodingError;

    /// Accepts the dataset spelling and the spaced spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(' ', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| EncodingError::UnknownCategory {
                field: "target".to_string(),
                value: s.to_string(),
            })
    }
}
