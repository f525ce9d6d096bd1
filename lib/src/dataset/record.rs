//! Raw survey records and the loose input mapping used by the production API.

use crate::error::EncodingError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column names of a raw record, in dataset order.
pub const FIELD_NAMES: [&str; 16] = [
    "Gender",
    "Age",
    "Height",
    "Weight",
    "family_history",
    "FAVC",
    "FCVC",
    "NCP",
    "CAEC",
    "SMOKE",
    "CH2O",
    "SCC",
    "FAF",
    "TUE",
    "CALC",
    "MTRANS",
];

/// Fields holding categorical text answers.
pub const CATEGORICAL_FIELDS: [&str; 8] = [
    "Gender",
    "family_history",
    "FAVC",
    "CAEC",
    "SMOKE",
    "SCC",
    "CALC",
    "MTRANS",
];

/// Fields holding numeric answers.
pub const NUMERIC_FIELDS: [&str; 8] = [
    "Age", "Height", "Weight", "FCVC", "NCP", "CH2O", "FAF", "TUE",
];

/// A single answer as it arrives from a form or a JSON document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        RawValue::Number(f64::from(v))
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

/// Field name to raw answer.
pub type InputMap = BTreeMap<String, RawValue>;

/// One survey response. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Height")]
    pub height: f64,
    #[serde(rename = "Weight")]
    pub weight: f64,
    pub family_history: String,
    #[serde(rename = "FAVC")]
    pub favc: String,
    #[serde(rename = "FCVC")]
    pub fcvc: f64,
    #[serde(rename = "NCP")]
    pub ncp: f64,
    #[serde(rename = "CAEC")]
    pub caec: String,
    #[serde(rename = "SMOKE")]
    pub smoke: String,
    #[serde(rename = "CH2O")]
    pub ch2o: f64,
    #[serde(rename = "SCC")]
    pub scc: String,
    #[serde(rename = "FAF")]
    pub faf: f64,
    #[serde(rename = "TUE")]
    pub tue: f64,
    #[serde(rename = "CALC")]
    pub calc: String,
    #[serde(rename = "MTRANS")]
    pub mtrans: String,
}

fn text_field(input: &InputMap, field: &str) -> Result<String, EncodingError> {
    match input.get(field) {
        None => Err(EncodingError::MissingField(field.to_string())),
        Some(RawValue::Text(s)) => Ok(s.clone()),
        Some(RawValue::Number(v)) => Err(EncodingError::InvalidValue {
            field: field.to_string(),
            reason: format!("expected a category name, got number {}", v),
        }),
    }
}

fn numeric_field(input: &InputMap, field: &str) -> Result<f64, EncodingError> {
    let value = match input.get(field) {
        None => return Err(EncodingError::MissingField(field.to_string())),
        Some(RawValue::Number(v)) => *v,
        Some(RawValue::Text(s)) => s.trim().parse::<f64>().map_err(|_| {
            EncodingError::InvalidValue {
                field: field.to_string(),
                reason: format!("'{}' is not a number", s),
            }
        })?,
    };
    if !value.is_finite() {
        return Err(EncodingError::InvalidValue {
            field: field.to_string(),
            reason: format!("{} is not a finite number", value),
        });
    }
    Ok(value)
}

impl RawRecord {
    /// Build a record from a field-name mapping.
    ///
    /// Extra keys are ignored. Numeric fields accept numeric strings such as `"25"`.
    ///
    /// # Errors
    /// - [`EncodingError::MissingField`] when a field is absent
    /// - [`EncodingError::InvalidValue`] when a value has the wrong kind, or is
    ///   NaN or infinite (text such as `"nan"` included)
    pub fn from_input(input: &InputMap) -> Result<Self, EncodingError> {
        Ok(Self {
            gender: text_field(input, "Gender")?,
            age: numeric_field(input, "Age")?,
            height: numeric_field(input, "Height")?,
            weight: numeric_field(input, "Weight")?,
            family_history: text_field(input, "family_history")?,
            favc: text_field(input, "FAVC")?,
            fcvc: numeric_field(input, "FCVC")?,
            ncp: numeric_field(input, "NCP")?,
            caec: text_field(input, "CAEC")?,
            smoke: text_field(input, "SMOKE")?,
            ch2o: numeric_field(input, "CH2O")?,
            scc: text_field(input, "SCC")?,
            faf: numeric_field(input, "FAF")?,
            tue: numeric_field(input, "TUE")?,
            calc: text_field(input, "CALC")?,
            mtrans: text_field(input, "MTRANS")?,
        })
    }

    /// The inverse of [`RawRecord::from_input`].
    pub fn to_input(&self) -> InputMap {
        let mut map = InputMap::new();
        for field in FIELD_NAMES {
            let value = match self.text(field) {
                Some(s) => RawValue::Text(s.to_string()),
                None => RawValue::Number(self.number(field).unwrap_or(f64::NAN)),
            };
            map.insert(field.to_string(), value);
        }
        map
    }

    /// Categorical answer by column name.
    pub fn text(&self, field: &str) -> Option<&str> {
        let value = match field {
            "Gender" => &self.gender,
            "family_history" => &self.family_history,
            "FAVC" => &self.favc,
            "CAEC" => &self.caec,
            "SMOKE" => &self.smoke,
            "SCC" => &self.scc,
            "CALC" => &self.calc,
            "MTRANS" => &self.mtrans,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Numeric answer by column name.
    pub fn number(&self, field: &str) -> Option<f64> {
        let value = match field {
            "Age" => self.age,
            "Height" => self.height,
            "Weight" => self.weight,
            "FCVC" => self.fcvc,
            "NCP" => self.ncp,
            "CH2O" => self.ch2o,
            "FAF" => self.faf,
            "TUE" => self.tue,
            _ => return None,
        };
        Some(value)
    }

    /// First numeric field left empty (NaN), if any.
    ///
    /// Only CSV rows can carry one; [`RawRecord::from_input`] never builds such a record.
    pub fn first_missing(&self) -> Option<&'static str> {
        NUMERIC_FIELDS
            .iter()
            .copied()
            .find(|field| self.number(field).is_some_and(f64::is_nan))
    }

    /// Body mass index from the raw height and weight.
    pub fn bmi(&self) -> f64 {
        self.weight / (self.height * self.height)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_input() -> InputMap {
        let mut m = InputMap::new();
        m.insert("Gender".into(), "Male".into());
        m.insert("Age".into(), 25.into());
        m.insert("Height".into(), 1.75.into());
        m.insert("Weight".into(), 80.into());
        m.insert("family_history".into(), "yes".into());
        m.insert("FAVC".into(), "yes".into());
        m.insert("FCVC".into(), 2.into());
        m.insert("NCP".into(), 3.into());
        m.insert("CAEC".into(), "Sometimes".into());
        m.insert("SMOKE".into(), "no".into());
        m.insert("CH2O".into(), 2.into());
        m.insert("SCC".into(), "no".into());
        m.insert("FAF".into(), 1.into());
        m.insert("TUE".into(), 1.into());
        m.insert("CALC".into(), "Sometimes".into());
        m.insert("MTRANS".into(), "Public_Transportation".into());
        m
    }

    #[test]
    fn test_from_input_valid() {
        let record = RawRecord::from_input(&sample_input()).unwrap();
        assert_eq!(record.gender, "Male");
        assert_eq!(record.age, 25.0);
        assert_eq!(record.mtrans, "Public_Transportation");
        assert!((record.bmi() - 80.0 / (1.75 * 1.75)).abs() < 1e-12);
    }

    #[test]
    fn test_from_input_missing_field() {
        let mut input = sample_input();
        input.remove("TUE");
        assert_eq!(
            RawRecord::from_input(&input),
            Err(EncodingError::MissingField("TUE".to_string()))
        );
    }

    #[test]
    fn test_from_input_numeric_string() {
        let mut input = sample_input();
        input.insert("Age".into(), " 31 ".into());
        assert_eq!(RawRecord::from_input(&input).unwrap().age, 31.0);
    }

    #[test]
    fn test_from_input_wrong_kinds() {
        let mut input = sample_input();
        input.insert("Age".into(), "twenty".into());
        assert!(matches!(
            RawRecord::from_input(&input),
            Err(EncodingError::InvalidValue { .. })
        ));

        let mut input = sample_input();
        input.insert("Gender".into(), 1.into());
        assert!(matches!(
            RawRecord::from_input(&input),
            Err(EncodingError::InvalidValue { .. })
        ));

        let mut input = sample_input();
        input.insert("Weight".into(), f64::INFINITY.into());
        assert!(matches!(
            RawRecord::from_input(&input),
            Err(EncodingError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_from_input_rejects_nan() {
        for value in [RawValue::from("NaN"), RawValue::from("nan"), RawValue::Number(f64::NAN)] {
            let mut input = sample_input();
            input.insert("Weight".into(), value);
            assert!(matches!(
                RawRecord::from_input(&input),
                Err(EncodingError::InvalidValue { field, .. }) if field == "Weight"
            ));
        }
    }

    #[test]
    fn test_first_missing() {
        let mut record = RawRecord::from_input(&sample_input()).unwrap();
        assert_eq!(record.first_missing(), None);
        record.faf = f64::NAN;
        record.height = f64::NAN;
        assert_eq!(record.first_missing(), Some("Height"));
    }

    #[test]
    fn test_to_input_roundtrip() {
        let record = RawRecord::from_input(&sample_input()).unwrap();
        let again = RawRecord::from_input(&record.to_input()).unwrap();
        assert_eq!(record, again);
    }

    #[test]
    fn test_input_map_from_json() {
        let json = r#"{"Gender":"Female","Age":"40","Height":1.6,"Weight":70,
            "family_history":"no","FAVC":"no","FCVC":3,"NCP":1,"CAEC":"no",
            "SMOKE":"no","CH2O":1,"SCC":"yes","FAF":0,"TUE":2,"CALC":"no",
            "MTRANS":"Walking"}"#;
        let input: InputMap = serde_json::from_str(json).unwrap();
        assert_eq!(input["Height"], RawValue::Number(1.6));
        let record = RawRecord::from_input(&input).unwrap();
        assert_eq!(record.age, 40.0);
        assert_eq!(record.scc, "yes");
    }
}
