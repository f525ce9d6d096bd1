//! Feature encoding: raw survey answers to the fixed-order numeric vector.
//!
//! Two versioned layouts exist; a trained model records the one it was
//! trained with so inference encodes identically.
//!
//! | Scheme | Id | Width | Layout |
//! |--------|----|-------|--------|
//! | [`EncodingScheme::Full`] | `full-v1` | 20 | all answers, CAEC/CALC ordinal, MTRANS one-hot |
//! | [`EncodingScheme::Screening`] | `screening-v1` | 12 | habit answers only, collapsed to binary flags |
//!
//! Every categorical answer is validated under both schemes, including those
//! the scheme does not emit.
//!
//! # Example
//!
//! ```ignore
//! use obesity_risk::encoding::{EncodingScheme, FeatureEncoder};
//!
//! let encoder = FeatureEncoder::new(EncodingScheme::Full);
//! let encoded = encoder.encode_input(&input)?;
//! assert_eq!(encoded.features.len(), encoder.n_features());
//! ```

pub mod range;
pub mod table;

pub use range::{check_range, RangeWarning, NUMERIC_RANGES};

use crate::dataset::{InputMap, RawRecord};
use crate::error::EncodingError;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use table::{frequency_binary, transport_motorized, FREQUENCY, GENDER, TRANSPORT, YES_NO};

const FULL_FEATURES: [&str; 20] = [
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
    "MTRANS_Automobile",
    "MTRANS_Bike",
    "MTRANS_Motorbike",
    "MTRANS_Public_Transportation",
    "MTRANS_Walking",
];

const SCREENING_FEATURES: [&str; 12] = [
    "family_history",
    "FAVC",
    "FCVC",
    "NCP",
    "CAEC_bin",
    "SMOKE",
    "CH2O",
    "SCC",
    "FAF_bin",
    "TUE",
    "CALC_bin",
    "MTRANS_bin",
];

/// Versioned feature layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingScheme {
    /// All sixteen answers, twenty features.
    #[default]
    #[serde(rename = "full-v1")]
    Full,
    /// The twelve-feature habit screening layout.
    #[serde(rename = "screening-v1")]
    Screening,
}

impl EncodingScheme {
    /// Stable identifier stored alongside trained models.
    pub fn id(self) -> &'static str {
        match self {
            EncodingScheme::Full => "full-v1",
            EncodingScheme::Screening => "screening-v1",
        }
    }

    /// Output feature names in vector order.
    pub fn feature_names(self) -> &'static [&'static str] {
        match self {
            EncodingScheme::Full => &FULL_FEATURES,
            EncodingScheme::Screening => &SCREENING_FEATURES,
        }
    }
}

impl fmt::Display for EncodingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for EncodingScheme {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-v1" | "full" => Ok(EncodingScheme::Full),
            "screening-v1" | "screening" => Ok(EncodingScheme::Screening),
            other => Err(EncodingError::UnknownCategory {
                field: "scheme".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// An encoded feature vector plus the range warnings raised on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedRecord {
    pub features: Vec<f64>,
    pub warnings: Vec<RangeWarning>,
}

/// Every answer checked and reduced to codes and rounded numbers.
struct Validated {
    gender: u8,
    family_history: u8,
    favc: u8,
    caec: u8,
    smoke: u8,
    scc: u8,
    calc: u8,
    mtrans: u8,
    age: f64,
    height: f64,
    weight: f64,
    fcvc: f64,
    ncp: f64,
    ch2o: f64,
    faf: f64,
    tue: f64,
}

fn round_decimals(value: f64, decimals: i32) -> f64 {
    if decimals == 0 {
        return value.round_ties_even();
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Maps raw records to encoded feature vectors under one scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureEncoder {
    scheme: EncodingScheme,
}

impl FeatureEncoder {
    pub fn new(scheme: EncodingScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> EncodingScheme {
        self.scheme
    }

    /// Output feature names in vector order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        self.scheme.feature_names()
    }

    /// Width of every encoded vector.
    pub fn n_features(&self) -> usize {
        self.feature_names().len()
    }

    fn numeric(
        field: &str,
        value: f64,
        decimals: i32,
        warnings: &mut Vec<RangeWarning>,
    ) -> Result<f64, EncodingError> {
        if value.is_infinite() {
            return Err(EncodingError::InvalidValue {
                field: field.to_string(),
                reason: "value is not finite".to_string(),
            });
        }
        if let Some(warning) = check_range(field, value) {
            log::warn!("{}", warning);
            warnings.push(warning);
        }
        Ok(round_decimals(value, decimals))
    }

    fn validate(record: &RawRecord) -> Result<(Validated, Vec<RangeWarning>), EncodingError> {
        let mut warnings = Vec::new();
        let validated = Validated {
            gender: GENDER.code("Gender", &record.gender)?,
            family_history: YES_NO.code("family_history", &record.family_history)?,
            favc: YES_NO.code("FAVC", &record.favc)?,
            caec: FREQUENCY.code("CAEC", &record.caec)?,
            smoke: YES_NO.code("SMOKE", &record.smoke)?,
            scc: YES_NO.code("SCC", &record.scc)?,
            calc: FREQUENCY.code("CALC", &record.calc)?,
            mtrans: TRANSPORT.code("MTRANS", &record.mtrans)?,
            age: Self::numeric("Age", record.age, 0, &mut warnings)?,
            height: Self::numeric("Height", record.height, 2, &mut warnings)?,
            weight: Self::numeric("Weight", record.weight, 2, &mut warnings)?,
            fcvc: Self::numeric("FCVC", record.fcvc, 0, &mut warnings)?,
            ncp: Self::numeric("NCP", record.ncp, 0, &mut warnings)?,
            ch2o: Self::numeric("CH2O", record.ch2o, 0, &mut warnings)?,
            faf: Self::numeric("FAF", record.faf, 0, &mut warnings)?,
            tue: Self::numeric("TUE", record.tue, 0, &mut warnings)?,
        };
        Ok((validated, warnings))
    }

    /// Encode one record.
    ///
    /// # Errors
    /// - [`EncodingError::UnknownCategory`] for any categorical answer outside its table
    /// - [`EncodingError::InvalidValue`] for an infinite numeric answer
    ///
    /// A NaN numeric (an empty CSV cell) is kept as NaN for the imputer.
    /// Inference refuses such records before they get here.
    pub fn encode(&self, record: &RawRecord) -> Result<EncodedRecord, EncodingError> {
        let (v, warnings) = Self::validate(record)?;
        let code = f64::from;

        let features = match self.scheme {
            EncodingScheme::Full => {
                let mut out = vec![
                    code(v.gender),
                    v.age,
                    v.height,
                    v.weight,
                    code(v.family_history),
                    code(v.favc),
                    v.fcvc,
                    v.ncp,
                    code(v.caec),
                    code(v.smoke),
                    v.ch2o,
                    code(v.scc),
                    v.faf,
                    v.tue,
                    code(v.calc),
                ];
                out.extend((0..TRANSPORT.len() as u8).map(|i| code(u8::from(i == v.mtrans))));
                out
            }
            EncodingScheme::Screening => {
                let faf_bin = if v.faf.is_nan() {
                    f64::NAN
                } else if v.faf >= 2.0 {
                    1.0
                } else {
                    0.0
                };
                vec![
                    code(v.family_history),
                    code(v.favc),
                    v.fcvc,
                    v.ncp,
                    code(frequency_binary(v.caec)),
                    code(v.smoke),
                    v.ch2o,
                    code(v.scc),
                    faf_bin,
                    v.tue,
                    code(frequency_binary(v.calc)),
                    code(transport_motorized(v.mtrans)),
                ]
            }
        };

        debug_assert_eq!(features.len(), self.n_features());
        Ok(EncodedRecord { features, warnings })
    }

    /// Validate an input mapping and encode it.
    pub fn encode_input(&self, input: &InputMap) -> Result<EncodedRecord, EncodingError> {
        let record = RawRecord::from_input(input)?;
        self.encode(&record)
    }

    /// Encode many records into an `(n_records, n_features)` matrix.
    ///
    /// Fails on the first record that cannot be encoded.
    pub fn encode_batch(&self, records: &[RawRecord]) -> Result<Array2<f64>, EncodingError> {
        let mut out = Array2::<f64>::zeros((records.len(), self.n_features()));
        for (mut row, record) in out.rows_mut().into_iter().zip(records) {
            let encoded = self.encode(record)?;
            row.assign(&ArrayView1::from(&encoded.features[..]));
        }
        Ok(out)
    }
}
