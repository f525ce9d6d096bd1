//! CSV loading and writing for the eating-habits survey dataset.
//!
//! The header must start with the sixteen [`FIELD_NAMES`] in order; the final
//! column is the target, whatever it is called (`NObeyesdad`, `Obesity`, ...).

use super::{LabeledDataset, ObesityLevel, RawRecord, FIELD_NAMES};
use crate::error::{ObesityError, Result};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Default target column name used when writing.
pub const DEFAULT_TARGET_COLUMN: &str = "NObeyesdad";

/// Load a labeled survey dataset from a CSV file.
///
/// # Errors
/// - [`ObesityError::Io`] if the file cannot be opened
/// - [`ObesityError::Dataset`] on a wrong header, an unparsable cell, or an unknown target
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<LabeledDataset> {
    let file = File::open(path.as_ref())?;
    let dataset = read_csv(BufReader::new(file))?;
    log::info!(
        "Loaded {} survey records from {}",
        dataset.len(),
        path.as_ref().display()
    );
    Ok(dataset)
}

/// Read a labeled survey dataset from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<LabeledDataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    validate_headers(&headers)?;

    let mut records = Vec::new();
    let mut labels = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let line = row + 2;
        let cells = result?;
        records.push(parse_record(&cells, line)?);

        let target = &cells[FIELD_NAMES.len()];
        let level = target.parse::<ObesityLevel>().map_err(|_| {
            ObesityError::Dataset(format!("line {}: unknown obesity level '{}'", line, target))
        })?;
        labels.push(level);
    }

    LabeledDataset::new(records, labels)
}

fn validate_headers(headers: &StringRecord) -> Result<()> {
    for (position, expected) in FIELD_NAMES.iter().enumerate() {
        match headers.get(position) {
            Some(found) if found == *expected => {}
            Some(found) => {
                return Err(ObesityError::Dataset(format!(
                    "expected column '{}' at position {}, found '{}'",
                    expected, position, found
                )))
            }
            None => {
                return Err(ObesityError::Dataset(format!(
                    "missing column '{}'",
                    expected
                )))
            }
        }
    }
    match headers.len() {
        n if n == FIELD_NAMES.len() + 1 => Ok(()),
        n if n == FIELD_NAMES.len() => Err(ObesityError::Dataset(
            "missing target column after 'MTRANS'".to_string(),
        )),
        n => Err(ObesityError::Dataset(format!(
            "expected {} columns, found {}",
            FIELD_NAMES.len() + 1,
            n
        ))),
    }
}

fn parse_number(cells: &StringRecord, index: usize, line: usize) -> Result<f64> {
    let cell = &cells[index];
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|_| {
        ObesityError::Dataset(format!(
            "line {}: column '{}' holds '{}', expected a number",
            line, FIELD_NAMES[index], cell
        ))
    })
}

fn parse_record(cells: &StringRecord, line: usize) -> Result<RawRecord> {
    let text = |i: usize| cells[i].to_string();
    Ok(RawRecord {
        gender: text(0),
        age: parse_number(cells, 1, line)?,
        height: parse_number(cells, 2, line)?,
        weight: parse_number(cells, 3, line)?,
        family_history: text(4),
        favc: text(5),
        fcvc: parse_number(cells, 6, line)?,
        ncp: parse_number(cells, 7, line)?,
        caec: text(8),
        smoke: text(9),
        ch2o: parse_number(cells, 10, line)?,
        scc: text(11),
        faf: parse_number(cells, 12, line)?,
        tue: parse_number(cells, 13, line)?,
        calc: text(14),
        mtrans: text(15),
    })
}

/// Write a labeled dataset as CSV with a `NObeyesdad` target column.
pub fn write_csv<W: Write>(dataset: &LabeledDataset, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header: Vec<&str> = FIELD_NAMES.to_vec();
    header.push(DEFAULT_TARGET_COLUMN);
    wtr.write_record(&header)?;

    for (record, label) in dataset.iter() {
        let mut row: Vec<String> = FIELD_NAMES
            .iter()
            .map(|field| match record.text(field) {
                Some(s) => s.to_string(),
                None => match record.number(field) {
                    Some(v) if v.is_nan() => String::new(),
                    Some(v) => v.to_string(),
                    None => String::new(),
                },
            })
            .collect();
        row.push(label.as_str().to_string());
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a labeled dataset to a CSV file.
pub fn save_csv<P: AsRef<Path>>(dataset: &LabeledDataset, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_csv(dataset, BufWriter::new(file))
}
