//! ---
//! eco_section: "11-simulation"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "CSV telemetry import and observation export."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use csv::{ReaderBuilder, Trim};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::Result;
use crate::observation::Observation;

/// Raw CSV cell: numeric when it parses as a finite number, text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(number) if number.is_finite() => FieldValue::Number(number),
            _ => FieldValue::Text(raw.to_owned()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(number) => Some(*number),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Number(_) => None,
        }
    }
}

/// One CSV row keyed by lower-cased header names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ImportedRecord {
    fields: IndexMap<String, FieldValue>,
}

impl ImportedRecord {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn magnitude(&self, key: &str, row: usize) -> f64 {
        match self.fields.get(key) {
            Some(FieldValue::Number(value)) => *value,
            Some(FieldValue::Text(raw)) => {
                debug!(row, field = key, raw = %raw, "non-numeric value, using 0");
                0.0
            }
            None => {
                debug!(row, field = key, "missing field, using 0");
                0.0
            }
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.fields
            .get("timestamp")
            .and_then(FieldValue::as_text)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
    }
}

/// Parse CSV text into header-keyed records.
///
/// Headers are trimmed and lower-cased; rows map positionally. Short rows
/// simply lack the trailing fields, and blank rows are skipped.
pub fn parse_csv(text: &str) -> Result<Vec<ImportedRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.to_lowercase())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        let fields = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(header, value)| (header.clone(), FieldValue::parse(value)))
            .collect();
        records.push(ImportedRecord { fields });
    }
    Ok(records)
}

/// Import CSV telemetry as observations.
///
/// Magnitude fields that are missing or non-numeric become `0`. Rows whose
/// `timestamp` is not RFC 3339 are placed on an hourly grid ending at `now`,
/// keeping file order. An input without data rows yields an empty vector.
pub fn import_csv(text: &str, now: DateTime<Utc>) -> Result<Vec<Observation>> {
    let records = parse_csv(text)?;
    let count = records.len();
    let observations: Vec<Observation> = records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let timestamp = record.timestamp().unwrap_or_else(|| {
                now - Duration::hours(i64::try_from(count - 1 - row).unwrap_or(i64::MAX / 3600))
            });
            Observation {
                timestamp,
                energy: record.magnitude("energy", row),
                water: record.magnitude("water", row),
                waste: record.magnitude("waste", row),
                carbon: record.magnitude("carbon", row),
                occupancy: record.magnitude("occupancy", row),
                temperature: record.magnitude("temperature", row),
            }
        })
        .collect();
    info!(rows = observations.len(), "imported csv telemetry");
    Ok(observations)
}

pub fn import_csv_file(path: &Path, now: DateTime<Utc>) -> Result<Vec<Observation>> {
    let text = fs::read_to_string(path)?;
    import_csv(&text, now)
}

/// Write observations as CSV with a header row.
pub fn write_csv<W: Write>(writer: W, observations: &[Observation]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for observation in observations {
        writer.serialize(observation)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write observations as a pretty-printed JSON array.
pub fn write_json<W: Write>(writer: W, observations: &[Observation]) -> Result<()> {
    serde_json::to_writer_pretty(writer, observations)?;
    Ok(())
}
