//! CSV ingest for timestamped sensor exports
//!
//! Turns a CGM or insulin-pump CSV into a clean, time-ordered series of
//! samples. Rows missing the value field are dropped rather than reported:
//! sensor exports are full of calibration rows and gaps, and treating each
//! one as an error would make most real files unloadable. A missing column,
//! by contrast, means the wrong file was selected and is a hard error.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::StringRecord;
use log::debug;

use crate::error::AnalyzerError;

/// Column names as written by the exports we ingest
pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const GLUCOSE_COLUMN: &str = "Glucose (mg/dL)";
pub const DOSE_COLUMN: &str = "Dose (units)";

/// Timestamp formats seen in CGM and pump exports, tried in order after RFC 3339
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
];

/// One timestamped value from a CSV row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Load a timestamped value series from a CSV file.
///
/// Returns samples sorted ascending by timestamp. Extra columns are ignored;
/// rows without a parseable timestamp or value are silently skipped.
pub fn load_series<P: AsRef<Path>>(
    path: P,
    timestamp_column: &str,
    value_column: &str,
) -> Result<Vec<Sample>, AnalyzerError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);

    let ts_idx = column_index(&header_map, timestamp_column)
        .ok_or_else(|| missing_column(path, timestamp_column))?;
    let value_idx = column_index(&header_map, value_column)
        .ok_or_else(|| missing_column(path, value_column))?;

    let mut samples = Vec::new();
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = record?;
        match parse_row(&record, ts_idx, value_idx) {
            Some(sample) => samples.push(sample),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(
            "{}: dropped {} rows without a usable '{}' value",
            path.display(),
            dropped,
            value_column
        );
    }

    samples.sort_by_key(|s| s.timestamp);
    Ok(samples)
}

fn parse_row(record: &StringRecord, ts_idx: usize, value_idx: usize) -> Option<Sample> {
    let timestamp = parse_timestamp(record.get(ts_idx)?)?;
    let value = record.get(value_idx)?.parse::<f64>().ok()?;
    Some(Sample { timestamp, value })
}

/// Parse a timestamp, accepting RFC 3339 or any of the known export formats
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

/// Excel emits UTF-8 CSVs with a BOM prefix on the first header; strip it so
/// column lookup doesn't report the column as missing.
fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn column_index(header_map: &HashMap<String, usize>, name: &str) -> Option<usize> {
    header_map.get(&normalize_header_name(name)).copied()
}

fn missing_column(path: &Path, column: &str) -> AnalyzerError {
    AnalyzerError::MissingColumn {
        column: column.to_string(),
        path: path.display().to_string(),
    }
}
