use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{HrError, Result};
use crate::record::Record;

/// Read a record list from a `.json` array of objects or a `.csv` file with a
/// header row.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let records = match ext.as_str() {
        "json" => parse_json(&std::fs::read_to_string(path)?)?,
        "csv" => parse_csv(std::fs::File::open(path)?)?,
        _ => return Err(HrError::UnknownFormat(path.display().to_string())),
    };
    debug!(path = %path.display(), count = records.len(), "records loaded");
    Ok(records)
}

pub fn parse_json(content: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(items) = value else {
        return Err(HrError::InvalidInput(
            "expected a JSON array of records".into(),
        ));
    };
    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => records.push(map),
            other => warn!("skipping element {i}: not an object ({other})"),
        }
    }
    Ok(records)
}

pub fn parse_csv<R: std::io::Read>(reader: R) -> Result<Vec<Record>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(std::io::BufReader::new(reader));
    let headers = rdr.headers()?.clone();
    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.to_string(), Value::String(v.to_string())))
            .collect();
        records.push(record);
    }
    Ok(records)
}

/// Parse a `field=value` filter. Values that read as JSON numbers or
/// booleans filter by that typed value, everything else by string.
pub fn parse_filter(spec: &str) -> Result<(String, Value)> {
    let Some((field, raw)) = spec.split_once('=') else {
        return Err(HrError::InvalidInput(format!(
            "filter must look like field=value, got '{spec}'"
        )));
    };
    let field = field.trim();
    if field.is_empty() {
        return Err(HrError::InvalidInput(format!("filter has no field: '{spec}'")));
    }
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(raw.to_string()),
    };
    Ok((field.to_string(), value))
}
