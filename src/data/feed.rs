//! Observation files handed over by the market-data collaborator.
//!
//! Accepts either a JSON array of records or JSON lines. Each record is
//! decoded on its own so one bad row only costs that row.

use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{AppResult, FlowError};
use crate::flow::types::ObservationRecord;

#[derive(Clone, Debug, Default)]
pub struct FeedRead {
    pub records: Vec<ObservationRecord>,
    pub errors: Vec<FlowError>,
}

pub fn load_observations(path: impl AsRef<Path>) -> AppResult<FeedRead> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(parse_observations(&content))
}

pub fn parse_observations(content: &str) -> FeedRead {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut out = FeedRead::default();

    if content.trim_start().starts_with('[') {
        match serde_json::from_str::<Vec<Value>>(content) {
            Ok(values) => {
                for (idx, value) in values.into_iter().enumerate() {
                    push_record(&mut out, idx + 1, value);
                }
            }
            Err(e) => out.errors.push(FlowError::parse(None, format!("observation array: {}", e))),
        }
        return out;
    }

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => push_record(&mut out, idx + 1, value),
            Err(e) => out
                .errors
                .push(FlowError::parse(None, format!("line {}: {}", idx + 1, e))),
        }
    }
    out
}

fn push_record(out: &mut FeedRead, position: usize, value: Value) {
    let ticker = value.get("ticker").and_then(Value::as_str).map(str::to_string);
    match serde_json::from_value::<ObservationRecord>(value) {
        Ok(record) => out.records.push(record),
        Err(e) => out.errors.push(FlowError::parse(
            ticker.as_deref(),
            format!("record {}: {}", position, e),
        )),
    }
}
