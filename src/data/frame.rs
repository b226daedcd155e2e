//! Column-oriented tables loaded from CSV files or inline JSON columns.
//!
//! Both dataset shapes the service accepts are column-major:
//!
//! - request bodies: `{"ds": [...], "y": [...]}`
//! - CSV files: one column per header
//!
//! `Frame` normalizes the two into one structure the engines can consume.
//!
//! Design goals:
//! - lowercase, BOM-tolerant header matching (spreadsheet exports are messy)
//! - cell-level tolerance: a value that does not parse becomes NaN and is
//!   filtered by the consuming engine, instead of failing the whole table
//! - no fitting logic here

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde_json::Value;

use crate::error::EngineError;

#[derive(Debug, Clone, Default)]
pub struct Frame {
    columns: BTreeMap<String, Vec<Value>>,
    rows: usize,
}

impl Frame {
    /// Load a CSV file with a header row into a frame.
    ///
    /// Numeric-looking cells become JSON numbers, everything else stays a
    /// string. Short rows are padded with nulls (`flexible` reader).
    pub fn from_csv(path: &Path) -> Result<Frame, EngineError> {
        let file = File::open(path).map_err(|e| {
            EngineError::validation(format!("Failed to open dataset '{}': {e}", path.display()))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| EngineError::validation(format!("Failed to read CSV headers: {e}")))?
            .iter()
            .map(normalize_header_name)
            .collect();

        let mut columns: BTreeMap<String, Vec<Value>> =
            headers.iter().map(|h| (h.clone(), Vec::new())).collect();
        let mut rows = 0usize;

        for record in reader.records() {
            let record = record
                .map_err(|e| EngineError::validation(format!("CSV parse error: {e}")))?;
            for (idx, header) in headers.iter().enumerate() {
                let cell = record.get(idx).map(str::trim).unwrap_or("");
                if let Some(col) = columns.get_mut(header) {
                    col.push(parse_cell(cell));
                }
            }
            rows += 1;
        }

        Ok(Frame { columns, rows })
    }

    /// Build a frame from inline JSON columns (`{"field": [values, ...]}`).
    ///
    /// Non-array members are ignored; array members must all have the same
    /// length.
    pub fn from_inline(body: &serde_json::Map<String, Value>) -> Result<Frame, EngineError> {
        let mut columns = BTreeMap::new();
        let mut rows: Option<usize> = None;

        for (key, value) in body {
            let Some(items) = value.as_array() else {
                continue;
            };
            match rows {
                None => rows = Some(items.len()),
                Some(n) if n != items.len() => {
                    return Err(EngineError::validation(format!(
                        "Inline columns must have equal length ('{key}' has {}, expected {n})",
                        items.len()
                    )));
                }
                Some(_) => {}
            }
            columns.insert(normalize_header_name(key), items.clone());
        }

        Ok(Frame {
            columns,
            rows: rows.unwrap_or(0),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Validate that every required column is present.
    pub fn require_columns(&self, required: &[&str]) -> Result<(), EngineError> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !self.has_column(name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            let quoted: Vec<String> = required.iter().map(|n| format!("'{n}'")).collect();
            Err(EngineError::validation(format!(
                "Input must contain {} columns",
                quoted.join(" and ")
            )))
        }
    }

    /// Extract a numeric column. Unparseable cells become NaN.
    pub fn col_f64(&self, name: &str) -> Result<Vec<f64>, EngineError> {
        let col = self
            .columns
            .get(name)
            .ok_or_else(|| EngineError::validation(format!("Missing required column: '{name}'")))?;
        Ok(col.iter().map(cell_to_f64).collect())
    }

    /// Extract a column as trimmed strings (empty for nulls).
    pub fn col_str(&self, name: &str) -> Result<Vec<String>, EngineError> {
        let col = self
            .columns
            .get(name)
            .ok_or_else(|| EngineError::validation(format!("Missing required column: '{name}'")))?;
        Ok(col
            .iter()
            .map(|v| match v {
                Value::String(s) => s.trim().to_string(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect())
    }
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿ds"). If we don't strip it, schema validation will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(v) = cell.parse::<f64>() {
        if v.is_finite() {
            if let Some(num) = serde_json::Number::from_f64(v) {
                return Value::Number(num);
            }
        }
    }
    Value::String(cell.to_string())
}

fn cell_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inline_frame_reads_numeric_columns() {
        let body = json!({"price": [10.0, 12.0], "units": [5, 4], "note": "ignored"});
        let frame = Frame::from_inline(body.as_object().unwrap()).unwrap();
        assert_eq!(frame.rows(), 2);
        assert_eq!(frame.col_f64("price").unwrap(), vec![10.0, 12.0]);
        assert_eq!(frame.col_f64("units").unwrap(), vec![5.0, 4.0]);
        assert!(!frame.has_column("note"));
    }

    #[test]
    fn inline_frame_rejects_ragged_columns() {
        let body = json!({"ds": ["2024-01-01"], "y": [1.0, 2.0]});
        let err = Frame::from_inline(body.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn unparseable_cells_surface_as_nan() {
        let body = json!({"y": [1.0, "oops", null]});
        let frame = Frame::from_inline(body.as_object().unwrap()).unwrap();
        let y = frame.col_f64("y").unwrap();
        assert_eq!(y[0], 1.0);
        assert!(y[1].is_nan());
        assert!(y[2].is_nan());
    }

    #[test]
    fn require_columns_reports_missing_schema() {
        let body = json!({"spend": [1.0]});
        let frame = Frame::from_inline(body.as_object().unwrap()).unwrap();
        let err = frame.require_columns(&["spend", "conversions"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'spend'") && msg.contains("'conversions'"));
    }
}
