//! Tabular JSON documents rendered as HTML tables.
//!
//! Accepts the layouts pandas' `read_json` understands for a frame:
//! - a list of records: `[{"a": 1, "b": 2}, ...]`
//! - columns of index → value: `{"a": {"0": 1, "1": 3}, ...}`
//! - columns of arrays: `{"a": [1, 3], ...}`
//! - a list of rows: `[[1, 2], [3, 4]]`

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Write as _;

use crate::error::ColgadosError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub index: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Text shown for a single cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl DataTable {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ColgadosError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ColgadosError::UpstreamPayload(format!("invalid JSON document: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ColgadosError> {
        match value {
            Value::Array(items) => Ok(Self::from_array(items)),
            Value::Object(map) => Self::from_object(map),
            other => Err(ColgadosError::UpstreamPayload(format!(
                "expected a JSON array or object, got {other}"
            ))),
        }
    }

    fn from_array(items: Vec<Value>) -> Self {
        let index = (0..items.len()).map(|i| i.to_string()).collect();

        if items.iter().all(Value::is_object) {
            let mut columns: Vec<String> = Vec::new();
            for item in &items {
                if let Value::Object(record) = item {
                    for key in record.keys() {
                        if !columns.contains(key) {
                            columns.push(key.clone());
                        }
                    }
                }
            }
            let rows = items
                .iter()
                .map(|item| {
                    columns
                        .iter()
                        .map(|c| item.get(c).cloned().unwrap_or(Value::Null))
                        .collect()
                })
                .collect();
            return Self {
                columns,
                index,
                rows,
            };
        }

        let rows: Vec<Vec<Value>> = items
            .into_iter()
            .map(|item| match item {
                Value::Array(cells) => cells,
                scalar => vec![scalar],
            })
            .collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self {
            columns: (0..width).map(|i| i.to_string()).collect(),
            index,
            rows,
        }
    }

    fn from_object(map: Map<String, Value>) -> Result<Self, ColgadosError> {
        let columns: Vec<String> = map.keys().cloned().collect();

        if map.values().all(Value::is_object) {
            let mut index: Vec<String> = Vec::new();
            for column in map.values() {
                if let Value::Object(cells) = column {
                    for key in cells.keys() {
                        if !index.contains(key) {
                            index.push(key.clone());
                        }
                    }
                }
            }
            let rows = index
                .iter()
                .map(|idx| {
                    map.values()
                        .map(|column| column.get(idx).cloned().unwrap_or(Value::Null))
                        .collect()
                })
                .collect();
            return Ok(Self {
                columns,
                index,
                rows,
            });
        }

        if map.values().all(Value::is_array) {
            let height = map
                .values()
                .filter_map(Value::as_array)
                .map(Vec::len)
                .max()
                .unwrap_or(0);
            let rows = (0..height)
                .map(|i| {
                    map.values()
                        .map(|column| column.get(i).cloned().unwrap_or(Value::Null))
                        .collect()
                })
                .collect();
            return Ok(Self {
                columns,
                index: (0..height).map(|i| i.to_string()).collect(),
                rows,
            });
        }

        Err(ColgadosError::UpstreamPayload(
            "object values must be all objects or all arrays".to_string(),
        ))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `dataframe`-style HTML with an index column; every cell is escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n  <thead>\n");
        html.push_str("    <tr style=\"text-align: right;\">\n      <th></th>\n");
        for column in &self.columns {
            let _ = writeln!(html, "      <th>{}</th>", html_escape::encode_text(column));
        }
        html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
        for (idx, row) in self.index.iter().zip(&self.rows) {
            html.push_str("    <tr>\n");
            let _ = writeln!(html, "      <th>{}</th>", html_escape::encode_text(idx));
            for cell in row {
                let _ = writeln!(
                    html,
                    "      <td>{}</td>",
                    html_escape::encode_text(&cell_text(cell))
                );
            }
            html.push_str("    </tr>\n");
        }
        html.push_str("  </tbody>\n</table>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_keep_key_order_and_fill_gaps() {
        let table = DataTable::from_value(json!([
            {"Workcenter": "Pintura 1", "Rate": 120},
            {"Workcenter": "Pintura 2", "Rate": 95, "Turno": "B"}
        ]))
        .unwrap();
        assert_eq!(table.columns, vec!["Workcenter", "Rate", "Turno"]);
        assert_eq!(table.index, vec!["0", "1"]);
        assert_eq!(table.rows[0], vec![json!("Pintura 1"), json!(120), Value::Null]);
        assert_eq!(table.rows[1][2], json!("B"));
    }

    #[test]
    fn column_oriented_object() {
        let table = DataTable::from_value(json!({
            "Workcenter": {"0": "Pintura 1", "1": "Pintura 2"},
            "Rate": {"0": 120, "1": 95}
        }))
        .unwrap();
        assert_eq!(table.columns, vec!["Workcenter", "Rate"]);
        assert_eq!(table.index, vec!["0", "1"]);
        assert_eq!(table.rows[1], vec![json!("Pintura 2"), json!(95)]);
    }

    #[test]
    fn columns_of_arrays() {
        let table = DataTable::from_value(json!({"a": [1, 2, 3], "b": ["x"]})).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[2], vec![json!(3), Value::Null]);
    }

    #[test]
    fn list_of_rows_gets_positional_columns() {
        let table = DataTable::from_value(json!([[1, 2], [3]])).unwrap();
        assert_eq!(table.columns, vec!["0", "1"]);
        assert_eq!(table.rows[1], vec![json!(3), Value::Null]);
    }

    #[test]
    fn scalars_are_rejected() {
        assert!(DataTable::from_value(json!({"a": 1, "b": 2})).is_err());
        assert!(DataTable::from_value(json!("plain")).is_err());
        assert!(DataTable::from_slice(b"not json").is_err());
    }

    #[test]
    fn html_escapes_cells_and_headers() {
        let table = DataTable::from_value(json!([{"<b>": "a & b", "n": null}])).unwrap();
        let html = table.to_html();
        assert!(html.starts_with("<table border=\"1\" class=\"dataframe\">"));
        assert!(html.contains("<th>&lt;b&gt;</th>"));
        assert!(html.contains("<td>a &amp; b</td>"));
        assert!(html.contains("<td></td>"));
        assert!(html.contains("<th>0</th>"));
    }
}
