use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ColgadosError;
use crate::types::table::cell_text;

/// Inputs of the PLEX rates data source.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlexInputs {
    #[serde(rename = "Part_Key")]
    pub part_key: i64,
    #[serde(rename = "Part_Operation_Key")]
    pub part_operation_key: i64,
}

#[derive(Debug, Serialize)]
pub struct PlexRequest {
    pub inputs: PlexInputs,
}

/// Response of `POST /api/datasources/{id}/execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlexResponse {
    #[serde(default)]
    pub tables: Vec<PlexTable>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlexTable {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl PlexResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, ColgadosError> {
        serde_json::from_slice(body)
            .map_err(|e| ColgadosError::UpstreamPayload(format!("invalid PLEX JSON: {e}")))
    }

    pub fn into_first_table(self) -> Result<PlexTable, ColgadosError> {
        self.tables
            .into_iter()
            .next()
            .ok_or_else(|| ColgadosError::UpstreamPayload("response has no tables".to_string()))
    }
}

impl PlexTable {
    /// Rows as display text, ready for the template.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect()
    }
}
