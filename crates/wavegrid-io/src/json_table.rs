//! JSON lookup tables: `{"shape": [a, b, c], "data": [...]}`.
//!
//! `data` is flat and row-major. Shapes with one or two axes are promoted the
//! same way as NPY arrays.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use wavegrid_core::LookupTable;

/// Serialized form of a lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonTable {
    /// Axis lengths, one to three entries.
    pub shape: Vec<usize>,
    /// Row-major samples.
    pub data: Vec<f32>,
}

impl JsonTable {
    /// Validate into a [`LookupTable`].
    pub fn into_table(self) -> Result<LookupTable> {
        Ok(LookupTable::from_dims(self.data, &self.shape)?)
    }
}

impl From<&LookupTable> for JsonTable {
    fn from(table: &LookupTable) -> Self {
        Self {
            shape: table.shape().to_vec(),
            data: table.data().to_vec(),
        }
    }
}

/// Parse a JSON table from a string.
pub fn parse_json_table(text: &str) -> Result<LookupTable> {
    let raw: JsonTable = serde_json::from_str(text)?;
    raw.into_table()
}

/// Read a JSON table file.
pub fn read_json_table<P: AsRef<Path>>(path: P) -> Result<LookupTable> {
    let text = std::fs::read_to_string(path)?;
    parse_json_table(&text)
}

/// Write a table as JSON.
pub fn write_json_table<P: AsRef<Path>>(path: P, table: &LookupTable) -> Result<()> {
    let text = serde_json::to_string(&JsonTable::from(table))?;
    std::fs::write(path, text)?;
    Ok(())
}
