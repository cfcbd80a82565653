use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of rows rendered in the grid.
pub const DISPLAY_ROW_CAP: usize = 30;

/// Fully materialised result of a query, in the order the engine returned it.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display strings for the first `cap` rows.
    pub fn display_rows(&self, cap: usize) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .take(cap)
            .map(|row| row.iter().map(display_value).collect())
            .collect()
    }
}

pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders binary data as `0x`-prefixed lowercase hex.
pub fn hex_value(bytes: &[u8]) -> Value {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    Value::String(out)
}
