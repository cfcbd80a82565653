use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default: Option<String>,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Tables and their columns, reflected once from a live connection.
///
/// Table names iterate in sorted order so repeated reads agree.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SchemaSnapshot {
    tables: BTreeMap<String, TableSchema>,
}

impl SchemaSnapshot {
    pub fn new(tables: impl IntoIterator<Item = TableSchema>) -> Self {
        Self {
            tables: tables
                .into_iter()
                .map(|t| (t.table_name.clone(), t))
                .collect(),
        }
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn table(&self, table_name: &str) -> Option<&TableSchema> {
        self.tables.get(table_name)
    }

    pub fn columns(&self, table_name: &str) -> Option<Vec<String>> {
        self.table(table_name).map(TableSchema::column_names)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
