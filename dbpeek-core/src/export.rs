use std::{
    fs::File,
    path::{Path, PathBuf},
};

use csv::Writer;
use log::info;

use crate::{
    errors::DbError,
    models::rowset::{display_value, RowSet},
};

/// File name used when exporting `table` to the working directory.
pub fn export_file_name(table: &str) -> PathBuf {
    let stem: String = table
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    PathBuf::from(format!("{}.csv", stem))
}

/// Data export from a fetched result to CSV, header row first.
pub fn export_to_csv(result: &RowSet, file_path: &Path) -> Result<(), DbError> {
    let file = File::create(file_path).map_err(|e| DbError::Export(e.to_string()))?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(&result.columns)
        .map_err(|e| DbError::Export(e.to_string()))?;

    for row in &result.rows {
        let csv_row: Vec<String> = row.iter().map(display_value).collect();
        wtr.write_record(&csv_row)
            .map_err(|e| DbError::Export(e.to_string()))?;
    }

    wtr.flush().map_err(|e| DbError::Export(e.to_string()))?;
    info!("Exported {} rows to {}", result.len(), file_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("users"), PathBuf::from("users.csv"));
        assert_eq!(export_file_name("my table/x"), PathBuf::from("my_table_x.csv"));
    }

    #[test]
    fn test_export_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        let result = RowSet::new(
            vec!["name".to_string(), "email".to_string()],
            vec![
                vec![json!("Alice"), json!("alice@example.com")],
                vec![json!("Bob, Jr."), Value::Null],
            ],
        );

        export_to_csv(&result, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "name,email\nAlice,alice@example.com\n\"Bob, Jr.\",NULL\n"
        );
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let result = RowSet::default();
        assert!(matches!(export_to_csv(&result, &path), Err(DbError::Export(_))));
    }
}
