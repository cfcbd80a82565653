use std::str::FromStr;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Executor, Row, SqlitePool, Statement, TypeInfo, ValueRef,
};

use crate::{
    errors::DbError,
    models::{
        connection::Dialect,
        rowset::{hex_value, RowSet},
        schema::{ColumnSchema, TableSchema},
    },
};

use super::{cell_or_placeholder, column_names, sql::quote_identifier, CellKind, DbClient};

pub struct SqliteClient {
    pub pool: SqlitePool,
}

impl SqliteClient {
    /// Opens an existing database file; a missing file is a connection error.
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| DbError::Connection(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }
}

/// Values carry their storage class, whatever the declared column type.
fn cell_kind(type_name: &str) -> CellKind {
    match type_name {
        "INTEGER" => CellKind::Int8,
        "REAL" => CellKind::Float8,
        "BLOB" => CellKind::Bytes,
        _ => CellKind::Text,
    }
}

fn decode_cell(row: &SqliteRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return Value::Null,
    };

    let decoded = match cell_kind(&type_name) {
        CellKind::Int8 => row.try_get::<i64, _>(index).map(Value::from),
        CellKind::Float8 => row.try_get::<f64, _>(index).map(Value::from),
        CellKind::Bytes => row.try_get::<Vec<u8>, _>(index).map(|b| hex_value(&b)),
        _ => row.try_get::<String, _>(index).map(Value::String),
    };

    cell_or_placeholder(decoded, &type_name, index)
}

#[async_trait]
impl DbClient for SqliteClient {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn query(&self, query: &str) -> Result<RowSet, DbError> {
        debug!("sqlite: {}", query);
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Sqlx)?;

        let columns = match rows.first() {
            Some(row) => column_names(row.columns()),
            None => column_names(self.pool.prepare(query).await?.columns()),
        };

        let results = rows
            .iter()
            .map(|row| (0..row.len()).map(|i| decode_cell(row, i)).collect())
            .collect();

        Ok(RowSet::new(columns, results))
    }

    async fn list_tables(&self) -> Result<Vec<String>, DbError> {
        let query = r#"
            SELECT name
            FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
        "#;
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Sqlx)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(DbError::Sqlx))
            .collect()
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableSchema, DbError> {
        let query = format!(
            "PRAGMA table_info({})",
            quote_identifier(Dialect::Sqlite, table_name)
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Sqlx)?;

        let columns = rows
            .iter()
            .map(|row| {
                Ok(ColumnSchema {
                    name: row.try_get("name")?,
                    data_type: row.try_get("type")?,
                    is_nullable: row.try_get::<i64, _>("notnull")? == 0,
                    default: row.try_get("dflt_value")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(TableSchema {
            table_name: table_name.to_string(),
            columns,
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn memory_client() -> SqliteClient {
        let client = SqliteClient::connect("sqlite::memory:").await.unwrap();
        sqlx::query(
            r#"
            CREATE TABLE items (
                id INTEGER PRIMARY KEY,
                label TEXT NOT NULL DEFAULT 'x',
                price REAL,
                payload BLOB
            );
            INSERT INTO items (id, label, price, payload) VALUES (1, 'bolt', 0.25, x'cafe');
            INSERT INTO items (id, label, price, payload) VALUES (2, 'nut', NULL, NULL);
            "#,
        )
        .execute(&client.pool)
        .await
        .unwrap();
        client
    }

    #[tokio::test]
    async fn test_query_decodes_storage_classes() {
        let client = memory_client().await;
        let result = client.query("SELECT * FROM items ORDER BY id").await.unwrap();

        assert_eq!(result.columns, vec!["id", "label", "price", "payload"]);
        assert_eq!(result.rows[0], vec![json!(1), json!("bolt"), json!(0.25), json!("0xcafe")]);
        assert_eq!(result.rows[1], vec![json!(2), json!("nut"), Value::Null, Value::Null]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_text_shows_placeholder() {
        let client = memory_client().await;
        let result = client
            .query("SELECT id, CAST(x'ff' AS TEXT) AS broken FROM items WHERE id = 1")
            .await
            .unwrap();
        assert_eq!(result.rows[0], vec![json!(1), json!("<TEXT>")]);
    }

    #[test]
    fn test_cell_kind_by_storage_class() {
        assert_eq!(cell_kind("INTEGER"), CellKind::Int8);
        assert_eq!(cell_kind("REAL"), CellKind::Float8);
        assert_eq!(cell_kind("BLOB"), CellKind::Bytes);
        assert_eq!(cell_kind("TEXT"), CellKind::Text);
    }

    #[tokio::test]
    async fn test_empty_result_keeps_columns() {
        let client = memory_client().await;
        let result = client
            .query("SELECT * FROM items WHERE id > 100")
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns, vec!["id", "label", "price", "payload"]);
    }

    #[tokio::test]
    async fn test_describe_table() {
        let client = memory_client().await;
        let schema = client.describe_table("items").await.unwrap();

        assert_eq!(schema.column_names(), vec!["id", "label", "price", "payload"]);
        assert_eq!(schema.columns[1].data_type, "TEXT");
        assert!(!schema.columns[1].is_nullable);
        assert_eq!(schema.columns[1].default.as_deref(), Some("'x'"));
        assert!(schema.columns[2].is_nullable);
    }

    #[tokio::test]
    async fn test_list_tables_skips_internal_tables() {
        let client = memory_client().await;
        sqlx::query("CREATE TABLE seq (id INTEGER PRIMARY KEY AUTOINCREMENT)")
            .execute(&client.pool)
            .await
            .unwrap();

        let tables = client.list_tables().await.unwrap();
        assert_eq!(tables, vec!["items".to_string(), "seq".to_string()]);
    }
}
