use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::debug;
use serde_json::Value;
use sqlx::{
    mysql::{MySqlPoolOptions, MySqlRow},
    types::Decimal,
    Executor, MySqlPool, Row, Statement, TypeInfo, ValueRef,
};

use crate::{
    errors::DbError,
    models::{
        connection::Dialect,
        rowset::{hex_value, RowSet},
        schema::{ColumnSchema, TableSchema},
    },
};

use super::{cell_or_placeholder, column_names, CellKind, DbClient};

pub struct MySqlClient {
    pub pool: MySqlPool,
}

impl MySqlClient {
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }
}

fn cell_kind(type_name: &str) -> CellKind {
    match type_name {
        "BOOLEAN" => CellKind::Bool,
        name if name.ends_with("INT UNSIGNED") => CellKind::UInt8,
        name if name.ends_with("INT") => CellKind::Int8,
        "FLOAT" => CellKind::Float4,
        "DOUBLE" => CellKind::Float8,
        "DECIMAL" => CellKind::Decimal,
        "DATE" => CellKind::Date,
        "TIME" => CellKind::Time,
        "DATETIME" => CellKind::Timestamp,
        "TIMESTAMP" => CellKind::TimestampTz,
        "JSON" => CellKind::Json,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => CellKind::Bytes,
        _ => CellKind::Text,
    }
}

/// Binary-collated strings only decode as bytes; keep them as text when they are UTF-8.
fn text_or_bytes(row: &MySqlRow, index: usize) -> Result<Value, sqlx::Error> {
    match row.try_get::<String, _>(index) {
        Ok(text) => Ok(Value::String(text)),
        Err(_) => row
            .try_get::<Vec<u8>, _>(index)
            .map(|bytes| match String::from_utf8(bytes) {
                Ok(text) => Value::String(text),
                Err(e) => hex_value(e.as_bytes()),
            }),
    }
}

fn decode_cell(row: &MySqlRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return Value::Null,
    };

    let decoded = match cell_kind(&type_name) {
        CellKind::Bool => row.try_get::<bool, _>(index).map(Value::from),
        CellKind::Int2 | CellKind::Int4 | CellKind::Int8 => {
            row.try_get::<i64, _>(index).map(Value::from)
        }
        CellKind::UInt8 => row.try_get::<u64, _>(index).map(Value::from),
        CellKind::Float4 => row.try_get::<f32, _>(index).map(|v| Value::from(f64::from(v))),
        CellKind::Float8 => row.try_get::<f64, _>(index).map(Value::from),
        CellKind::Decimal => row.try_get::<Decimal, _>(index).map(|v| Value::String(v.to_string())),
        CellKind::Date => row.try_get::<NaiveDate, _>(index).map(|v| Value::String(v.to_string())),
        CellKind::Time => row.try_get::<NaiveTime, _>(index).map(|v| Value::String(v.to_string())),
        CellKind::Timestamp => row
            .try_get::<NaiveDateTime, _>(index)
            .map(|v| Value::String(v.to_string())),
        CellKind::TimestampTz => row
            .try_get::<DateTime<Utc>, _>(index)
            .map(|v| Value::String(v.to_rfc3339())),
        CellKind::Json => row.try_get::<Value, _>(index),
        CellKind::Bytes => row.try_get::<Vec<u8>, _>(index).map(|b| hex_value(&b)),
        CellKind::Uuid | CellKind::Text => text_or_bytes(row, index),
    };

    cell_or_placeholder(decoded, &type_name, index)
}

#[async_trait]
impl DbClient for MySqlClient {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn query(&self, query: &str) -> Result<RowSet, DbError> {
        debug!("mysql: {}", query);
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
            SELECT CAST(table_name AS CHAR) AS table_name
            FROM information_schema.tables
            WHERE table_schema = DATABASE()
              AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Sqlx)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("table_name").map_err(DbError::Sqlx))
            .collect()
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableSchema, DbError> {
        let query = r#"
            SELECT CAST(column_name AS CHAR) AS column_name,
                   CAST(column_type AS CHAR) AS data_type,
                   CAST(is_nullable AS CHAR) AS is_nullable,
                   CAST(column_default AS CHAR) AS column_default
            FROM information_schema.columns
            WHERE table_schema = DATABASE()
              AND table_name = ?
            ORDER BY ordinal_position
        "#;
        let rows = sqlx::query(query)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Sqlx)?;

        let columns = rows
            .iter()
            .map(|row| {
                Ok(ColumnSchema {
                    name: row.try_get("column_name")?,
                    data_type: row.try_get("data_type")?,
                    is_nullable: row.try_get::<String, _>("is_nullable")? == "YES",
                    default: row.try_get("column_default")?,
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
