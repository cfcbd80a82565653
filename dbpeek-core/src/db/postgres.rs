use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::debug;
use serde_json::Value;
use sqlx::{
    error::BoxDynError,
    postgres::{PgPoolOptions, PgRow, PgTypeKind},
    types::Decimal,
    Executor, PgPool, Row, Statement, TypeInfo, ValueRef,
};
use uuid::Uuid;

use crate::{
    errors::DbError,
    models::{
        connection::Dialect,
        rowset::{hex_value, RowSet},
        schema::{ColumnSchema, TableSchema},
    },
};

use super::{cell_or_placeholder, column_names, CellKind, DbClient};

pub struct PostgresClient {
    pub pool: PgPool,
}

impl PostgresClient {
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }
}

fn cell_kind(type_name: &str) -> CellKind {
    match type_name {
        "BOOL" => CellKind::Bool,
        "INT2" => CellKind::Int2,
        "INT4" => CellKind::Int4,
        "INT8" => CellKind::Int8,
        "FLOAT4" => CellKind::Float4,
        "FLOAT8" => CellKind::Float8,
        "NUMERIC" => CellKind::Decimal,
        "UUID" => CellKind::Uuid,
        "DATE" => CellKind::Date,
        "TIME" => CellKind::Time,
        "TIMESTAMP" => CellKind::Timestamp,
        "TIMESTAMPTZ" => CellKind::TimestampTz,
        "JSON" | "JSONB" => CellKind::Json,
        "BYTEA" => CellKind::Bytes,
        _ => CellKind::Text,
    }
}

/// Enum values travel as their label, even in the binary protocol.
fn enum_label(row: &PgRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    let decode_error = |source: BoxDynError| sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source,
    };
    if !matches!(raw.type_info().kind(), PgTypeKind::Enum(_)) {
        return Err(decode_error("not a text-like type".into()));
    }
    raw.as_str()
        .map(|label| Value::String(label.to_string()))
        .map_err(decode_error)
}

fn decode_cell(row: &PgRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return Value::Null,
    };

    let decoded = match cell_kind(&type_name) {
        CellKind::Bool => row.try_get::<bool, _>(index).map(Value::from),
        CellKind::Int2 => row.try_get::<i16, _>(index).map(Value::from),
        CellKind::Int4 => row.try_get::<i32, _>(index).map(Value::from),
        CellKind::Int8 | CellKind::UInt8 => row.try_get::<i64, _>(index).map(Value::from),
        CellKind::Float4 => row.try_get::<f32, _>(index).map(|v| Value::from(f64::from(v))),
        CellKind::Float8 => row.try_get::<f64, _>(index).map(Value::from),
        CellKind::Decimal => row.try_get::<Decimal, _>(index).map(|v| Value::String(v.to_string())),
        CellKind::Uuid => row.try_get::<Uuid, _>(index).map(|v| Value::String(v.to_string())),
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
        CellKind::Text => row
            .try_get::<String, _>(index)
            .map(Value::String)
            .or_else(|_| enum_label(row, index)),
    };

    cell_or_placeholder(decoded, &type_name, index)
}

#[async_trait]
impl DbClient for PostgresClient {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSql
    }

    async fn query(&self, query: &str) -> Result<RowSet, DbError> {
        debug!("postgresql: {}", query);
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
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = current_schema()
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
            SELECT column_name::text AS column_name,
                   data_type::text AS data_type,
                   is_nullable::text AS is_nullable,
                   column_default::text AS column_default
            FROM information_schema.columns
            WHERE table_schema = current_schema()
              AND table_name = $1
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_kind_by_type_name() {
        assert_eq!(cell_kind("INT4"), CellKind::Int4);
        assert_eq!(cell_kind("NUMERIC"), CellKind::Decimal);
        assert_eq!(cell_kind("TIMESTAMPTZ"), CellKind::TimestampTz);
        assert_eq!(cell_kind("JSONB"), CellKind::Json);
        assert_eq!(cell_kind("BYTEA"), CellKind::Bytes);
    }

    #[test]
    fn test_unknown_types_are_read_as_text() {
        for name in ["VARCHAR", "TEXT", "mood", "INTERVAL", "INET"] {
            assert_eq!(cell_kind(name), CellKind::Text, "{}", name);
        }
    }
}
