use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;
use sqlx::Column;

use crate::{
    errors::DbError,
    models::{
        connection::{ConnectionSpec, Dialect},
        rowset::RowSet,
        schema::{SchemaSnapshot, TableSchema},
    },
};

pub mod mysql;
pub mod postgres;
pub mod sql;
pub mod sqlite;

#[async_trait]
pub trait DbClient {
    fn dialect(&self) -> Dialect;
    async fn query(&self, query: &str) -> Result<RowSet, DbError>;
    async fn list_tables(&self) -> Result<Vec<String>, DbError>;
    async fn describe_table(&self, table_name: &str) -> Result<TableSchema, DbError>;
    async fn close(&self);
}

pub(crate) fn column_names<C: Column>(columns: &[C]) -> Vec<String> {
    columns.iter().map(|c| c.name().to_string()).collect()
}

/// How a driver type is turned into a cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellKind {
    Bool,
    Int2,
    Int4,
    Int8,
    UInt8,
    Float4,
    Float8,
    Decimal,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    Bytes,
    Text,
}

/// Falls back to a `<TYPE>` placeholder for values no decoder accepted.
pub(crate) fn cell_or_placeholder(
    decoded: Result<Value, sqlx::Error>,
    type_name: &str,
    index: usize,
) -> Value {
    decoded.unwrap_or_else(|e| {
        warn!("Cannot decode {} value in column {}: {}", type_name, index, e);
        Value::String(format!("<{}>", type_name))
    })
}

/// Opens the single connection a viewer works over.
pub async fn connect(spec: &ConnectionSpec) -> Result<Box<dyn DbClient + Send + Sync>, DbError> {
    let url = spec.driver_url();
    info!("Connecting to {}", spec.redacted());
    if !spec.dialect.is_supported() {
        return Err(DbError::UnsupportedDialect(spec.dialect));
    }

    let client: Box<dyn DbClient + Send + Sync> = match spec.dialect {
        Dialect::Sqlite => Box::new(sqlite::SqliteClient::connect(&url).await?),
        Dialect::MySql => Box::new(mysql::MySqlClient::connect(&url).await?),
        Dialect::PostgreSql => Box::new(postgres::PostgresClient::connect(&url).await?),
        other => return Err(DbError::UnsupportedDialect(other)),
    };

    Ok(client)
}

/// Reflects every table and its columns in one pass.
pub async fn reflect_schema(client: &(dyn DbClient + Send + Sync)) -> Result<SchemaSnapshot, DbError> {
    let tables = client
        .list_tables()
        .await
        .map_err(|e| DbError::Reflection(e.to_string()))?;

    let mut schemas = Vec::with_capacity(tables.len());
    for table in &tables {
        let schema = client
            .describe_table(table)
            .await
            .map_err(|e| DbError::Reflection(format!("{}: {}", table, e)))?;
        schemas.push(schema);
    }

    let snapshot = SchemaSnapshot::new(schemas);
    info!("Reflected {} tables", snapshot.len());
    Ok(snapshot)
}
