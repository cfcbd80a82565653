use std::path::Path;

use log::{error, info};

use crate::{
    db::{self, sql, DbClient},
    errors::DbError,
    export::export_to_csv,
    models::{
        connection::ConnectionSpec,
        filter::{FilterBar, FilterSpec},
        rowset::{RowSet, DISPLAY_ROW_CAP},
        schema::SchemaSnapshot,
    },
};

/// What the grid currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows fetched before the display cap was applied.
    pub total_rows: usize,
}

/// Browses one database over a single connection.
///
/// The schema is reflected once in [`Viewer::open`] and never refreshed.
pub struct Viewer {
    connection_string: String,
    /// Connection string without the password, for logs.
    log_name: String,
    client: Box<dyn DbClient + Send + Sync>,
    schema: SchemaSnapshot,
    selected_table: Option<String>,
    grid: Grid,
    filter: FilterBar,
    result: Option<RowSet>,
}

impl Viewer {
    pub async fn open(spec: &ConnectionSpec) -> Result<Self, DbError> {
        let client = db::connect(spec).await?;
        Self::with_client(spec, client).await
    }

    /// Reflects the schema through `client`; the client is closed if that fails.
    pub async fn with_client(
        spec: &ConnectionSpec,
        client: Box<dyn DbClient + Send + Sync>,
    ) -> Result<Self, DbError> {
        let log_name = spec.redacted();
        let schema = match db::reflect_schema(client.as_ref()).await {
            Ok(schema) => schema,
            Err(err) => {
                error!("Reflection failed for {}: {}", log_name, err);
                client.close().await;
                return Err(err);
            }
        };

        Ok(Self {
            connection_string: spec.connection_string(),
            log_name,
            client,
            schema,
            selected_table: None,
            grid: Grid::default(),
            filter: FilterBar::default(),
            result: None,
        })
    }

    pub fn title(&self) -> &str {
        &self.connection_string
    }

    pub fn tables(&self) -> Vec<&str> {
        self.schema.table_names()
    }

    pub fn columns(&self, table: &str) -> Option<Vec<String>> {
        self.schema.columns(table)
    }

    pub fn selected_table(&self) -> Option<&str> {
        self.selected_table.as_deref()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn filter(&self) -> &FilterBar {
        &self.filter
    }

    /// Filter inputs; edits take effect on the next [`Viewer::apply_filter`].
    pub fn filter_mut(&mut self) -> &mut FilterBar {
        &mut self.filter
    }

    /// Full result behind the grid, including rows past the display cap.
    pub fn result(&self) -> Option<&RowSet> {
        self.result.as_ref()
    }

    /// Shows `table` unfiltered, resetting headers and the filter bar.
    pub async fn select_table(&mut self, table: &str) -> Result<(), DbError> {
        let columns = self
            .schema
            .columns(table)
            .ok_or_else(|| DbError::UnknownTable(table.to_string()))?;

        self.selected_table = Some(table.to_string());
        self.grid.headers = columns.clone();
        self.filter.reset(columns);
        self.populate(None).await
    }

    /// Re-runs the current table's query with the filter bar's predicate.
    pub async fn apply_filter(&mut self) -> Result<(), DbError> {
        let Some(table) = self.selected_table.clone() else {
            return Ok(());
        };
        let Some(spec) = self.filter.to_spec() else {
            return Ok(());
        };

        let known = self
            .schema
            .table(&table)
            .map(|t| t.columns.iter().any(|c| c.name == spec.column))
            .unwrap_or(false);
        if !known {
            return Err(DbError::UnknownColumn(spec.column));
        }

        self.populate(Some(spec)).await
    }

    pub async fn clear_filter(&mut self) -> Result<(), DbError> {
        if self.selected_table.is_none() {
            return Ok(());
        }
        self.filter.value.clear();
        self.populate(None).await
    }

    async fn populate(&mut self, filter: Option<FilterSpec>) -> Result<(), DbError> {
        let Some(table) = self.selected_table.clone() else {
            return Ok(());
        };
        let query = sql::select_all(self.client.dialect(), &table, filter.as_ref());

        self.grid.rows.clear();
        self.grid.total_rows = 0;
        self.result = None;
        self.filter.applied = None;

        let result = self.client.query(&query).await?;

        self.grid.rows = result.display_rows(DISPLAY_ROW_CAP);
        self.grid.total_rows = result.len();
        self.filter.applied = filter;
        self.result = Some(result);
        info!(
            "{}: showing {} of {} rows",
            table,
            self.grid.rows.len(),
            self.grid.total_rows
        );

        Ok(())
    }

    /// Writes every fetched row of the current table to `file_path`.
    pub fn export_to(&self, file_path: &Path) -> Result<(), DbError> {
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| DbError::Export("no table selected".to_string()))?;
        export_to_csv(result, file_path)
    }

    /// Releases the viewer's connection.
    pub async fn close(self) {
        info!("Closing {}", self.log_name);
        self.client.close().await;
    }
}
