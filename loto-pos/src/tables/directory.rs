//! Table directory

use std::sync::Arc;

use loto_client::PosApi;
use shared::models::{Table, TableCreate};

use crate::error::{PosError, PosResult};

/// Tables shown on the floor plan: every permanent table plus the temporary
/// ones that are occupied.
pub struct TableDirectory {
    api: Arc<dyn PosApi>,
    tables: Vec<Table>,
    last_error: Option<String>,
    creating: bool,
}

impl TableDirectory {
    pub fn new(api: Arc<dyn PosApi>) -> Self {
        Self {
            api,
            tables: Vec::new(),
            last_error: None,
            creating: false,
        }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn occupied_count(&self) -> usize {
        self.tables.iter().filter(|t| t.is_occupied()).count()
    }

    pub fn free_count(&self) -> usize {
        self.tables.len() - self.occupied_count()
    }

    pub fn find(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    pub fn find_by_number(&self, number: u32) -> Option<&Table> {
        self.tables.iter().find(|t| t.number == number)
    }

    /// Reload the listing.
    ///
    /// A failure empties it and records the message; the error is handed back
    /// so callers can tell a rejected session from an outage.
    pub async fn refresh(&mut self) -> PosResult<()> {
        match self.api.list_tables().await {
            Ok(all) => {
                let total = all.len();
                self.tables = all.into_iter().filter(Table::is_listed).collect();
                self.last_error = None;
                tracing::debug!(total, listed = self.tables.len(), "Tables loaded");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load tables");
                self.tables.clear();
                self.last_error = Some(format!("Could not load tables: {e}"));
                Err(e.into())
            }
        }
    }

    /// Fresh listing, then the table shown with `number`
    pub async fn locate(&mut self, number: u32) -> PosResult<Table> {
        self.refresh().await?;
        self.find_by_number(number)
            .cloned()
            .ok_or_else(|| PosError::TableNotFound(number.to_string()))
    }

    /// Create an occupied temporary table after the highest listed number
    pub async fn open_temporary(&mut self) -> PosResult<Table> {
        if self.creating {
            return Err(PosError::CreationInProgress);
        }
        self.creating = true;
        let result = self.create_temporary().await;
        self.creating = false;

        match result {
            Ok(table) => {
                if self.refresh().await.is_err() {
                    tracing::warn!(number = table.number, "Listing not reloaded after creating the table");
                }
                Ok(table)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create temporary table");
                self.last_error = Some(format!("Could not create a temporary table: {e}"));
                Err(e)
            }
        }
    }

    async fn create_temporary(&self) -> PosResult<Table> {
        let number = self.tables.iter().map(|t| t.number).max().unwrap_or(0) + 1;
        let table = self.api.create_table(&TableCreate::temporary(number)).await?;
        tracing::info!(number = table.number, id = %table.id, "Temporary table created");
        Ok(table)
    }

    /// Replace the table with the same id (occupancy change from the detail)
    pub fn apply_update(&mut self, table: Table) {
        match self.tables.iter_mut().find(|t| t.id == table.id) {
            Some(existing) => *existing = table,
            None => tracing::debug!(id = %table.id, "Update for a table not in the listing"),
        }
    }

    /// A temporary table was paid: drop it and reload
    pub async fn remove_paid(&mut self, table_id: &str) {
        self.tables.retain(|t| t.id != table_id);
        if self.refresh().await.is_err() {
            tracing::warn!(table = table_id, "Listing not reloaded after payment");
        }
    }
}
