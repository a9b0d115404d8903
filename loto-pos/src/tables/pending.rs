// loto-pos/src/tables/pending.rs
// 待付款发票 - JSON 文件

//! Invoices issued for a table whose payment was never recorded.
//!
//! Kept on disk so a checkout retried from a later run marks the payment
//! without asking the backend for a second invoice.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::models::Invoice;
use thiserror::Error;

pub const PENDING_FILE: &str = "pending_invoices.json";

#[derive(Debug, Error)]
pub enum PendingStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInvoice {
    /// `None` when the backend did not echo the invoice
    #[serde(default)]
    pub invoice: Option<Invoice>,
    /// Unix millis
    pub issued_at: i64,
}

/// `{data_dir}/pending_invoices.json`, keyed by table id
#[derive(Debug, Clone)]
pub struct PendingInvoiceStore {
    path: PathBuf,
}

impl PendingInvoiceStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(PENDING_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, PendingInvoice>, PendingStoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Unreadable pending invoice file, ignoring");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, PendingInvoice>) -> Result<(), PendingStoreError> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }

    pub fn load(&self, table_id: &str) -> Result<Option<PendingInvoice>, PendingStoreError> {
        Ok(self.read_all()?.remove(table_id))
    }

    pub fn save(&self, table_id: &str, pending: &PendingInvoice) -> Result<(), PendingStoreError> {
        let mut entries = self.read_all()?;
        entries.insert(table_id.to_string(), pending.clone());
        self.write_all(&entries)?;
        tracing::debug!(table = table_id, path = %self.path.display(), "Pending invoice stored");
        Ok(())
    }

    pub fn remove(&self, table_id: &str) -> Result<(), PendingStoreError> {
        let mut entries = self.read_all()?;
        if entries.remove(table_id).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}
