//! Backend API seam
//!
//! Every authenticated backend call the front end makes. [`crate::HttpClient`]
//! is the network implementation; flows depend on the trait so they can run
//! against an in-memory backend in tests.

use async_trait::async_trait;
use shared::models::{
    ConsumptionCreate, ConsumptionUpdate, Invoice, InvoiceLine, Product, Table, TableConsumption,
    TableCreate, User, UserCreate, UserUpdate,
};

use crate::ClientResult;

/// Inclusive timestamp range sent to `GET /facturas` (ISO-8601 strings)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceQuery {
    pub start: String,
    pub end: String,
}

#[async_trait]
pub trait PosApi: Send + Sync {
    // ========== Tables ==========

    /// All tables, unfiltered
    async fn list_tables(&self) -> ClientResult<Vec<Table>>;

    async fn create_table(&self, table: &TableCreate) -> ClientResult<Table>;

    /// Lines and total of one table
    async fn table_consumption(&self, table_id: &str) -> ClientResult<TableConsumption>;

    async fn add_consumption(&self, line: &ConsumptionCreate) -> ClientResult<()>;

    async fn update_consumption(&self, line_id: &str, update: &ConsumptionUpdate)
    -> ClientResult<()>;

    async fn delete_consumption(&self, line_id: &str) -> ClientResult<()>;

    /// Mark the table paid (after the invoice was generated)
    async fn pay_table(&self, table_id: &str) -> ClientResult<()>;

    // ========== Invoices ==========

    /// Generate the invoice of a table; the invoice is returned when the
    /// backend echoes it
    async fn generate_invoice(&self, table_id: &str) -> ClientResult<Option<Invoice>>;

    /// Invoices in a range (all invoices when `query` is `None`).
    ///
    /// A rejected or malformed listing yields an empty list, not an error.
    async fn list_invoices(&self, query: Option<&InvoiceQuery>) -> ClientResult<Vec<Invoice>>;

    async fn invoice_lines(&self, invoice_id: &str) -> ClientResult<Vec<InvoiceLine>>;

    // ========== Products ==========

    async fn list_products(&self) -> ClientResult<Vec<Product>>;

    // ========== Users ==========

    async fn list_users(&self) -> ClientResult<Vec<User>>;

    async fn create_user(&self, user: &UserCreate) -> ClientResult<()>;

    async fn update_user(&self, user_id: &str, update: &UserUpdate) -> ClientResult<()>;

    /// Logical delete (the backend marks the user inactive)
    async fn delete_user(&self, user_id: &str) -> ClientResult<()>;
}
