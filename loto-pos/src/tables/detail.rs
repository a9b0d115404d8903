//! Table detail: consumption lines of one table kept in sync with the backend
//!
//! Every mutation is one request followed by a full re-fetch of the lines.
//! Local state is only ever replaced by what the backend returns, and the
//! table's occupancy is derived from that re-fetch:
//!
//! | lines after re-fetch | permanent table | temporary table |
//! |----------------------|-----------------|-----------------|
//! | some                 | `ocupada`       | `ocupada`       |
//! | none                 | `libre`         | unchanged       |
//!
//! Occupancy changes are handed back through [`TableDetail::take_update`].

use std::sync::Arc;
use std::time::Instant;

use loto_client::PosApi;
use shared::models::{
    ConsumptionCreate, ConsumptionLine, ConsumptionUpdate, Product, Table, TableState,
};

use super::checkout::{Checkout, CheckoutKind, CheckoutOutcome, CheckoutState};
use super::comments::{CommentBoard, CommentStatus};
use crate::error::{PosError, PosResult};

pub struct TableDetail {
    api: Arc<dyn PosApi>,
    table: Table,
    lines: Vec<ConsumptionLine>,
    total: f64,
    comments: CommentBoard,
    checkout: Checkout,
    last_error: Option<String>,
    pending_update: Option<Table>,
    closed: bool,
}

impl TableDetail {
    pub fn new(api: Arc<dyn PosApi>, table: Table, checkout: Checkout) -> Self {
        Self {
            api,
            table,
            lines: Vec::new(),
            total: 0.0,
            comments: CommentBoard::new(),
            checkout,
            last_error: None,
            pending_update: None,
            closed: false,
        }
    }

    /// Select a table and load its lines
    pub async fn open(api: Arc<dyn PosApi>, table: Table, checkout: Checkout) -> Self {
        let mut detail = Self::new(api, table, checkout);
        detail.load_lines().await;
        detail
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn lines(&self) -> &[ConsumptionLine] {
        &self.lines
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn checkout_state(&self) -> &CheckoutState {
        self.checkout.state()
    }

    pub fn line(&self, line_id: &str) -> Option<&ConsumptionLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    fn require_line(&self, line_id: &str) -> PosResult<ConsumptionLine> {
        self.line(line_id)
            .cloned()
            .ok_or_else(|| PosError::LineNotFound(line_id.to_string()))
    }

    /// Replace lines and total with the backend's view.
    ///
    /// On failure the previous state stays and the error is recorded.
    pub async fn load_lines(&mut self) -> bool {
        match self.api.table_consumption(&self.table.id).await {
            Ok(consumption) => {
                self.total = consumption.effective_total();
                self.lines = consumption.lines;
                self.comments
                    .retain_lines(self.lines.iter().map(|l| l.id.as_str()), Instant::now());
                self.last_error = None;
                tracing::debug!(
                    table = self.table.number,
                    lines = self.lines.len(),
                    total = self.total,
                    "Consumption loaded"
                );
                true
            }
            Err(e) => {
                tracing::error!(table = self.table.number, error = %e, "Failed to load consumption");
                self.last_error = Some(format!("Could not load the table's consumption: {e}"));
                false
            }
        }
    }

    /// Re-fetch after a mutation and derive occupancy from the result
    async fn resync(&mut self) {
        if !self.load_lines().await {
            return;
        }
        let derived = if !self.lines.is_empty() {
            TableState::Occupied
        } else if !self.table.temporary {
            TableState::Free
        } else {
            // temporary tables wait for payment
            return;
        };
        if derived != self.table.state {
            tracing::info!(table = self.table.number, from = %self.table.state, to = %derived, "Table occupancy changed");
            self.table.state = derived;
            self.pending_update = Some(self.table.clone());
        }
    }

    fn record_failure(&mut self, action: &str, error: PosError) -> PosError {
        tracing::error!(table = self.table.number, action, error = %error, "Table mutation failed");
        self.last_error = Some(format!("Could not {action}: {error}"));
        error
    }

    /// Add one unit of `product`
    pub async fn add_item(&mut self, product: &Product) -> PosResult<()> {
        let line = ConsumptionCreate {
            table_id: self.table.id.clone(),
            product_id: product.id.clone(),
            quantity: 1,
        };
        if let Err(e) = self.api.add_consumption(&line).await {
            return Err(self.record_failure("add the product", e.into()));
        }
        tracing::info!(table = self.table.number, product = %product.name, "Product added");
        self.resync().await;
        Ok(())
    }

    async fn set_quantity(&mut self, line: &ConsumptionLine, quantity: u32) -> PosResult<()> {
        let result = if quantity == 0 {
            self.api.delete_consumption(&line.id).await
        } else {
            let update = ConsumptionUpdate {
                quantity,
                comment: line.comment.clone(),
            };
            self.api.update_consumption(&line.id, &update).await
        };
        if let Err(e) = result {
            return Err(self.record_failure("change the quantity", e.into()));
        }
        self.resync().await;
        Ok(())
    }

    pub async fn increment(&mut self, line_id: &str) -> PosResult<()> {
        let line = self.require_line(line_id)?;
        self.set_quantity(&line, line.quantity + 1).await
    }

    /// Reaching zero deletes the line
    pub async fn decrement(&mut self, line_id: &str) -> PosResult<()> {
        let line = self.require_line(line_id)?;
        self.set_quantity(&line, line.quantity.saturating_sub(1)).await
    }

    pub async fn remove_item(&mut self, line_id: &str) -> PosResult<()> {
        let line = self.require_line(line_id)?;
        if let Err(e) = self.api.delete_consumption(&line.id).await {
            return Err(self.record_failure("remove the product", e.into()));
        }
        tracing::info!(table = self.table.number, product = %line.product.name, "Line removed");
        self.resync().await;
        Ok(())
    }

    // ========== Comments ==========

    /// Local edit, nothing is sent
    pub fn edit_comment(&mut self, line_id: &str, text: impl Into<String>) {
        self.comments.edit(line_id, text);
    }

    pub fn comment_draft(&self, line_id: &str) -> &str {
        let committed = self.line(line_id).map(|l| l.comment_text()).unwrap_or("");
        self.comments.draft(line_id, committed)
    }

    pub fn comment_status(&self, line_id: &str) -> Option<CommentStatus> {
        self.comments.status(line_id)
    }

    pub fn comment_status_at(&self, line_id: &str, now: Instant) -> Option<CommentStatus> {
        self.comments.status_at(line_id, now)
    }

    /// Send the draft of `line_id`.
    ///
    /// The committed comment changes only once the backend acknowledges; a
    /// failed save keeps the draft. The lines are not re-fetched.
    pub async fn save_comment(&mut self, line_id: &str) -> PosResult<()> {
        let line = self.require_line(line_id)?;
        let text = self.comment_draft(line_id).to_string();
        self.comments.begin_save(line_id);

        let update = ConsumptionUpdate {
            quantity: line.quantity,
            comment: Some(text.clone()),
        };
        match self.api.update_consumption(line_id, &update).await {
            Ok(()) => {
                if let Some(l) = self.lines.iter_mut().find(|l| l.id == line_id) {
                    l.comment = Some(text);
                }
                self.comments.save_succeeded(line_id, Instant::now());
                tracing::debug!(table = self.table.number, line = line_id, "Comment saved");
                Ok(())
            }
            Err(e) => {
                self.comments.save_failed(line_id, Instant::now());
                Err(self.record_failure("save the comment", e.into()))
            }
        }
    }

    /// Edit and save in one step
    pub async fn update_comment(&mut self, line_id: &str, text: impl Into<String>) -> PosResult<()> {
        self.edit_comment(line_id, text);
        self.save_comment(line_id).await
    }

    pub async fn clear_comment(&mut self, line_id: &str) -> PosResult<()> {
        self.update_comment(line_id, "").await
    }

    // ========== Directory hand-off ==========

    /// Occupancy change not yet reported to the directory
    pub fn take_update(&mut self) -> Option<Table> {
        self.pending_update.take()
    }

    // ========== Checkout ==========

    pub fn can_checkout(&self) -> bool {
        !self.closed && !self.lines.is_empty() && !self.checkout.is_processing()
    }

    /// Generate the invoice and mark the table paid
    pub async fn pay(&mut self) -> PosResult<CheckoutOutcome> {
        if self.checkout.is_processing() {
            return Err(PosError::CheckoutInProgress);
        }
        if self.lines.is_empty() {
            return Err(PosError::NothingToPay);
        }

        let outcome = match self.checkout.run(self.api.as_ref(), &self.table).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        self.lines.clear();
        self.total = 0.0;
        self.closed = true;
        if outcome.kind == CheckoutKind::Freed {
            self.table.state = TableState::Free;
            self.pending_update = Some(self.table.clone());
        }
        Ok(outcome)
    }
}
