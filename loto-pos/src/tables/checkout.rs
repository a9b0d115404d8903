//! Checkout: invoice generation followed by payment marking
//!
//! `Idle → Processing → Success | Failed`. `Failed` keeps the message and
//! accepts a new attempt like `Idle`; the table is left untouched. When the
//! invoice was issued but the payment could not be recorded, the issued
//! invoice is kept so the next attempt only retries the payment. With a
//! [`PendingInvoiceStore`] attached that memory survives the process.

use std::time::Duration;

use loto_client::PosApi;
use shared::models::{Invoice, Table};

use super::pending::{PendingInvoice, PendingInvoiceStore};
use crate::error::{PosError, PosResult};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    Idle,
    Processing,
    Success,
    Failed(String),
}

/// Invoice generated for a table whose payment is not recorded yet
#[derive(Debug, Clone)]
struct IssuedInvoice {
    table_id: String,
    invoice: Option<Invoice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutKind {
    /// Temporary table: the directory drops it
    PaidTemporary,
    /// Permanent table: back to `libre`
    Freed,
}

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub table_id: String,
    pub kind: CheckoutKind,
    /// The backend does not always echo the invoice
    pub invoice: Option<Invoice>,
}

#[derive(Debug)]
pub struct Checkout {
    state: CheckoutState,
    issued: Option<IssuedInvoice>,
    store: Option<PendingInvoiceStore>,
    /// Extra payment attempts after the first failure
    pay_retries: u32,
    retry_delay: Duration,
}

impl Checkout {
    pub fn new(pay_retries: u32) -> Self {
        Self {
            state: CheckoutState::Idle,
            issued: None,
            store: None,
            pay_retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_store(mut self, store: PendingInvoiceStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn is_processing(&self) -> bool {
        self.state == CheckoutState::Processing
    }

    /// An invoice exists for this table but payment is still unrecorded
    pub fn has_pending_invoice(&self, table_id: &str) -> bool {
        self.issued
            .as_ref()
            .is_some_and(|issued| issued.table_id == table_id)
    }

    /// Enter `Processing`; rejected while another checkout runs
    pub fn begin(&mut self) -> PosResult<()> {
        if self.is_processing() {
            return Err(PosError::CheckoutInProgress);
        }
        self.state = CheckoutState::Processing;
        Ok(())
    }

    fn fail(&mut self, error: PosError) -> PosError {
        tracing::warn!(error = %error, "Checkout failed");
        self.state = CheckoutState::Failed(error.to_string());
        error
    }

    /// Pick up an invoice a previous run issued but could not settle
    fn restore_pending(&mut self, table_id: &str) {
        if self.has_pending_invoice(table_id) {
            return;
        }
        let Some(store) = &self.store else {
            return;
        };
        match store.load(table_id) {
            Ok(Some(pending)) => {
                self.issued = Some(IssuedInvoice {
                    table_id: table_id.to_string(),
                    invoice: pending.invoice,
                });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(table = table_id, error = %e, "Cannot read pending invoices"),
        }
    }

    fn persist_pending(&self, table_id: &str, invoice: Option<&Invoice>) {
        let Some(store) = &self.store else {
            return;
        };
        let pending = PendingInvoice {
            invoice: invoice.cloned(),
            issued_at: shared::util::now_millis(),
        };
        if let Err(e) = store.save(table_id, &pending) {
            tracing::error!(table = table_id, error = %e, "Issued invoice not recorded locally");
        }
    }

    fn clear_pending(&self, table_id: &str) {
        if let Some(store) = &self.store
            && let Err(e) = store.remove(table_id)
        {
            tracing::warn!(table = table_id, error = %e, "Cannot clear pending invoice");
        }
    }

    /// Run the whole checkout for `table`
    pub async fn run(&mut self, api: &dyn PosApi, table: &Table) -> PosResult<CheckoutOutcome> {
        self.begin()?;
        tracing::info!(table = table.number, temporary = table.temporary, "Checkout started");

        self.restore_pending(&table.id);
        if !self.has_pending_invoice(&table.id) {
            match api.generate_invoice(&table.id).await {
                Ok(invoice) => {
                    if let Some(inv) = &invoice {
                        tracing::info!(table = table.number, invoice = inv.number, "Invoice generated");
                    }
                    self.persist_pending(&table.id, invoice.as_ref());
                    self.issued = Some(IssuedInvoice {
                        table_id: table.id.clone(),
                        invoice,
                    });
                }
                Err(e) => return Err(self.fail(e.into())),
            }
        } else {
            tracing::info!(table = table.number, "Reusing issued invoice, retrying payment only");
        }

        if let Err(e) = self.mark_paid(api, table).await {
            return Err(self.fail(PosError::PaymentPending(e)));
        }

        let invoice = self.issued.take().and_then(|issued| issued.invoice);
        self.clear_pending(&table.id);
        self.state = CheckoutState::Success;
        let kind = if table.temporary {
            CheckoutKind::PaidTemporary
        } else {
            CheckoutKind::Freed
        };
        tracing::info!(table = table.number, ?kind, "Checkout completed");

        Ok(CheckoutOutcome {
            table_id: table.id.clone(),
            kind,
            invoice,
        })
    }

    async fn mark_paid(
        &self,
        api: &dyn PosApi,
        table: &Table,
    ) -> Result<(), loto_client::ClientError> {
        let mut attempt = 0;
        loop {
            match api.pay_table(&table.id).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.pay_retries && e.is_transient() => {
                    attempt += 1;
                    tracing::warn!(table = table.number, attempt, error = %e, "Payment marking failed, retrying");
                    tokio::time::sleep(self.retry_delay * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, table};

    fn checkout(retries: u32) -> Checkout {
        Checkout::new(retries).with_retry_delay(Duration::ZERO)
    }

    #[test]
    fn test_second_begin_is_rejected() {
        let mut c = checkout(0);
        c.begin().unwrap();
        assert!(matches!(c.begin(), Err(PosError::CheckoutInProgress)));
    }

    #[tokio::test]
    async fn test_permanent_table_is_freed() {
        let backend = FakeBackend::new();
        let mesa = backend.add_table(table("m1", 1, false, true));
        let mut c = checkout(0);

        let outcome = c.run(&backend, &mesa).await.unwrap();
        assert_eq!(outcome.kind, CheckoutKind::Freed);
        assert!(outcome.invoice.is_some());
        assert_eq!(c.state(), &CheckoutState::Success);
        assert_eq!(backend.invoice_count(), 1);
        assert_eq!(backend.paid_tables(), vec!["m1".to_string()]);
    }

    #[tokio::test]
    async fn test_invoice_failure_is_retryable() {
        let backend = FakeBackend::new();
        let mesa = backend.add_table(table("m1", 1, false, true));
        backend.fail_next("generate_invoice");
        let mut c = checkout(0);

        assert!(c.run(&backend, &mesa).await.is_err());
        assert!(matches!(c.state(), CheckoutState::Failed(_)));
        assert!(!c.is_processing());
        assert!(!c.has_pending_invoice("m1"));
        assert!(backend.paid_tables().is_empty());
    }

    #[tokio::test]
    async fn test_payment_retried_within_budget() {
        let backend = FakeBackend::new();
        let mesa = backend.add_table(table("m2", 2, true, true));
        backend.fail_next("pay_table");
        backend.fail_next("pay_table");
        let mut c = checkout(2);

        let outcome = c.run(&backend, &mesa).await.unwrap();
        assert_eq!(outcome.kind, CheckoutKind::PaidTemporary);
        assert_eq!(backend.invoice_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_session_is_not_retried() {
        let backend = FakeBackend::new();
        let mesa = backend.add_table(table("m1", 1, false, true));
        backend.reject_next("pay_table");
        let mut c = checkout(3);

        let err = c.run(&backend, &mesa).await.unwrap_err();
        assert!(err.requires_login());
        let pay_calls = backend.calls().iter().filter(|op| *op == "pay_table").count();
        assert_eq!(pay_calls, 1);
        assert!(c.has_pending_invoice("m1"));
    }

    #[tokio::test]
    async fn test_pending_invoice_is_not_generated_twice() {
        let backend = FakeBackend::new();
        let mesa = backend.add_table(table("m1", 1, false, true));
        backend.fail_next("pay_table");
        backend.fail_next("pay_table");
        let mut c = checkout(1);

        let err = c.run(&backend, &mesa).await.unwrap_err();
        assert!(matches!(err, PosError::PaymentPending(_)));
        assert!(c.has_pending_invoice("m1"));
        assert!(matches!(c.state(), CheckoutState::Failed(_)));

        c.run(&backend, &mesa).await.unwrap();
        assert_eq!(backend.invoice_count(), 1);
        assert!(!c.has_pending_invoice("m1"));
    }

    #[tokio::test]
    async fn test_pending_invoice_survives_a_new_checkout() {
        let dir = tempfile::TempDir::new().unwrap();
        let backend = FakeBackend::new();
        let mesa = backend.add_table(table("m1", 1, false, true));
        backend.fail_next("pay_table");

        let mut first = checkout(0).with_store(PendingInvoiceStore::new(dir.path()));
        let err = first.run(&backend, &mesa).await.unwrap_err();
        assert!(matches!(err, PosError::PaymentPending(_)));
        drop(first);

        // next run of the program: fresh checkout, same data dir
        let store = PendingInvoiceStore::new(dir.path());
        assert!(store.load("m1").unwrap().is_some());
        let mut second = checkout(0).with_store(store.clone());
        let outcome = second.run(&backend, &mesa).await.unwrap();

        assert_eq!(backend.invoice_count(), 1);
        assert_eq!(outcome.invoice.map(|inv| inv.number), Some(1));
        assert_eq!(backend.paid_tables(), vec!["m1".to_string()]);
        assert!(store.load("m1").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pending_invoice_of_other_table_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = PendingInvoiceStore::new(dir.path());
        store
            .save("m2", &PendingInvoice { invoice: None, issued_at: 0 })
            .unwrap();
        let backend = FakeBackend::new();
        let mesa = backend.add_table(table("m1", 1, false, true));

        let mut c = checkout(0).with_store(store.clone());
        c.run(&backend, &mesa).await.unwrap();
        assert_eq!(backend.invoice_count(), 1);
        assert!(store.load("m2").unwrap().is_some());
    }
}
