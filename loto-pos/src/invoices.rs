//! Daily invoice ledger: today's invoices with count and income

use chrono::NaiveDate;
use chrono_tz::Tz;
use loto_client::PosApi;
use shared::models::Invoice;
use shared::money;

use crate::reports::{ReportMode, compute_range};

#[derive(Debug, Clone, Default)]
pub struct InvoiceLedger {
    pub date: Option<NaiveDate>,
    pub invoices: Vec<Invoice>,
    pub error: Option<String>,
}

impl InvoiceLedger {
    /// Invoices issued on `date` (business timezone)
    pub async fn load(api: &dyn PosApi, date: NaiveDate, tz: Tz) -> Self {
        let mut ledger = Self {
            date: Some(date),
            ..Self::default()
        };
        let Some(range) = compute_range(ReportMode::Daily, date, tz, None, None) else {
            return ledger;
        };

        match api.list_invoices(Some(&range.to_query())).await {
            Ok(invoices) => {
                tracing::debug!(%date, count = invoices.len(), "Daily invoices loaded");
                ledger.invoices = invoices;
            }
            Err(e) => {
                tracing::error!(%date, error = %e, "Failed to load daily invoices");
                ledger.error = Some(format!("Could not load invoices: {e}"));
            }
        }
        ledger
    }

    pub fn count(&self) -> usize {
        self.invoices.len()
    }

    pub fn income(&self) -> f64 {
        money::sum(self.invoices.iter().map(|inv| inv.total))
    }

    pub fn find_by_number(&self, number: u64) -> Option<&Invoice> {
        self.invoices.iter().find(|inv| inv.number == number)
    }
}
