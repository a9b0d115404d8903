//! Sales report: invoices of a range aggregated client-side

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use loto_client::PosApi;
use shared::models::Invoice;
use shared::money;

use super::range::{DateRange, ReportMode, compute_range};

/// Total, count and average ticket of a set of invoices
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReportSummary {
    pub total: f64,
    pub count: usize,
    pub average: f64,
}

impl ReportSummary {
    pub fn from_invoices(invoices: &[Invoice]) -> Self {
        let total = money::sum(invoices.iter().map(|inv| inv.total));
        let count = invoices.len();
        Self {
            total,
            count,
            average: money::average(total, count),
        }
    }
}

/// One row of the invoice table, already formatted for display
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub number: String,
    pub date: String,
    pub time: String,
    pub table: String,
    pub total: String,
}

impl ReportRow {
    pub fn from_invoice(invoice: &Invoice, tz: Tz) -> Self {
        let local = invoice.created_at.with_timezone(&tz);
        Self {
            number: format!("#{}", invoice.number),
            date: local.format("%d/%m/%Y").to_string(),
            time: local.format("%H:%M").to_string(),
            table: invoice
                .table_number()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            total: format!("${}", money::format_amount(invoice.total)),
        }
    }
}

/// Weekly date selection; ignored by the other modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekSelection {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct SalesReport {
    pub mode: ReportMode,
    pub week: WeekSelection,
    pub today: NaiveDate,
    pub timezone: Tz,
    /// `None` when there was nothing to fetch
    pub range: Option<DateRange>,
    pub invoices: Vec<Invoice>,
    pub summary: ReportSummary,
    pub error: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl SalesReport {
    /// Fetch and aggregate.
    ///
    /// A read failure yields an empty report carrying the error; retrying is
    /// up to the caller.
    pub async fn load(
        api: &dyn PosApi,
        mode: ReportMode,
        week: WeekSelection,
        today: NaiveDate,
        timezone: Tz,
    ) -> Self {
        let mut report = Self {
            mode,
            week,
            today,
            timezone,
            range: compute_range(mode, today, timezone, week.start, week.end),
            invoices: Vec::new(),
            summary: ReportSummary::default(),
            error: None,
            generated_at: Utc::now(),
        };

        let Some(range) = report.range else {
            tracing::debug!(%mode, "No range selected, report left empty");
            return report;
        };

        let query = range.to_query();
        match api.list_invoices(Some(&query)).await {
            Ok(invoices) => {
                report.summary = ReportSummary::from_invoices(&invoices);
                report.invoices = invoices;
                tracing::info!(
                    %mode,
                    start = %query.start,
                    end = %query.end,
                    count = report.summary.count,
                    total = report.summary.total,
                    "Sales report loaded"
                );
            }
            Err(e) => {
                tracing::error!(%mode, error = %e, "Failed to load invoices for report");
                report.error = Some(format!("Could not load invoices: {e}"));
            }
        }
        report
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        self.invoices
            .iter()
            .map(|inv| ReportRow::from_invoice(inv, self.timezone))
            .collect()
    }

    /// Period lines under the title: `Desde/Hasta` for a weekly report, the
    /// current date otherwise
    pub fn period_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Período: {}", self.mode.label())];
        match (self.mode, self.week.start, self.week.end) {
            (ReportMode::Weekly, Some(start), Some(end)) => {
                lines.push(format!("Desde: {}", start.format("%d/%m/%Y")));
                lines.push(format!("Hasta: {}", end.format("%d/%m/%Y")));
            }
            _ => lines.push(format!("Fecha: {}", self.today.format("%d/%m/%Y"))),
        }
        lines
    }

    /// `reporte_<mode>_<YYYY-MM-DD>.pdf`
    pub fn file_name(&self) -> String {
        format!(
            "reporte_{}_{}.pdf",
            self.mode.as_str(),
            self.generated_at.format("%Y-%m-%d")
        )
    }
}
