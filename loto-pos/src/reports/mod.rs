//! Sales reporting: date ranges, client-side aggregation and PDF export

pub mod pdf;
pub mod range;
pub mod summary;
pub mod ticket;

use thiserror::Error;

pub use range::{DateRange, ReportMode, compute_range, today_in};
pub use summary::{ReportRow, ReportSummary, SalesReport, WeekSelection};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
