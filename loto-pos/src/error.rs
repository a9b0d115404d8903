//! Flow errors
//!
//! Every flow returns [`PosResult`]. Backend failures are wrapped unchanged so
//! callers can still tell an expired session from a validation problem.

use loto_client::{ClientError, SessionError};
use thiserror::Error;

use crate::reports::ReportError;

#[derive(Debug, Error)]
pub enum PosError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Administrator role required")]
    AdminRequired,

    #[error("Table {0} not found")]
    TableNotFound(String),

    #[error("Line {0} not found on this table")]
    LineNotFound(String),

    #[error("Table has no consumption to pay")]
    NothingToPay,

    #[error("Checkout already in progress")]
    CheckoutInProgress,

    #[error("Temporary table creation already in progress")]
    CreationInProgress,

    #[error("Invoice issued but payment could not be recorded: {0}")]
    PaymentPending(ClientError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PosError {
    /// The session is gone or rejected; the user must log in again
    pub fn requires_login(&self) -> bool {
        match self {
            PosError::NotLoggedIn => true,
            PosError::Client(e) | PosError::PaymentPending(e) => e.is_auth(),
            _ => false,
        }
    }
}

pub type PosResult<T> = Result<T, PosError>;
