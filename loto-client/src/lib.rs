//! Loto Client - HTTP client for the Flor de Loto restaurant backend
//!
//! Provides authenticated REST calls, the [`PosApi`] seam used by the
//! front-end flows, and file-backed session persistence.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;

pub use api::{InvoiceQuery, PosApi};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use session::{Session, SessionError, SessionStore};

// Re-export shared types for convenience
pub use shared::client::{LoginResponse, UserInfo};
