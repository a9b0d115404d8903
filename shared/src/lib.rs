//! Shared types for the Flor de Loto POS
//!
//! Wire models, response envelopes and money helpers used by both the
//! HTTP client and the front-end flows.

pub mod client;
pub mod models;
pub mod money;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use response::ApiResponse;
