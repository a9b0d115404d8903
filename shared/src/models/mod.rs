//! Data models
//!
//! Wire types of the restaurant backend. Field names on the wire are
//! Spanish (`mesa`, `consumo`, `factura`...), Rust names are English.
//! Ids are kept as `String` whatever the backend sends.

pub mod consumption;
pub mod invoice;
pub mod product;
pub mod table;
pub mod user;

// Re-exports
pub use consumption::*;
pub use invoice::*;
pub use product::*;
pub use table::*;
pub use user::*;
