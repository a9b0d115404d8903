//! Floor flows: table directory, per-table detail and checkout

pub mod catalog;
pub mod checkout;
pub mod comments;
pub mod detail;
pub mod directory;
pub mod pending;

pub use catalog::{ALL_CATEGORIES, ProductCatalog};
pub use checkout::{Checkout, CheckoutKind, CheckoutOutcome, CheckoutState};
pub use comments::{CommentBoard, CommentStatus};
pub use detail::TableDetail;
pub use directory::TableDirectory;
pub use pending::{PendingInvoice, PendingInvoiceStore};
