//! Flor de Loto POS - 前端流程
//!
//! All business state lives in the backend; this crate holds the view state
//! the staff works with and keeps it in step with the backend after every
//! mutation.
//!
//! # 模块结构
//!
//! ```text
//! loto-pos/src/
//! ├── tables/     # 桌台目录、桌台明细、结账、商品目录
//! ├── reports/    # 日期范围、汇总、PDF 导出
//! ├── invoices.rs # 当日发票
//! ├── users.rs    # 用户管理
//! ├── clock.rs    # 页头时钟
//! ├── config.rs   # 环境变量配置
//! └── logger.rs   # 日志
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod invoices;
pub mod logger;
pub mod reports;
pub mod tables;
pub mod users;

#[cfg(test)]
mod testing;

pub use clock::ClockTicker;
pub use config::Config;
pub use error::{PosError, PosResult};
pub use invoices::InvoiceLedger;
pub use logger::init_logger;
pub use reports::{ReportError, ReportMode, SalesReport, WeekSelection};
pub use tables::{Checkout, ProductCatalog, TableDetail, TableDirectory};
pub use users::{UserAdmin, UserForm};
