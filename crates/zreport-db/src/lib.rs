//! # zreport-db: Database Layer for the Z-Report Category Filter
//!
//! Stores which POS categories are excluded from report turnover, keeps the
//! order snapshot the hourly histogram is built from, and runs the
//! reconciler from zreport-core against both.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Report Data Flow                                 │
//! │                                                                         │
//! │  Report engine output (JSON) + ReportFilter + time zone                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     zreport-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CategoryRepo  │    │ 001_pos_cat  │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepo     │    │ 002_orders   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           ▲                                                     │   │
//! │  │   ┌───────┴───────────┐    ┌──────────────┐                    │   │
//! │  │   │ SaleDetailsService│◄───│ ReportConfig │ (report.toml, env) │   │
//! │  │   └───────────────────┘    └──────────────┘                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Adjusted SaleDetailsReport (revenue, payouts, hourly sales)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Category flag store and order snapshot
//! - [`service`] - Report post-processing
//! - [`config`] - `report.toml` loading
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zreport_core::filter::ReportFilter;
//! use zreport_db::{Database, ReportConfig};
//!
//! let config = ReportConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//!
//! db.categories().set_excluded(&lotto_id, true).await?;
//!
//! let report = db
//!     .sale_details(&config.report)
//!     .reconcile_json(&engine_output, &ReportFilter::for_sessions([session_id]), Some("America/New_York"))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{PaymentAdjustmentMode, ReportConfig, ReportSettings};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::SaleDetailsService;

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::order::OrderRepository;
