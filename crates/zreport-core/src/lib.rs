//! # zreport-core: Pure Report Logic for the Z-Report Category Filter
//!
//! The end-of-day sale details report mixes merchandise revenue with
//! pass-through cash movements (lottery payouts, bottle deposits). This crate
//! takes the already-computed report and moves flagged categories into a
//! separate "Payouts & Adjustments" bucket, re-deriving every total that
//! depended on them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Report Data Flow                                 │
//! │                                                                         │
//! │  External report engine ──► raw SaleDetailsReport (JSON)                │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ zreport-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  report   │  │ exclusion │  │ reconcile │  │  hourly   │  │   │
//! │  │   │ documents │  │    set    │  │  totals   │  │ histogram │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 zreport-db (Database Layer)                     │   │
//! │  │       category flags, order snapshot, SaleDetailsService        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Category and order snapshot types
//! - [`money`] - Integer-cents money for order line subtotals
//! - [`report`] - The sale details report document
//! - [`exclusion`] - Which categories count as non-revenue
//! - [`reconcile`] - Partition + total re-derivation
//! - [`hourly`] - Hourly sales histogram
//! - [`filter`] - Report date range / config / session filter
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use zreport_core::exclusion::ExclusionSet;
//! use zreport_core::reconcile::Reconciler;
//! use zreport_core::report::SaleDetailsReport;
//!
//! let raw: SaleDetailsReport = serde_json::from_str(r#"{
//!     "products": [
//!         {"name": "Drinks", "products": [{"product_name": "Cola", "quantity": 2, "base_amount": 10.0}]},
//!         {"name": "Lotto", "products": [{"product_name": "Scratch", "quantity": 1, "base_amount": 5.0}]}
//!     ]
//! }"#).unwrap();
//!
//! let excluded = ExclusionSet::from_names(["Lotto"]);
//! let report = Reconciler::default().reconcile(raw, &excluded);
//!
//! assert_eq!(report.products.len(), 1);
//! assert_eq!(report.excluded_total, 5.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod exclusion;
pub mod filter;
pub mod hourly;
pub mod money;
pub mod reconcile;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use exclusion::ExclusionSet;
pub use money::Money;
pub use reconcile::Reconciler;
pub use report::SaleDetailsReport;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Time zone used when neither the caller nor the configuration names one.
pub const FALLBACK_TIMEZONE: &str = "UTC";

/// Label the upstream report engine gives the untaxed bucket.
pub const NO_TAX_LABEL: &str = "No Taxes";

/// Tolerance used when comparing reconciled floating-point totals.
pub const AMOUNT_EPSILON: f64 = 1e-6;
