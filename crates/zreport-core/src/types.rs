//! # Domain Types
//!
//! Category and order snapshot types.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────────┐   ┌─────────────────┐                    │
//! │  │        Category          │   │      Order      │                    │
//! │  │  ──────────────────────  │   │  ─────────────  │                    │
//! │  │  id (UUID)               │   │  id (UUID)      │                    │
//! │  │  name (display)          │   │  date_order     │                    │
//! │  │  exclude_from_report_    │   │  state          │                    │
//! │  │    turnover              │   │  lines ─────────┼──► OrderLine       │
//! │  └──────────────────────────┘   └─────────────────┘     category_ids   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A category has an immutable `id` and a mutable display `name`. Exclusion
//! matching uses the id; the name is only a fallback for report groups that
//! arrive without an id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A POS product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, also the key the report engine groups products by.
    pub name: String,

    /// Items in this category are moved to "Payouts & Adjustments" in the
    /// sale details report instead of counting as net sales.
    #[serde(default)]
    pub exclude_from_report_turnover: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order State
// =============================================================================

/// Lifecycle state of a POS order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Draft,
    Paid,
    Done,
    Invoiced,
    Cancel,
}

impl OrderState {
    /// States whose orders count in the sale details report.
    pub const REPORTED: [OrderState; 3] = [OrderState::Paid, OrderState::Done, OrderState::Invoiced];
}

// =============================================================================
// Order
// =============================================================================

/// A POS order as read back for the hourly histogram.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// POS configuration (register) the order was taken on.
    pub config_id: String,
    /// Cashier session the order belongs to.
    pub session_id: String,
    pub state: OrderState,
    /// Order timestamp, stored in UTC.
    #[ts(as = "String")]
    pub date_order: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item of an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub product_id: String,
    pub product_name: String,
    /// Negative for refund lines.
    pub qty: f64,
    /// Line amount before tax.
    pub price_subtotal: Money,
    /// Every POS category the product belongs to.
    pub category_ids: Vec<String>,
}

impl OrderLine {
    /// Refund lines carry a negative quantity.
    #[inline]
    pub fn is_refund(&self) -> bool {
        self.qty < 0.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_states_serialize_lowercase() {
        let names: Vec<String> = OrderState::REPORTED
            .iter()
            .map(|state| serde_json::to_string(state).unwrap())
            .collect();
        assert_eq!(names, vec!["\"paid\"", "\"done\"", "\"invoiced\""]);
        assert!(!OrderState::REPORTED.contains(&OrderState::Draft));
        assert!(!OrderState::REPORTED.contains(&OrderState::Cancel));
    }

    #[test]
    fn test_refund_line() {
        let line = OrderLine {
            product_id: "p1".to_string(),
            product_name: "Cola".to_string(),
            qty: -1.0,
            price_subtotal: Money::from_cents(-250),
            category_ids: vec![],
        };
        assert!(line.is_refund());
    }

    #[test]
    fn test_category_flag_defaults_to_false() {
        let json = r#"{
            "id": "c1",
            "name": "Drinks",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert!(!category.exclude_from_report_turnover);
    }
}
