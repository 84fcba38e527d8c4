//! # Hourly Sales Histogram
//!
//! Revenue per local hour of the day, recomputed from raw orders so that
//! excluded categories and refunds never show up in it.
//!
//! ## Bucketing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order.date_order (UTC) ──with_timezone(tz)──► local hour 0..23         │
//! │                                                                         │
//! │  for each line:                                                         │
//! │     qty < 0                         → skip (refund)                     │
//! │     any category in ExclusionSet    → skip (payout)                     │
//! │     else                            → total += subtotal, items += qty   │
//! │                                                                         │
//! │  total == 0 && items == 0           → order dropped                     │
//! │  else                               → bucket[hour] += (total, 1, items) │
//! │                                                                         │
//! │  Output sorted by hour: "12 AM", "1 AM", ... "12 PM", ... "11 PM"       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::Timelike;
use chrono_tz::Tz;

use crate::error::{CoreError, CoreResult};
use crate::exclusion::ExclusionSet;
use crate::money::Money;
use crate::report::HourlySales;
use crate::types::Order;
use crate::FALLBACK_TIMEZONE;

// =============================================================================
// Time Zone Resolution
// =============================================================================

/// Picks the report time zone: the caller's, then the configured default,
/// then [`FALLBACK_TIMEZONE`]. Blank names are skipped.
///
/// An unknown name is an error rather than a silent fallback: it would shift
/// every bucket of the histogram.
///
/// ## Example
/// ```rust
/// use zreport_core::hourly::resolve_timezone;
///
/// let tz = resolve_timezone(None, Some("America/New_York")).unwrap();
/// assert_eq!(tz, chrono_tz::America::New_York);
///
/// assert!(resolve_timezone(Some("Mars/Olympus"), None).is_err());
/// ```
pub fn resolve_timezone(requested: Option<&str>, default: Option<&str>) -> CoreResult<Tz> {
    let name = [requested, default]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(FALLBACK_TIMEZONE);

    name.parse::<Tz>()
        .map_err(|_| CoreError::InvalidTimezone(name.to_string()))
}

// =============================================================================
// Labels
// =============================================================================

/// 12-hour clock label for an hour of the day (0..=23).
pub fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{} AM", hour),
        12 => "12 PM".to_string(),
        _ => format!("{} PM", hour - 12),
    }
}

// =============================================================================
// Histogram
// =============================================================================

#[derive(Debug, Default)]
struct Bucket {
    total: Money,
    orders: u32,
    items: f64,
}

/// Builds the hourly histogram from already-filtered orders.
pub fn hourly_sales(orders: &[Order], exclusions: &ExclusionSet, tz: Tz) -> Vec<HourlySales> {
    let mut buckets: BTreeMap<u32, Bucket> = BTreeMap::new();

    for order in orders {
        let mut order_total = Money::zero();
        let mut order_items = 0.0;

        for line in order
            .lines
            .iter()
            .filter(|line| !line.is_refund() && !exclusions.excludes_any(line.category_ids.as_slice()))
        {
            order_total += line.price_subtotal;
            order_items += line.qty;
        }

        if order_total.is_zero() && order_items == 0.0 {
            continue;
        }

        let hour = order.date_order.with_timezone(&tz).hour();
        let bucket = buckets.entry(hour).or_default();
        bucket.total += order_total;
        bucket.orders += 1;
        bucket.items += order_items;
    }

    buckets
        .into_iter()
        .map(|(hour, bucket)| HourlySales {
            hour: hour_label(hour),
            total: bucket.total.to_major(),
            orders: bucket.orders,
            items: bucket.items.trunc() as i64,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
