//! # Sale Details Service
//!
//! Post-processes the report engine's sale details output with the current
//! category flags.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_sale_details(raw, filter, tz)                                      │
//! │       │                                                                 │
//! │       ├── validate_report_filter(filter)                                │
//! │       ├── categories.exclusion_set()        (fresh read, no cache)      │
//! │       ├── reconciler.reconcile(raw, &set)   (pure)                      │
//! │       │                                                                 │
//! │       └── hourly_sales enabled?                                         │
//! │              ├── resolve_timezone(tz, default_timezone)                 │
//! │              ├── filter.resolve(now, tz)  ──► OrderQuery                │
//! │              ├── orders.find(&query)                                    │
//! │              └── hourly_sales(&orders, &set, tz)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  adjusted SaleDetailsReport                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::ReportSettings;
use crate::error::DbResult;
use crate::repository::category::CategoryRepository;
use crate::repository::order::OrderRepository;
use zreport_core::filter::ReportFilter;
use zreport_core::hourly::{hourly_sales, resolve_timezone};
use zreport_core::reconcile::Reconciler;
use zreport_core::report::SaleDetailsReport;
use zreport_core::validation::validate_report_filter;

/// Report post-processing bound to one set of [`ReportSettings`].
#[derive(Debug, Clone)]
pub struct SaleDetailsService {
    categories: CategoryRepository,
    orders: OrderRepository,
    reconciler: Reconciler,
    settings: ReportSettings,
}

impl SaleDetailsService {
    pub fn new(categories: CategoryRepository, orders: OrderRepository, settings: ReportSettings) -> Self {
        SaleDetailsService {
            categories,
            orders,
            reconciler: settings.reconciler(),
            settings,
        }
    }

    /// Applies the current exclusion flags to `raw`.
    ///
    /// `filter` must be the one the engine computed `raw` for; the hourly
    /// histogram is fetched with it. `tz` overrides the configured default
    /// time zone.
    ///
    /// ## Returns
    /// * `Ok(SaleDetailsReport)` - Adjusted report
    /// * `Err(DbError::Core)` - Unknown time zone or blank filter ids
    pub async fn get_sale_details(
        &self,
        raw: SaleDetailsReport,
        filter: &ReportFilter,
        tz: Option<&str>,
    ) -> DbResult<SaleDetailsReport> {
        self.get_sale_details_at(raw, filter, tz, Utc::now()).await
    }

    /// [`get_sale_details`](Self::get_sale_details) with an explicit "now"
    /// for the default date range.
    pub async fn get_sale_details_at(
        &self,
        raw: SaleDetailsReport,
        filter: &ReportFilter,
        tz: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<SaleDetailsReport> {
        validate_report_filter(filter)?;

        // Resolve before touching storage so a bad zone fails the whole call.
        let zone = if self.settings.hourly_sales {
            Some(resolve_timezone(tz, Some(&self.settings.default_timezone))?)
        } else {
            None
        };

        let exclusions = self.categories.exclusion_set().await?;
        debug!(excluded = ?exclusions.names(), "Reconciling sale details");

        let mut report = self.reconciler.reconcile(raw, &exclusions);

        if let Some(zone) = zone {
            let query = filter.resolve(now, zone);
            let orders = self.orders.find(&query).await?;
            report.hourly_sales = Some(hourly_sales(&orders, &exclusions, zone));
        }

        info!(
            excluded_categories = report.excluded_ops.len(),
            excluded_total = report.excluded_total,
            revenue = report.products_info.total,
            "Sale details reconciled"
        );

        Ok(report)
    }

    /// Same as [`get_sale_details`](Self::get_sale_details), taking the
    /// engine's output as JSON text.
    pub async fn reconcile_json(
        &self,
        raw_json: &str,
        filter: &ReportFilter,
        tz: Option<&str>,
    ) -> DbResult<SaleDetailsReport> {
        let raw = SaleDetailsReport::from_json(raw_json)?;
        self.get_sale_details(raw, filter, tz).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaymentAdjustmentMode;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use zreport_core::{CoreError, Money, Order, OrderLine, OrderState};

    const RAW: &str = r#"{
        "products": [
            {"name": "Drinks", "products": [
                {"product_name": "Cola", "quantity": 2, "base_amount": 10.0},
                {"product_name": "Water", "quantity": 1, "base_amount": 2.0}
            ]},
            {"name": "Lotto", "products": [
                {"product_name": "Pick 3", "quantity": 4, "base_amount": 20.0}
            ]}
        ],
        "products_info": {"total": 32.0, "qty": 7},
        "taxes": [
            {"name": "Sales Tax 8%", "tax_amount": 0.8, "base_amount": 10.0},
            {"name": "No Taxes", "tax_amount": 0.0, "base_amount": 22.0}
        ],
        "taxes_info": {"tax_amount": 0.8, "base_amount": 32.0},
        "currency": {"total_paid": 32.8, "symbol": "$"},
        "payments": [{"name": "Cash", "total": 32.8, "final_count": 132.8, "cash": true}],
        "date_start": "2026-03-10 00:00:00"
    }"#;

    struct Fixture {
        db: Database,
        lotto_id: String,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let categories = db.categories();
        let drinks = categories.create("Drinks").await.unwrap();
        let lotto = categories.create("Lotto").await.unwrap();
        categories.set_excluded(&lotto.id, true).await.unwrap();

        let orders = db.orders();
        let cola = orders.create_product("Cola", &[drinks.id.as_str()]).await.unwrap();
        let ticket = orders.create_product("Pick 3", &[lotto.id.as_str()]).await.unwrap();

        let line = |product_id: &str, qty: f64, cents: i64| OrderLine {
            product_id: product_id.to_string(),
            product_name: "Item".to_string(),
            qty,
            price_subtotal: Money::from_cents(cents),
            category_ids: Vec::new(),
        };
        let order = |id: &str, hour: u32, lines: Vec<OrderLine>| Order {
            id: id.to_string(),
            config_id: "register-1".to_string(),
            session_id: "s1".to_string(),
            state: OrderState::Paid,
            date_order: Utc.with_ymd_and_hms(2026, 3, 10, hour, 30, 0).unwrap(),
            lines,
        };

        // 14:30 UTC: cola and a ticket in the same basket.
        orders
            .insert_order(&order("o1", 14, vec![line(&cola, 2.0, 1000), line(&ticket, 4.0, 2000)]))
            .await
            .unwrap();
        // 15:30 UTC: tickets only.
        orders
            .insert_order(&order("o2", 15, vec![line(&ticket, 1.0, 500)]))
            .await
            .unwrap();
        // 16:30 UTC: a refund.
        orders
            .insert_order(&order("o3", 16, vec![line(&cola, -1.0, -500)]))
            .await
            .unwrap();

        Fixture {
            db,
            lotto_id: lotto.id,
        }
    }

    #[tokio::test]
    async fn test_lotto_moves_to_payouts() {
        let fx = fixture().await;
        let service = fx.db.sale_details(&ReportSettings::default());

        let report = service
            .reconcile_json(RAW, &ReportFilter::for_sessions(["s1"]), None)
            .await
            .unwrap();

        assert_eq!(report.products.len(), 1);
        assert_eq!(report.products[0].name, "Drinks");
        assert_eq!(report.products_info.total, 12.0);
        assert_eq!(report.products_info.qty, 3.0);

        assert_eq!(report.excluded_ops.len(), 1);
        assert_eq!(report.excluded_ops[0].product_name, "Lotto");
        assert_eq!(report.excluded_ops[0].quantity, 4.0);
        assert_eq!(report.excluded_total, 20.0);

        assert_eq!(report.taxes[1].base_amount, 2.0);
        assert_eq!(report.taxes[0].base_amount, 10.0);
        assert_eq!(report.taxes_info.base_amount, 12.0);

        // Payments are left alone by default.
        assert_eq!(report.payments[0].total, 32.8);
        assert!(report.extra.contains_key("date_start"));
    }

    #[tokio::test]
    async fn test_hourly_sales_skip_payouts_and_refunds() {
        let fx = fixture().await;
        let service = fx.db.sale_details(&ReportSettings::default());

        let report = service
            .reconcile_json(RAW, &ReportFilter::for_sessions(["s1"]), Some("UTC"))
            .await
            .unwrap();

        let hourly = report.hourly_sales.unwrap();
        assert_eq!(hourly.len(), 1);
        assert_eq!(hourly[0].hour, "2 PM");
        assert_eq!(hourly[0].total, 10.0);
        assert_eq!(hourly[0].orders, 1);
        assert_eq!(hourly[0].items, 2);
    }

    #[tokio::test]
    async fn test_hourly_sales_use_caller_time_zone() {
        let fx = fixture().await;
        let service = fx.db.sale_details(&ReportSettings::default());

        let report = service
            .reconcile_json(RAW, &ReportFilter::for_sessions(["s1"]), Some("America/New_York"))
            .await
            .unwrap();

        // 14:30 UTC is 10:30 EDT.
        assert_eq!(report.hourly_sales.unwrap()[0].hour, "10 AM");
    }

    #[tokio::test]
    async fn test_default_range_uses_now() {
        let fx = fixture().await;
        let service = fx.db.sale_details(&ReportSettings::default());
        let raw = SaleDetailsReport::from_json(RAW).unwrap();

        let on_the_day = Utc.with_ymd_and_hms(2026, 3, 10, 20, 0, 0).unwrap();
        let report = service
            .get_sale_details_at(raw.clone(), &ReportFilter::default(), None, on_the_day)
            .await
            .unwrap();
        assert_eq!(report.hourly_sales.unwrap().len(), 1);

        let next_day = Utc.with_ymd_and_hms(2026, 3, 11, 9, 0, 0).unwrap();
        let report = service
            .get_sale_details_at(raw, &ReportFilter::default(), None, next_day)
            .await
            .unwrap();
        assert!(report.hourly_sales.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_time_zone_fails() {
        let fx = fixture().await;
        let service = fx.db.sale_details(&ReportSettings::default());

        let err = service
            .reconcile_json(RAW, &ReportFilter::for_sessions(["s1"]), Some("Mars/Olympus"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::InvalidTimezone(_))));
    }

    #[tokio::test]
    async fn test_hourly_sales_can_be_disabled() {
        let fx = fixture().await;
        let settings = ReportSettings {
            hourly_sales: false,
            ..Default::default()
        };

        // With the histogram off the zone is never consulted.
        let report = fx
            .db
            .sale_details(&settings)
            .reconcile_json(RAW, &ReportFilter::for_sessions(["s1"]), Some("Mars/Olympus"))
            .await
            .unwrap();

        assert!(report.hourly_sales.is_none());
        assert_eq!(report.excluded_total, 20.0);
    }

    #[tokio::test]
    async fn test_deduct_from_cash_policy() {
        let fx = fixture().await;
        let settings = ReportSettings {
            payment_adjustment: PaymentAdjustmentMode::DeductFromCash,
            ..Default::default()
        };

        let report = fx
            .db
            .sale_details(&settings)
            .reconcile_json(RAW, &ReportFilter::for_sessions(["s1"]), None)
            .await
            .unwrap();

        assert!((report.payments[0].total - 12.8).abs() < 1e-9);
        assert!((report.payments[0].final_count.unwrap() - 112.8).abs() < 1e-9);
        assert!((report.currency.unwrap().total_paid - 12.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_clearing_flag_restores_revenue() {
        let fx = fixture().await;
        fx.db.categories().set_excluded(&fx.lotto_id, false).await.unwrap();

        let report = fx
            .db
            .sale_details(&ReportSettings::default())
            .reconcile_json(RAW, &ReportFilter::for_sessions(["s1"]), None)
            .await
            .unwrap();

        assert_eq!(report.products.len(), 2);
        assert_eq!(report.products_info.total, 32.0);
        assert!(report.excluded_ops.is_empty());
        assert_eq!(report.excluded_total, 0.0);
        assert_eq!(report.taxes[1].base_amount, 22.0);

        // Tickets now count in the hourly histogram too.
        let hourly = report.hourly_sales.unwrap();
        assert_eq!(hourly.len(), 2);
        assert_eq!(hourly[0].total, 30.0);
        assert_eq!(hourly[1].total, 5.0);
    }

    #[tokio::test]
    async fn test_blank_session_id_rejected() {
        let fx = fixture().await;
        let err = fx
            .db
            .sale_details(&ReportSettings::default())
            .reconcile_json(RAW, &ReportFilter::for_sessions([" "]), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_report() {
        let fx = fixture().await;
        let err = fx
            .db
            .sale_details(&ReportSettings::default())
            .reconcile_json("[1, 2]", &ReportFilter::default(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::InvalidReport(_))));
    }
}
