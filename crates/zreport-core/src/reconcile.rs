//! # Report Reconciler
//!
//! Moves excluded categories out of the revenue section of a computed sale
//! details report and re-derives every total that included them.
//!
//! ## Reconciliation Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw.products ──partition──┬── regular  ──► products, products_info     │
//! │                            │                                            │
//! │                            └── excluded ──► excluded_ops (per category, │
//! │                                             sorted by name)             │
//! │                                             excluded_total ──┐          │
//! │                                                              │          │
//! │  taxes[zero-tax entry].base_amount  -= excluded_total ◄──────┤          │
//! │  taxes_info.base_amount             -= excluded_total ◄──────┤          │
//! │  currency / payments                (PaymentAdjustment) ◄────┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `products_info.total + excluded_total` equals the line total of the raw
//!   report (within [`crate::AMOUNT_EPSILON`]).
//! - Each raw category group ends up in exactly one of `products` or
//!   `excluded_ops`.
//! - When nothing is excluded, `products`, `products_info`, `taxes` and
//!   `taxes_info` come back exactly as they went in.
//!
//! Reconciliation is total: it never fails, absent data reads as zero.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::exclusion::ExclusionSet;
use crate::report::{
    CategoryGroup, CurrencyInfo, ExcludedOp, PaymentLine, ProductsInfo, SaleDetailsReport, TaxKind,
    TaxLine,
};
use crate::NO_TAX_LABEL;

// =============================================================================
// Zero-Tax Matching
// =============================================================================

/// Locates the untaxed bucket in the report's tax list.
///
/// ## Precedence
/// 1. `kind == no_tax` (stable tag, when the engine emits one)
/// 2. name equals one of `labels`
/// 3. `tax_amount == 0.0`, if `match_zero_amount` is on
///
/// The first line matching the highest-precedence rule wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroTaxMatcher {
    pub labels: Vec<String>,
    pub match_zero_amount: bool,
}

impl Default for ZeroTaxMatcher {
    fn default() -> Self {
        ZeroTaxMatcher {
            labels: vec![NO_TAX_LABEL.to_string()],
            match_zero_amount: true,
        }
    }
}

impl ZeroTaxMatcher {
    /// Index of the zero-tax line, if any.
    pub fn position(&self, taxes: &[TaxLine]) -> Option<usize> {
        taxes
            .iter()
            .position(|tax| tax.kind == Some(TaxKind::NoTax))
            .or_else(|| {
                taxes
                    .iter()
                    .position(|tax| self.labels.iter().any(|label| label == tax.name.trim()))
            })
            .or_else(|| {
                self.match_zero_amount
                    .then(|| taxes.iter().position(|tax| tax.tax_amount == 0.0))
                    .flatten()
            })
    }
}

// =============================================================================
// Payment Adjustment Policy
// =============================================================================

/// How payment totals react to the excluded amount.
///
/// Whether payouts were settled in cash is a business assumption, not
/// something the report proves, so it is a pluggable policy.
pub trait PaymentAdjustment: fmt::Debug + Send + Sync {
    fn adjust(
        &self,
        currency: Option<&mut CurrencyInfo>,
        payments: &mut [PaymentLine],
        excluded_total: f64,
    );
}

/// Leaves `currency` and `payments` as the engine computed them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeavePayments;

impl PaymentAdjustment for LeavePayments {
    fn adjust(&self, _: Option<&mut CurrencyInfo>, _: &mut [PaymentLine], _: f64) {}
}

/// Assumes excluded activity was settled in cash: deducts it from
/// `currency.total_paid` and from the first cash method's `total` and
/// `final_count`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeductFromCash;

impl PaymentAdjustment for DeductFromCash {
    fn adjust(
        &self,
        currency: Option<&mut CurrencyInfo>,
        payments: &mut [PaymentLine],
        excluded_total: f64,
    ) {
        if let Some(currency) = currency {
            currency.total_paid -= excluded_total;
        }
        if let Some(cash) = payments.iter_mut().find(|payment| payment.cash) {
            cash.total -= excluded_total;
            if let Some(final_count) = cash.final_count.as_mut() {
                *final_count -= excluded_total;
            }
        }
    }
}

// =============================================================================
// Reconciler
// =============================================================================

/// Applies an [`ExclusionSet`] to a computed report.
#[derive(Debug, Clone)]
pub struct Reconciler {
    zero_tax: ZeroTaxMatcher,
    payments: Arc<dyn PaymentAdjustment>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Reconciler {
            zero_tax: ZeroTaxMatcher::default(),
            payments: Arc::new(LeavePayments),
        }
    }
}

impl Reconciler {
    pub fn new(zero_tax: ZeroTaxMatcher, payments: Arc<dyn PaymentAdjustment>) -> Self {
        Reconciler { zero_tax, payments }
    }

    /// Replaces the zero-tax matcher.
    pub fn with_zero_tax(mut self, zero_tax: ZeroTaxMatcher) -> Self {
        self.zero_tax = zero_tax;
        self
    }

    /// Replaces the payment policy.
    pub fn with_payment_adjustment(mut self, payments: Arc<dyn PaymentAdjustment>) -> Self {
        self.payments = payments;
        self
    }

    /// Splits excluded categories out of `report` and rebalances its totals.
    ///
    /// ## Example
    /// ```rust
    /// use zreport_core::exclusion::ExclusionSet;
    /// use zreport_core::reconcile::Reconciler;
    /// use zreport_core::report::SaleDetailsReport;
    ///
    /// let raw = SaleDetailsReport::from_json(r#"{
    ///     "products": [
    ///         {"name": "Drinks", "products": [{"product_name": "Cola", "quantity": 2, "base_amount": 10}]},
    ///         {"name": "Lotto", "products": [{"product_name": "Pick 3", "quantity": 1, "base_amount": 5}]}
    ///     ],
    ///     "taxes": [{"name": "No Taxes", "tax_amount": 0.0, "base_amount": 15}],
    ///     "taxes_info": {"tax_amount": 0.0, "base_amount": 15}
    /// }"#).unwrap();
    ///
    /// let report = Reconciler::default().reconcile(raw, &ExclusionSet::from_names(["Lotto"]));
    ///
    /// assert_eq!(report.products_info.total, 10.0);
    /// assert_eq!(report.taxes[0].base_amount, 10.0);
    /// assert_eq!(report.excluded_ops[0].product_name, "Lotto");
    /// ```
    pub fn reconcile(
        &self,
        mut report: SaleDetailsReport,
        exclusions: &ExclusionSet,
    ) -> SaleDetailsReport {
        let (regular, excluded): (Vec<CategoryGroup>, Vec<CategoryGroup>) =
            std::mem::take(&mut report.products)
                .into_iter()
                .partition(|group| !exclusions.excludes_group(group));

        report.products = regular;
        if excluded.is_empty() {
            report.excluded_ops = Vec::new();
            report.excluded_total = 0.0;
            return report;
        }

        let (excluded_ops, excluded_total) = aggregate_excluded(&excluded);

        report.products_info = ProductsInfo {
            total: report.products_base_total(),
            qty: report.products_quantity(),
        };

        if let Some(index) = self.zero_tax.position(&report.taxes) {
            report.taxes[index].base_amount -= excluded_total;
        }
        report.taxes_info.base_amount -= excluded_total;

        self.payments
            .adjust(report.currency.as_mut(), &mut report.payments, excluded_total);

        report.excluded_ops = excluded_ops;
        report.excluded_total = excluded_total;
        report
    }
}

/// One entry per excluded category (keyed by id, else name), sorted by name,
/// plus the grand total over every excluded line.
fn aggregate_excluded(groups: &[CategoryGroup]) -> (Vec<ExcludedOp>, f64) {
    let mut ops: Vec<ExcludedOp> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut total = 0.0;

    for group in groups {
        let key = group.category_id.as_deref().unwrap_or(&group.name);
        // Created before the line loop so an empty category still shows up.
        let slot = *index.entry(key).or_insert_with(|| {
            ops.push(ExcludedOp {
                category_id: group.category_id.clone(),
                product_name: group.name.clone(),
                quantity: 0.0,
                base_amount: 0.0,
            });
            ops.len() - 1
        });
        for line in &group.products {
            ops[slot].quantity += line.quantity;
            ops[slot].base_amount += line.base_amount;
            total += line.base_amount;
        }
    }

    ops.sort_by(|a, b| a.product_name.cmp(&b.product_name));
    (ops, total)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ProductLine;
    use crate::AMOUNT_EPSILON;

    fn line(name: &str, quantity: f64, base_amount: f64) -> ProductLine {
        ProductLine {
            product_name: name.to_string(),
            quantity,
            base_amount,
            ..Default::default()
        }
    }

    fn group(name: &str, lines: Vec<ProductLine>) -> CategoryGroup {
        let total = lines.iter().map(|l| l.base_amount).sum();
        let qty = lines.iter().map(|l| l.quantity).sum();
        CategoryGroup {
            name: name.to_string(),
            products: lines,
            total,
            qty,
            ..Default::default()
        }
    }

    fn tax(name: &str, tax_amount: f64, base_amount: f64) -> TaxLine {
        TaxLine {
            name: name.to_string(),
            tax_amount,
            base_amount,
            ..Default::default()
        }
    }

    /// Drinks 10.00 x2, Lotto 5.00 x1, Snacks 7.25 x3, Bottle Deposit 0.30 x6.
    fn store_report() -> SaleDetailsReport {
        let products = vec![
            group("Drinks", vec![line("Cola", 2.0, 10.0)]),
            group("Lotto", vec![line("Pick 3", 1.0, 5.0)]),
            group("Snacks", vec![line("Chips", 2.0, 5.0), line("Gum", 1.0, 2.25)]),
            group(
                "Bottle Deposit",
                vec![line("Can deposit", 4.0, 0.2), line("Bottle deposit", 2.0, 0.1)],
            ),
        ];
        SaleDetailsReport {
            products_info: ProductsInfo { total: 22.55, qty: 12.0 },
            products,
            taxes: vec![tax("Sales Tax 8%", 1.38, 17.25), tax("No Taxes", 0.0, 5.3)],
            taxes_info: crate::report::TaxesInfo {
                tax_amount: 1.38,
                base_amount: 22.55,
                ..Default::default()
            },
            currency: Some(CurrencyInfo { total_paid: 23.93, ..Default::default() }),
            payments: vec![
                PaymentLine {
                    name: "Card".to_string(),
                    total: 10.0,
                    ..Default::default()
                },
                PaymentLine {
                    name: "Cash".to_string(),
                    total: 13.93,
                    final_count: Some(113.93),
                    cash: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn excluded() -> ExclusionSet {
        ExclusionSet::from_names(["Lotto", "Bottle Deposit"])
    }

    #[test]
    fn test_drinks_and_lotto_scenario() {
        let raw = SaleDetailsReport {
            products: vec![
                group("Drinks", vec![line("Cola", 2.0, 10.0)]),
                group("Lotto", vec![line("Pick 3", 1.0, 5.0)]),
            ],
            ..Default::default()
        };

        let report = Reconciler::default().reconcile(raw, &ExclusionSet::from_names(["Lotto"]));

        assert_eq!(report.products.len(), 1);
        assert_eq!(report.products[0].name, "Drinks");
        assert_eq!(report.products_info, ProductsInfo { total: 10.0, qty: 2.0 });
        assert_eq!(report.excluded_total, 5.0);
        assert_eq!(
            report.excluded_ops,
            vec![ExcludedOp {
                category_id: None,
                product_name: "Lotto".to_string(),
                quantity: 1.0,
                base_amount: 5.0,
            }]
        );
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let mut raw = store_report();
        raw.products.push(group("Gift Cards", vec![]));
        let mut before: Vec<String> = raw.products.iter().map(|g| g.name.clone()).collect();
        before.sort();

        let exclusions = ExclusionSet::from_names(["Lotto", "Bottle Deposit", "Gift Cards"]);
        let report = Reconciler::default().reconcile(raw, &exclusions);

        let mut after: Vec<String> = report
            .products
            .iter()
            .map(|g| g.name.clone())
            .chain(report.excluded_ops.iter().map(|op| op.product_name.clone()))
            .collect();
        after.sort();
        assert_eq!(before, after);

        for op in &report.excluded_ops {
            assert!(report.products.iter().all(|g| g.name != op.product_name));
        }

        let empty = report
            .excluded_ops
            .iter()
            .find(|op| op.product_name == "Gift Cards")
            .unwrap();
        assert_eq!(empty.quantity, 0.0);
        assert_eq!(empty.base_amount, 0.0);
    }

    #[test]
    fn test_regular_order_preserved_and_excluded_sorted() {
        let report = Reconciler::default().reconcile(store_report(), &excluded());

        let regular: Vec<&str> = report.products.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(regular, vec!["Drinks", "Snacks"]);

        let payouts: Vec<&str> = report.excluded_ops.iter().map(|op| op.product_name.as_str()).collect();
        assert_eq!(payouts, vec!["Bottle Deposit", "Lotto"]);
        assert_eq!(report.excluded_ops[0].quantity, 6.0);
    }

    #[test]
    fn test_total_is_conserved() {
        let raw = store_report();
        let original_total = raw.products_base_total();

        let report = Reconciler::default().reconcile(raw, &excluded());

        assert!((report.turnover_with_excluded() - original_total).abs() < AMOUNT_EPSILON);
        assert!((report.excluded_total - 5.3).abs() < AMOUNT_EPSILON);
        assert!((report.products_info.total - 17.25).abs() < AMOUNT_EPSILON);
        assert_eq!(report.products_info.qty, 5.0);
    }

    #[test]
    fn test_tax_bases_reduced_by_excluded_total() {
        let raw = store_report();
        let info_before = raw.taxes_info.base_amount;

        let report = Reconciler::default().reconcile(raw, &excluded());

        assert!((report.taxes_info.base_amount - (info_before - report.excluded_total)).abs() < AMOUNT_EPSILON);
        assert!(report.taxes[1].base_amount.abs() < AMOUNT_EPSILON);
        // Taxed bucket untouched.
        assert_eq!(report.taxes[0].base_amount, 17.25);
    }

    #[test]
    fn test_zero_tax_base_scenario() {
        let raw = SaleDetailsReport {
            products: vec![
                group("Drinks", vec![line("Cola", 2.0, 10.0)]),
                group("Lotto", vec![line("Pick 3", 1.0, 5.0)]),
            ],
            taxes: vec![tax("No Taxes", 0.0, 15.0)],
            ..Default::default()
        };

        let report = Reconciler::default().reconcile(raw, &ExclusionSet::from_names(["Lotto"]));
        assert_eq!(report.taxes[0].base_amount, 10.0);
    }

    #[test]
    fn test_empty_exclusion_set_is_identity() {
        let raw = store_report();
        let report = Reconciler::default().reconcile(raw.clone(), &ExclusionSet::new());

        assert_eq!(report.products, raw.products);
        assert_eq!(report.products_info, raw.products_info);
        assert_eq!(report.taxes, raw.taxes);
        assert_eq!(report.taxes_info, raw.taxes_info);
        assert_eq!(report.excluded_total, 0.0);
        assert!(report.excluded_ops.is_empty());
    }

    #[test]
    fn test_missing_zero_tax_entry_is_noop() {
        let mut raw = store_report();
        raw.taxes = vec![tax("Sales Tax 8%", 1.38, 22.55)];

        let report = Reconciler::default().reconcile(raw, &excluded());

        assert_eq!(report.taxes[0].base_amount, 22.55);
        assert!((report.taxes_info.base_amount - 17.25).abs() < AMOUNT_EPSILON);
    }

    #[test]
    fn test_missing_fields_read_as_zero() {
        let raw = SaleDetailsReport::from_json(
            r#"{"products": [{"name": "Lotto", "products": [{"base_amount": 5}]}]}"#,
        )
        .unwrap();

        let report = Reconciler::default().reconcile(raw, &ExclusionSet::from_names(["Lotto"]));

        assert!(report.products.is_empty());
        assert_eq!(report.products_info, ProductsInfo::default());
        assert_eq!(report.excluded_ops[0].quantity, 0.0);
        assert_eq!(report.taxes_info.base_amount, -5.0);
    }

    #[test]
    fn test_zero_tax_precedence() {
        let matcher = ZeroTaxMatcher::default();

        // Numeric sentinel only when nothing better matches.
        let taxes = vec![tax("Exempt", 0.0, 1.0), tax("No Taxes", 0.0, 2.0)];
        assert_eq!(matcher.position(&taxes), Some(1));

        // Tag beats label.
        let mut tagged = tax("Zero rated", 0.5, 3.0);
        tagged.kind = Some(TaxKind::NoTax);
        let taxes = vec![tax("No Taxes", 0.0, 2.0), tagged];
        assert_eq!(matcher.position(&taxes), Some(1));

        let taxes = vec![tax("VAT", 2.0, 10.0), tax("Exempt", 0.0, 1.0)];
        assert_eq!(matcher.position(&taxes), Some(1));

        let strict = ZeroTaxMatcher {
            match_zero_amount: false,
            ..ZeroTaxMatcher::default()
        };
        assert_eq!(strict.position(&taxes), None);
    }

    #[test]
    fn test_localized_label() {
        let matcher = ZeroTaxMatcher {
            labels: vec!["Sin impuestos".to_string()],
            match_zero_amount: false,
        };
        let taxes = vec![tax("IVA 21%", 2.1, 10.0), tax("Sin impuestos", 0.0, 4.0)];
        assert_eq!(matcher.position(&taxes), Some(1));
    }

    #[test]
    fn test_leave_payments_by_default() {
        let raw = store_report();
        let report = Reconciler::default().reconcile(raw.clone(), &excluded());

        assert_eq!(report.currency, raw.currency);
        assert_eq!(report.payments, raw.payments);
    }

    #[test]
    fn test_deduct_from_cash_policy() {
        let reconciler = Reconciler::default().with_payment_adjustment(Arc::new(DeductFromCash));
        let report = reconciler.reconcile(store_report(), &excluded());

        let currency = report.currency.as_ref().unwrap();
        assert!((currency.total_paid - 18.63).abs() < AMOUNT_EPSILON);

        assert_eq!(report.payments[0].total, 10.0);
        assert!((report.payments[1].total - 8.63).abs() < AMOUNT_EPSILON);
        assert!((report.payments[1].final_count.unwrap() - 108.63).abs() < AMOUNT_EPSILON);
    }

    #[test]
    fn test_deduct_from_cash_without_cash_method() {
        let mut raw = store_report();
        raw.payments.retain(|p| !p.cash);
        raw.currency = None;

        let reconciler = Reconciler::default().with_payment_adjustment(Arc::new(DeductFromCash));
        let report = reconciler.reconcile(raw, &excluded());

        assert_eq!(report.payments.len(), 1);
        assert_eq!(report.payments[0].total, 10.0);
        assert!(report.currency.is_none());
    }

    #[test]
    fn test_groups_matched_by_id_aggregate_separately() {
        let mut lotto_a = group("Lotto", vec![line("Pick 3", 1.0, 5.0)]);
        lotto_a.category_id = Some("c-lotto".to_string());
        let mut lotto_b = group("Lotto", vec![line("Powerball", 1.0, 2.0)]);
        lotto_b.category_id = Some("c-other".to_string());

        let mut set = ExclusionSet::new();
        set.insert("c-lotto", "Lotto");

        let raw = SaleDetailsReport {
            products: vec![lotto_a, lotto_b],
            ..Default::default()
        };
        let report = Reconciler::default().reconcile(raw, &set);

        assert_eq!(report.products.len(), 1);
        assert_eq!(report.products[0].category_id.as_deref(), Some("c-other"));
        assert_eq!(report.excluded_ops.len(), 1);
        assert_eq!(report.excluded_ops[0].category_id.as_deref(), Some("c-lotto"));
        assert_eq!(report.excluded_total, 5.0);
    }

    #[test]
    fn test_reconcile_is_idempotent_per_input() {
        let a = Reconciler::default().reconcile(store_report(), &excluded());
        let b = Reconciler::default().reconcile(store_report(), &excluded());
        assert_eq!(a, b);
    }
}
