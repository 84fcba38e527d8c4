//! # Sale Details Report
//!
//! Typed view of the document the external report engine produces and the
//! renderer consumes.
//!
//! ## Document Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleDetailsReport                                                      │
//! │  ├── products: [CategoryGroup]      name, products: [ProductLine], ...  │
//! │  ├── products_info                  { total, qty }                      │
//! │  ├── taxes: [TaxLine]               name, tax_amount, base_amount       │
//! │  ├── taxes_info                     { tax_amount, base_amount }         │
//! │  ├── currency?                      { total_paid, ... }                 │
//! │  ├── payments: [PaymentLine]        name, total, final_count, cash      │
//! │  ├── excluded_ops: [ExcludedOp]     ← written by the reconciler         │
//! │  ├── excluded_total                 ← written by the reconciler         │
//! │  ├── hourly_sales?: [HourlySales]   ← written by the service            │
//! │  └── ...anything else               ← kept in `extra`, re-emitted as is │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lenient Decoding
//! Every field defaults when absent, and an explicit `null` reads as the
//! default too. Unknown keys are captured in `extra` maps so the round trip
//! through this crate never drops data the renderer may rely on.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

/// Unknown keys carried through unchanged.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Reads `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Report
// =============================================================================

/// The complete sale details (Z-Report) document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct SaleDetailsReport {
    /// Category groups counted as sales.
    #[serde(deserialize_with = "null_as_default")]
    pub products: Vec<CategoryGroup>,

    /// Grand totals over `products`.
    #[serde(deserialize_with = "null_as_default")]
    pub products_info: ProductsInfo,

    #[serde(deserialize_with = "null_as_default")]
    pub taxes: Vec<TaxLine>,

    #[serde(deserialize_with = "null_as_default")]
    pub taxes_info: TaxesInfo,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyInfo>,

    #[serde(deserialize_with = "null_as_default")]
    pub payments: Vec<PaymentLine>,

    /// "Payouts & Adjustments": one entry per excluded category.
    #[serde(deserialize_with = "null_as_default")]
    pub excluded_ops: Vec<ExcludedOp>,

    /// Sum of `base_amount` over every excluded line.
    #[serde(deserialize_with = "null_as_default")]
    pub excluded_total: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_sales: Option<Vec<HourlySales>>,

    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

impl SaleDetailsReport {
    /// Decodes the engine's JSON output.
    pub fn from_json(json: &str) -> crate::CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sum of `base_amount` over every product line still in `products`.
    pub fn products_base_total(&self) -> f64 {
        self.products.iter().map(CategoryGroup::base_total).fold(0.0, |acc, x| acc + x)
    }

    /// Sum of `quantity` over every product line still in `products`.
    pub fn products_quantity(&self) -> f64 {
        self.products.iter().map(CategoryGroup::quantity).fold(0.0, |acc, x| acc + x)
    }

    /// Revenue plus payouts: what the engine originally reported as turnover.
    pub fn turnover_with_excluded(&self) -> f64 {
        self.products_info.total + self.excluded_total
    }
}

// =============================================================================
// Products
// =============================================================================

/// Products sold within one POS category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CategoryGroup {
    /// Stable category id, when the engine provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(deserialize_with = "null_as_default")]
    pub products: Vec<ProductLine>,

    #[serde(deserialize_with = "null_as_default")]
    pub total: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub qty: f64,

    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

impl CategoryGroup {
    pub fn base_total(&self) -> f64 {
        self.products.iter().fold(0.0, |acc, line| acc + line.base_amount)
    }

    pub fn quantity(&self) -> f64 {
        self.products.iter().fold(0.0, |acc, line| acc + line.quantity)
    }
}

/// One product's aggregated sales within a category group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ProductLine {
    #[serde(deserialize_with = "null_as_default")]
    pub product_name: String,

    #[serde(deserialize_with = "null_as_default")]
    pub quantity: f64,

    /// Amount before tax, in currency units.
    #[serde(deserialize_with = "null_as_default")]
    pub base_amount: f64,

    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

/// Grand totals over the revenue categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ProductsInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub total: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub qty: f64,
}

/// Aggregated activity of one excluded category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct ExcludedOp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    /// The category name, shown as the line label.
    #[serde(deserialize_with = "null_as_default")]
    pub product_name: String,

    #[serde(deserialize_with = "null_as_default")]
    pub quantity: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub base_amount: f64,
}

// =============================================================================
// Taxes
// =============================================================================

/// Classification tag for a tax bucket, when the engine emits one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxKind {
    /// Untaxed transaction value.
    NoTax,
    Taxed,
    #[serde(other)]
    Other,
}

/// One tax bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct TaxLine {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TaxKind>,

    #[serde(deserialize_with = "null_as_default")]
    pub tax_amount: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub base_amount: f64,

    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

/// Tax totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct TaxesInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub tax_amount: f64,

    #[serde(deserialize_with = "null_as_default")]
    pub base_amount: f64,

    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

// =============================================================================
// Payments
// =============================================================================

/// Currency block (symbol, precision, ...) with the paid total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct CurrencyInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub total_paid: f64,

    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

/// Totals for one payment method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct PaymentLine {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(deserialize_with = "null_as_default")]
    pub total: f64,

    /// Expected closing count (cash methods only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_count: Option<f64>,

    /// Whether the method settles in cash.
    #[serde(deserialize_with = "null_as_default")]
    pub cash: bool,

    #[serde(flatten)]
    #[ts(skip)]
    pub extra: Extra,
}

// =============================================================================
// Hourly Sales
// =============================================================================

/// Sales within one local hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HourlySales {
    /// 12-hour clock label: "12 AM", "1 AM", ... "11 PM".
    pub hour: String,
    /// Revenue in currency units, refunds and excluded categories left out.
    pub total: f64,
    /// Orders contributing to this hour.
    pub orders: u32,
    /// Units sold.
    pub items: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
