//! # Report Configuration
//!
//! Settings for the database location and for how reports are reconciled.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ZREPORT_DB_PATH=/var/lib/zreport/zreport.db                        │
//! │     ZREPORT_TIMEZONE=America/New_York                                  │
//! │     ZREPORT_HOURLY_SALES=false                                         │
//! │     ZREPORT_PAYMENT_ADJUSTMENT=deduct_from_cash                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/zreport-filter/report.toml (Linux)                       │
//! │     ~/Library/Application Support/com.zreport.filter/report.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     UTC, hourly sales on, payments left as computed                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # report.toml
//! [database]
//! path = "zreport.db"
//! max_connections = 5
//!
//! [report]
//! default_timezone = "America/New_York"
//! hourly_sales = true
//! payment_adjustment = "leave"   # leave | deduct_from_cash
//! no_tax_labels = ["No Taxes", "Exempt"]
//! match_zero_tax_amount = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;
use zreport_core::hourly::resolve_timezone;
use zreport_core::reconcile::{DeductFromCash, LeavePayments, Reconciler, ZeroTaxMatcher};
use zreport_core::{FALLBACK_TIMEZONE, NO_TAX_LABEL};

// =============================================================================
// Payment Adjustment Mode
// =============================================================================

/// What happens to payment totals when categories are excluded.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  LEAVE (Default)                                                       │
/// │  • currency.total_paid and payments stay as the engine computed them   │
/// │  • The drawer still physically holds the payout cash                   │
/// │                                                                         │
/// │  DEDUCT_FROM_CASH                                                      │
/// │  • excluded_total is subtracted from total_paid and from the first     │
/// │    cash method (total and final_count)                                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentAdjustmentMode {
    #[default]
    Leave,
    DeductFromCash,
}

impl std::fmt::Display for PaymentAdjustmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentAdjustmentMode::Leave => write!(f, "leave"),
            PaymentAdjustmentMode::DeductFromCash => write!(f, "deduct_from_cash"),
        }
    }
}

impl std::str::FromStr for PaymentAdjustmentMode {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "leave" | "none" => Ok(PaymentAdjustmentMode::Leave),
            "deduct_from_cash" | "deduct" | "cash" => Ok(PaymentAdjustmentMode::DeductFromCash),
            other => Err(DbError::Config(format!(
                "Unknown payment adjustment: '{}'. Valid options: leave, deduct_from_cash",
                other
            ))),
        }
    }
}

// =============================================================================
// Database Settings
// =============================================================================

/// Where the category flag store and order snapshot live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("zreport.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Report Settings
// =============================================================================

/// Reconciliation behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// IANA zone used for hour buckets and the default date range when the
    /// caller passes none.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    /// Whether reports carry the `hourly_sales` histogram.
    #[serde(default = "default_true")]
    pub hourly_sales: bool,

    #[serde(default)]
    pub payment_adjustment: PaymentAdjustmentMode,

    /// Tax line names treated as the untaxed bucket.
    #[serde(default = "default_no_tax_labels")]
    pub no_tax_labels: Vec<String>,

    /// Fall back to the first tax line with `tax_amount == 0.0`.
    #[serde(default = "default_true")]
    pub match_zero_tax_amount: bool,
}

fn default_timezone() -> String {
    FALLBACK_TIMEZONE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_no_tax_labels() -> Vec<String> {
    vec![NO_TAX_LABEL.to_string()]
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            default_timezone: default_timezone(),
            hourly_sales: true,
            payment_adjustment: PaymentAdjustmentMode::default(),
            no_tax_labels: default_no_tax_labels(),
            match_zero_tax_amount: true,
        }
    }
}

impl ReportSettings {
    /// Builds the reconciler these settings describe.
    pub fn reconciler(&self) -> Reconciler {
        let zero_tax = ZeroTaxMatcher {
            labels: self.no_tax_labels.clone(),
            match_zero_amount: self.match_zero_tax_amount,
        };

        match self.payment_adjustment {
            PaymentAdjustmentMode::Leave => Reconciler::new(zero_tax, Arc::new(LeavePayments)),
            PaymentAdjustmentMode::DeductFromCash => Reconciler::new(zero_tax, Arc::new(DeductFromCash)),
        }
    }
}

// =============================================================================
// Report Configuration
// =============================================================================

/// Complete configuration, as stored in `report.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub report: ReportSettings,
}

impl ReportConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (report.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading report config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load report config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> DbResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| DbError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Report config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DbResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(DbError::Config("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(DbError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        // A bad zone would shift every hourly bucket, so refuse it up front.
        resolve_timezone(None, Some(&self.report.default_timezone))?;

        Ok(())
    }

    /// Applies `ZREPORT_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("ZREPORT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(tz) = lookup("ZREPORT_TIMEZONE") {
            debug!(timezone = %tz, "Overriding default time zone from environment");
            self.report.default_timezone = tz;
        }

        if let Some(flag) = lookup("ZREPORT_HOURLY_SALES") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.report.hourly_sales = true,
                "0" | "false" | "no" | "off" => self.report.hourly_sales = false,
                _ => warn!(value = %flag, "Unknown ZREPORT_HOURLY_SALES value in environment"),
            }
        }

        if let Some(mode) = lookup("ZREPORT_PAYMENT_ADJUSTMENT") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding payment adjustment from environment");
                    self.report.payment_adjustment = parsed;
                }
                Err(e) => warn!("{}", e),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "zreport", "filter")
            .map(|dirs| dirs.config_dir().join("report.toml"))
    }

    /// Pool configuration for [`Database::new`](crate::pool::Database::new).
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_payment_adjustment_parsing() {
        assert_eq!("leave".parse::<PaymentAdjustmentMode>().unwrap(), PaymentAdjustmentMode::Leave);
        assert_eq!(
            "Deduct_From_Cash".parse::<PaymentAdjustmentMode>().unwrap(),
            PaymentAdjustmentMode::DeductFromCash
        );
        assert!("refund".parse::<PaymentAdjustmentMode>().is_err());
        assert_eq!(PaymentAdjustmentMode::DeductFromCash.to_string(), "deduct_from_cash");
    }

    #[test]
    fn test_default_config() {
        let config = ReportConfig::default();
        assert_eq!(config.report.default_timezone, "UTC");
        assert!(config.report.hourly_sales);
        assert_eq!(config.report.payment_adjustment, PaymentAdjustmentMode::Leave);
        assert_eq!(config.report.no_tax_labels, vec!["No Taxes".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ReportConfig::default();

        config.report.default_timezone = "Europe/Pari".to_string();
        assert!(matches!(config.validate(), Err(DbError::Core(_))));

        config.report.default_timezone = "Europe/Paris".to_string();
        assert!(config.validate().is_ok());

        config.database.path = PathBuf::new();
        assert!(matches!(config.validate(), Err(DbError::Config(_))));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ReportConfig = toml::from_str(
            r#"
            [report]
            default_timezone = "America/Chicago"
            payment_adjustment = "deduct_from_cash"
            "#,
        )
        .unwrap();

        assert_eq!(config.report.default_timezone, "America/Chicago");
        assert_eq!(config.report.payment_adjustment, PaymentAdjustmentMode::DeductFromCash);
        assert!(config.report.hourly_sales);
        assert!(config.report.match_zero_tax_amount);
        assert_eq!(config.database, DatabaseSettings::default());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ZREPORT_DB_PATH", "/tmp/other.db"),
            ("ZREPORT_TIMEZONE", "Asia/Tokyo"),
            ("ZREPORT_HOURLY_SALES", "off"),
            ("ZREPORT_PAYMENT_ADJUSTMENT", "bogus"),
        ]);

        let mut config = ReportConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.report.default_timezone, "Asia/Tokyo");
        assert!(!config.report.hourly_sales);
        // Unknown values are ignored.
        assert_eq!(config.report.payment_adjustment, PaymentAdjustmentMode::Leave);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.toml");

        let mut config = ReportConfig::default();
        config.report.default_timezone = "America/New_York".to_string();
        config.report.no_tax_labels = vec!["No Taxes".to_string(), "Exempt".to_string()];
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[database]"));
        assert!(contents.contains("[report]"));

        let loaded: ReportConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_fails_load_but_not_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.toml");
        std::fs::write(&path, "[report]\ndefault_timezone = \"Nowhere/Land\"\n").unwrap();

        assert!(ReportConfig::load(Some(path.clone())).is_err());

        let config = ReportConfig::load_or_default(Some(path));
        assert_eq!(config.report.default_timezone, FALLBACK_TIMEZONE);
    }

    #[test]
    fn test_reconciler_from_settings() {
        use zreport_core::report::SaleDetailsReport;
        use zreport_core::ExclusionSet;

        let raw = SaleDetailsReport::from_json(
            r#"{
                "products": [{"name": "Lotto", "products": [{"product_name": "Pick 3", "quantity": 1, "base_amount": 5}]}],
                "currency": {"total_paid": 20.0},
                "payments": [{"name": "Cash", "total": 20.0, "cash": true}]
            }"#,
        )
        .unwrap();

        let settings = ReportSettings {
            payment_adjustment: PaymentAdjustmentMode::DeductFromCash,
            ..Default::default()
        };
        let report = settings.reconciler().reconcile(raw, &ExclusionSet::from_names(["Lotto"]));

        assert_eq!(report.payments[0].total, 15.0);
        assert_eq!(report.currency.map(|c| c.total_paid), Some(15.0));
    }
}
