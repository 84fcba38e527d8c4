//! # Error Types
//!
//! Domain-specific error types for zreport-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  zreport-core errors (this file)                                       │
//! │  ├── CoreError        - Report and configuration errors                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  zreport-db errors (separate crate)                                    │
//! │  └── DbError          - Database, config file and service failures     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//! Reconciliation itself never fails: absent report fields are read as zero
//! or empty. The errors below cover the inputs where guessing would corrupt
//! the result (an unknown time zone would shift every hour bucket).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core report errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Time zone identifier is not in the IANA database.
    ///
    /// ## When This Occurs
    /// - Caller passes a misspelled zone ("Europe/Pari")
    /// - Configuration default_timezone is invalid
    ///
    /// Hourly bucketing refuses to fall back silently here.
    #[error("Invalid time zone: '{0}'")]
    InvalidTimezone(String),

    /// Raw report could not be decoded at all (not a JSON object).
    #[error("Invalid report document: {0}")]
    InvalidReport(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::InvalidReport(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., invalid id, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
