//! # Validation Module
//!
//! Input validation for category configuration and report requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Category configuration                                       │
//! │  └── validate_category_name (THIS MODULE)                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Report request                                               │
//! │  └── validate_report_filter (THIS MODULE)                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The report document itself is never validated: the reconciler reads
//! whatever the engine produced and defaults what is missing.

use crate::error::ValidationError;
use crate::filter::ReportFilter;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest category name accepted.
pub const MAX_CATEGORY_NAME_LEN: usize = 128;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a category display name.
///
/// ## Rules
/// - Must not be empty or blank
/// - At most [`MAX_CATEGORY_NAME_LEN`] characters
///
/// ## Returns
/// The trimmed name.
///
/// ## Example
/// ```rust
/// use zreport_core::validation::validate_category_name;
///
/// assert_eq!(validate_category_name("  Lotto ").unwrap(), "Lotto");
/// assert!(validate_category_name("").is_err());
/// ```
pub fn validate_category_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_CATEGORY_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Report Request Validators
// =============================================================================

/// Validates the id lists of a report filter.
///
/// ## Rules
/// - No blank config id
/// - No blank session id
///
/// An inverted date range is not an error: the filter repairs it to a
/// one-day window.
pub fn validate_report_filter(filter: &ReportFilter) -> ValidationResult<()> {
    if filter.config_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(ValidationError::InvalidFormat {
            field: "config_ids".to_string(),
            reason: "must not contain blank ids".to_string(),
        });
    }

    if filter.session_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(ValidationError::InvalidFormat {
            field: "session_ids".to_string(),
            reason: "must not contain blank ids".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
