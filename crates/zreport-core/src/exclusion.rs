//! # Exclusion Set
//!
//! The set of categories whose activity is moved out of net sales.
//!
//! ## Matching Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Report group / order line                ExclusionSet                  │
//! │                                                                         │
//! │  group.category_id = Some(id) ──────────► ids.contains(id)              │
//! │  group.category_id = None     ──────────► names.contains(group.name)    │
//! │                                                                         │
//! │  line.category_ids = [a, b, c] ─────────► any id in ids                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids are stable across renames and unique; names are not. When a report
//! group carries an id, its name is never consulted, so a renamed or
//! duplicated category name cannot leak revenue into the payouts bucket.

use std::collections::{BTreeSet, HashSet};

use crate::report::CategoryGroup;
use crate::types::Category;

/// Flagged categories, by id and by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    ids: HashSet<String>,
    names: BTreeSet<String>,
}

impl ExclusionSet {
    /// An empty set: reconciliation leaves revenue untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the set from the categories whose flag is on.
    pub fn from_categories<'a>(categories: impl IntoIterator<Item = &'a Category>) -> Self {
        let mut set = Self::new();
        for category in categories {
            if category.exclude_from_report_turnover {
                set.insert(&category.id, &category.name);
            }
        }
        set
    }

    /// Name-only set, for engines that do not report category ids.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExclusionSet {
            ids: HashSet::new(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.ids.insert(id.into());
        self.names.insert(name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.names.is_empty()
    }

    /// Display names of the flagged categories, sorted.
    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Whether a report category group belongs to the payouts bucket.
    pub fn excludes_group(&self, group: &CategoryGroup) -> bool {
        match &group.category_id {
            Some(id) => self.ids.contains(id),
            None => self.names.contains(&group.name),
        }
    }

    /// Whether a product in any of `category_ids` is non-revenue.
    pub fn excludes_any<S: AsRef<str>>(&self, category_ids: &[S]) -> bool {
        category_ids.iter().any(|id| self.ids.contains(id.as_ref()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
