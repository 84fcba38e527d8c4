//! # Category Repository
//!
//! The category flag store: which POS categories are excluded from report
//! turnover.
//!
//! ## Key Operations
//! - Category CRUD (create, rename)
//! - Toggling `exclude_from_report_turnover`
//! - Reading the current exclusion set at report time
//!
//! ## Read Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  report request                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT ... FROM pos_categories WHERE exclude_from_report_turnover = 1  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ExclusionSet { ids, names }  ──► Reconciler / hourly_sales             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The set is read fresh on every report; nothing is cached between calls,
//! so a flag change shows up in the next report.

use std::collections::BTreeSet;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use zreport_core::validation::validate_category_name;
use zreport_core::{Category, ExclusionSet};

/// Repository for category database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CategoryRepository::new(pool);
///
/// let lotto = repo.create("Lotto").await?;
/// repo.set_excluded(&lotto.id, true).await?;
///
/// let excluded = repo.exclusion_set().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Creates a category, not excluded.
    ///
    /// ## Returns
    /// * `Ok(Category)` - The stored category with its generated id
    /// * `Err(DbError::Core)` - Name is blank or too long
    pub async fn create(&self, name: &str) -> DbResult<Category> {
        let name = validate_category_name(name)?;
        let now = Utc::now();

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name,
            exclude_from_report_turnover: false,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO pos_categories (
                id, name, exclude_from_report_turnover, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.exclude_from_report_turnover)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets a category by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Category))` - Category found
    /// * `Ok(None)` - Category not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, exclude_from_report_turnover, created_at, updated_at
            FROM pos_categories
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists every category, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, exclude_from_report_turnover, created_at, updated_at
            FROM pos_categories
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Renames a category. Its exclusion flag is untouched.
    ///
    /// ## Returns
    /// * `Ok(())` - Rename successful
    /// * `Err(DbError::NotFound)` - Category doesn't exist
    pub async fn rename(&self, id: &str, name: &str) -> DbResult<()> {
        let name = validate_category_name(name)?;

        debug!(id = %id, name = %name, "Renaming category");

        let result = sqlx::query(
            r#"
            UPDATE pos_categories SET name = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Sets or clears `exclude_from_report_turnover`.
    ///
    /// Only this flag changes; the category keeps its name and id.
    /// Reports generated after this call see the new value.
    ///
    /// ## Returns
    /// * `Ok(())` - Flag stored
    /// * `Err(DbError::NotFound)` - Category doesn't exist
    pub async fn set_excluded(&self, id: &str, excluded: bool) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE pos_categories SET exclude_from_report_turnover = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(excluded)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        info!(id = %id, excluded, "Category report exclusion updated");
        Ok(())
    }

    /// Lists the categories flagged as excluded, sorted by name.
    pub async fn list_excluded(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, exclude_from_report_turnover, created_at, updated_at
            FROM pos_categories
            WHERE exclude_from_report_turnover = 1
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Names of the excluded categories, deduplicated.
    ///
    /// Empty when nothing is flagged; that is not an error.
    pub async fn list_excluded_names(&self) -> DbResult<BTreeSet<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT name FROM pos_categories
            WHERE exclude_from_report_turnover = 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(names.into_iter().collect())
    }

    /// The exclusion set for one report, keyed by id with names as fallback.
    pub async fn exclusion_set(&self) -> DbResult<ExclusionSet> {
        let excluded = self.list_excluded().await?;
        debug!(count = excluded.len(), "Loaded excluded categories");
        Ok(ExclusionSet::from_categories(&excluded))
    }

    /// Counts all categories.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pos_categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
