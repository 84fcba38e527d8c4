//! # Database Migrations
//!
//! The schema lives in `migrations/sqlite/` and is compiled into the binary:
//!
//! ```text
//! 001_pos_categories.sql   categories + exclude_from_report_turnover flag
//! 002_orders.sql           products, product_categories, orders, lines
//! ```
//!
//! Applied versions are tracked by sqlx in `_sqlx_migrations`. Existing files
//! are never edited; schema changes go in a new `NNN_description.sql`.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far the database schema is behind the embedded migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub total: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.total
    }
}

/// Runs every pending migration, each in its own transaction.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = migration_status(pool).await?;
    if before.is_current() {
        debug!(applied = before.applied, "Schema is current");
        return Ok(());
    }

    MIGRATOR.run(pool).await?;

    info!(
        pending = before.total - before.applied,
        total = before.total,
        "Applied schema migrations"
    );
    Ok(())
}

/// Counts embedded and successfully applied migrations.
///
/// A database that was never migrated has no `_sqlx_migrations` table and
/// reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;

    let applied: i64 = if tracked > 0 {
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?
    } else {
        0
    };

    Ok(MigrationStatus {
        total: MIGRATOR.migrations.len(),
        applied: applied as usize,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
