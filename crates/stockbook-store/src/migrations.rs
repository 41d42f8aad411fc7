//! # Store Migrations
//!
//! Embedded SQL migrations for the Stockbook store.
//!
//! ```text
//! migrations/sqlite/
//! ├── 001_initial_schema.sql  # products, kits, sales
//! └── 002_sale_metrics.sql    # derived metric columns (nullable)
//! ```
//!
//! Rows written before `002` keep NULL cost/profit/margin; the sale
//! repository recomputes them on load.
//!
//! **NEVER** modify an applied migration, always add a new one.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreResult;

/// Embedded migrations from the `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending migrations. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)`, for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> StoreResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
