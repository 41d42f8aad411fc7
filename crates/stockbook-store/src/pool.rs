//! # Store Pool Management
//!
//! Configuration and connection handling for the SQLite store file.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Opening the Store                              │
//! │                                                                         │
//! │  StoreConfig::from_env() ← STOCKBOOK_DB_PATH or platform data dir      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store::open(config).await                                             │
//! │       │                                                                 │
//! │       ├── connect (WAL, NORMAL sync) + run migrations                  │
//! │       │                                                                 │
//! │       ├── ok ─────────────────────────────────────► Store              │
//! │       │                                                                 │
//! │       └── file is corrupt?                                             │
//! │              │  recreate_if_corrupt                                     │
//! │              ▼                                                          │
//! │           warn!, delete db + -wal + -shm, connect again ──► Store      │
//! │           (fresh, empty, schema-valid)                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use directories::ProjectDirs;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::kit::KitRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::Table;
use stockbook_core::{Catalog, SalesJournal, StockLedger};

/// Environment variable overriding the store file location.
pub const DB_PATH_ENV: &str = "STOCKBOOK_DB_PATH";

/// File name used inside the platform data directory.
pub const DEFAULT_DB_FILE: &str = "stockbook.db";

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("./data/stockbook.db")
///     .max_connections(2)
///     .recreate_if_corrupt(false);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite file. Created if it doesn't exist.
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Default: true
    pub run_migrations: bool,

    /// Replace an unreadable store file with an empty one instead of
    /// failing. Default: true
    pub recreate_if_corrupt: bool,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
            recreate_if_corrupt: true,
        }
    }

    /// Configuration from the environment.
    ///
    /// Uses `STOCKBOOK_DB_PATH` when set and non-empty, otherwise
    /// `stockbook.db` in the platform data directory (created if needed).
    pub fn from_env() -> StoreResult<Self> {
        match std::env::var(DB_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                debug!(path = %path, "Store path taken from {}", DB_PATH_ENV);
                Ok(StoreConfig::new(path))
            }
            _ => Ok(StoreConfig::new(default_database_path()?)),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn recreate_if_corrupt(mut self, recreate: bool) -> Self {
        self.recreate_if_corrupt = recreate;
        self
    }

    /// An isolated in-memory store (for testing).
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
            recreate_if_corrupt: false,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> StoreResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            return SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()));
        }

        let connect_url = format!("sqlite://{}?mode=rwc", self.database_path.display());

        let options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        Ok(options)
    }
}

/// `stockbook.db` inside the platform data directory.
///
/// ```text
/// Linux:   ~/.local/share/stockbook/stockbook.db
/// macOS:   ~/Library/Application Support/com.stockbook.stockbook/stockbook.db
/// Windows: %APPDATA%\stockbook\stockbook\data\stockbook.db
/// ```
pub fn default_database_path() -> StoreResult<PathBuf> {
    let dirs = ProjectDirs::from("com", "stockbook", "stockbook")
        .ok_or_else(|| StoreError::Internal("no home directory to place the store in".into()))?;

    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join(DEFAULT_DB_FILE))
}

// =============================================================================
// Store
// =============================================================================

/// Handle on an open store file.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    path: PathBuf,
}

impl Store {
    /// Opens (or creates) the store and brings its schema up to date.
    ///
    /// ## Errors
    /// - `Corrupt` when the file is unreadable and `recreate_if_corrupt` is off
    /// - `ConnectionFailed` / `MigrationFailed` otherwise
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening store"
        );

        match Store::connect(&config).await {
            Err(err) if err.is_corrupt() && config.recreate_if_corrupt && !config.is_in_memory() => {
                warn!(
                    path = %config.database_path.display(),
                    error = %err,
                    "Store file is unreadable, replacing it with an empty store"
                );
                remove_store_files(&config.database_path)?;
                Store::connect(&config).await
            }
            other => other,
        }
    }

    async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        if !config.is_in_memory() {
            if let Some(parent) = config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| match StoreError::from(e) {
                StoreError::Corrupt(msg) => StoreError::Corrupt(msg),
                other => StoreError::ConnectionFailed(other.to_string()),
            })?;

        info!(max_connections = config.max_connections, "Store pool created");

        let store = Store {
            pool,
            path: config.database_path.clone(),
        };

        if config.run_migrations {
            if let Err(err) = store.run_migrations().await {
                store.pool.close().await;
                return Err(err);
            }
        }

        Ok(store)
    }

    /// Applies pending migrations. Called by `open` unless disabled.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub async fn migration_status(&self) -> StoreResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// For queries not covered by repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn kits(&self) -> KitRepository {
        KitRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Reads all three tables into a fresh catalog.
    ///
    /// An empty store yields an empty catalog. Rows that break ledger
    /// rules (duplicate SKU, dangling kit component) fail with `InvalidRow`.
    pub async fn load_catalog(&self) -> StoreResult<Catalog> {
        let products = self.products().load_all().await?;
        let kits = self.kits().load_all().await?;

        let ledger = StockLedger::restore(products, kits)
            .map_err(|e| StoreError::invalid_row("catalog", e))?;
        let sales = self.sales().load_all(&ledger).await?;
        let journal = SalesJournal::restore(sales);

        info!(
            products = ledger.products().len(),
            kits = ledger.kits().len(),
            sales = journal.len(),
            "Catalog loaded"
        );
        Ok(Catalog::from_parts(ledger, journal))
    }

    /// Replaces the given tables with the catalog's contents, all in one
    /// transaction.
    pub async fn flush(&self, catalog: &Catalog, tables: &[Table]) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        for table in tables {
            match table {
                Table::Products => {
                    ProductRepository::replace_all(&mut tx, catalog.ledger().products()).await?
                }
                Table::Kits => KitRepository::replace_all(&mut tx, catalog.ledger().kits()).await?,
                Table::Sales => SaleRepository::replace_all(&mut tx, catalog.journal().sales()).await?,
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        debug!(tables = ?tables, "Store flushed");
        Ok(())
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing store");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// Deletes the store file and its WAL side files, ignoring missing ones.
fn remove_store_files(path: &Path) -> StoreResult<()> {
    let mut candidates = vec![path.to_path_buf()];
    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        candidates.push(PathBuf::from(side));
    }

    for candidate in candidates {
        match std::fs::remove_file(&candidate) {
            Ok(()) => debug!(path = %candidate.display(), "Removed store file"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();

        assert!(store.health_check().await);
        let (total, applied) = store.migration_status().await.unwrap();
        assert_eq!(total, applied);
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .recreate_if_corrupt(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.recreate_if_corrupt);
        assert!(!config.is_in_memory());
        assert!(StoreConfig::in_memory().is_in_memory());
    }

    #[test]
    fn test_remove_store_files_ignores_missing() {
        let path = std::env::temp_dir().join("stockbook-never-created.db");
        remove_store_files(&path).unwrap();
    }
}
