//! Record store with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `users` - User records
//! - `transactions` - Transaction reads/writes and window queries
//! - `budgets` - Monthly budgets
//! - `insights` - Insight records and the atomic dedup insert
//! - `badges` - Per-user badge unlocks

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tempfile::TempDir;
use tracing::info;

use crate::error::{Error, Result};

mod badges;
mod budgets;
mod insights;
mod transactions;
mod users;

pub(crate) use budgets::write_budget;
pub(crate) use transactions::flag_recurring;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "SPENDWISE_DB_KEY";

/// Timestamp format used for every DATETIME column
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"spendwise-salt-1";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Format a timestamp for storage
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse a stored timestamp into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Backing directory of an `in_memory()` database, removed with the last clone
    _scratch: Option<Arc<TempDir>>,
}

impl Database {
    /// Open an encrypted database
    ///
    /// Requires the `SPENDWISE_DB_KEY` environment variable. Use
    /// `new_unencrypted()` for development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases.",
                DB_KEY_ENV
            ))),
        }
    }

    /// Open an unencrypted database
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open a database with an explicit encryption passphrase
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            _scratch: None,
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a file in a temporary directory rather than `:memory:` so every
    /// pooled connection sees the same data. The directory, WAL files
    /// included, is deleted when the last clone is dropped.
    pub fn in_memory() -> Result<Self> {
        let scratch = tempfile::Builder::new().prefix("spendwise_").tempdir()?;
        let path = scratch.path().join("spendwise.db");

        let mut db = Self::new_unencrypted(&path.to_string_lossy())?;
        db._scratch = Some(Arc::new(scratch));
        Ok(db)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                base_currency TEXT NOT NULL DEFAULT 'INR',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Amounts are always positive; type carries the direction
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount REAL NOT NULL CHECK (amount > 0),
                description TEXT,
                category TEXT,
                currency TEXT,
                date DATETIME NOT NULL,
                is_recurring BOOLEAN NOT NULL DEFAULT 0,
                frequency TEXT,                            -- daily, weekly, monthly, yearly
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);
            CREATE INDEX IF NOT EXISTS idx_transactions_user_type ON transactions(user_id, type);

            CREATE TABLE IF NOT EXISTS budgets (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                month TEXT NOT NULL,                       -- YYYY-MM
                amount REAL NOT NULL CHECK (amount > 0),
                category TEXT,                             -- NULL = whole-budget
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_budgets_user_month_category
                ON budgets(user_id, month, COALESCE(category, ''));

            -- Insights proposed by the detectors
            CREATE TABLE IF NOT EXISTS insights (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                type TEXT NOT NULL,                        -- alert, recurring_transaction, budget_adjust
                discriminator TEXT NOT NULL,               -- category or normalized description
                title TEXT NOT NULL,
                message TEXT NOT NULL,
                data TEXT NOT NULL,                        -- JSON payload
                confidence TEXT NOT NULL,                  -- low, medium, high
                status TEXT NOT NULL DEFAULT 'pending',    -- pending, approved, rejected
                created_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_insights_user_status ON insights(user_id, status);

            -- At most one open insight per (user, type, discriminator).
            -- Approved recurring insights stay open: the charge is already handled.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_insights_open
                ON insights(user_id, type, discriminator)
                WHERE status = 'pending'
                   OR (type = 'recurring_transaction' AND status = 'approved');

            -- Append-only badge unlocks
            CREATE TABLE IF NOT EXISTS badge_unlocks (
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                badge_id TEXT NOT NULL,
                unlocked_at DATETIME NOT NULL,
                PRIMARY KEY (user_id, badge_id)
            );
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
