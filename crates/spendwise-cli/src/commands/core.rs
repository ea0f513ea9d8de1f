//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `resolve_user` - Look up the acting user by name
//! - `load_config` - Resolve the engine config
//! - `parse_as_of` - Parse an `--as-of` date
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use spendwise_core::{config::EngineConfig, db::Database};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Id of the user with this name
pub fn resolve_user(db: &Database, name: &str) -> Result<i64> {
    let user = db
        .find_user_by_name(name)?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "User '{}' not found. Create it with: spendwise users add {}",
                name,
                name
            )
        })?;
    Ok(user.id)
}

/// Engine config from --config, the data-dir override, or built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load(path).context("Failed to load engine config")
}

/// Clock for commands that accept `--as-of YYYY-MM-DD`
///
/// A given date means the end of that day, so everything logged on it counts.
pub fn parse_as_of(as_of: Option<&str>) -> Result<DateTime<Utc>> {
    let Some(s) = as_of else {
        return Ok(Utc::now());
    };

    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid --as-of date '{}', expected YYYY-MM-DD", s))?;
    let end_of_day = date
        .and_hms_opt(23, 59, 59)
        .with_context(|| format!("Invalid --as-of date '{}'", s))?;
    Ok(end_of_day.and_utc())
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool, user: &str, currency: &str) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    let user_id = db
        .upsert_user(user, currency)
        .context("Failed to create default user")?;
    println!("   User '{}' ready (id {})", user, user_id);

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: spendwise tx import --file history.csv");
    println!("  2. Set a budget: spendwise budgets set 20000");
    println!("  3. Get insights: spendwise insights run");

    Ok(())
}
