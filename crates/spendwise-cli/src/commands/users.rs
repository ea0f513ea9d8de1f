//! User command implementations

use anyhow::{Context, Result};
use spendwise_core::db::Database;

pub fn cmd_users_add(db: &Database, name: &str, currency: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("User name cannot be empty");
    }

    let existed = db.find_user_by_name(name)?.is_some();
    let id = db
        .upsert_user(name, currency)
        .with_context(|| format!("Failed to add user '{}'", name))?;

    if existed {
        println!("User '{}' already exists (id {})", name, id);
    } else {
        println!("✓ Added user '{}' (id {})", name, id);
    }
    Ok(())
}

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Add one with:");
        println!("  spendwise users add <name>");
        return Ok(());
    }

    println!();
    println!("👤 Users");
    println!("   ─────────────────────────────────────");
    for user in users {
        println!(
            "   [{}] {:<20} {}",
            user.id, user.name, user.base_currency
        );
    }
    Ok(())
}
