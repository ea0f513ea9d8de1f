//! Badge and streak command implementations

use anyhow::{Context, Result};
use spendwise_core::badges::{builtin_registry, BadgeEvaluator};
use spendwise_core::config::EngineConfig;
use spendwise_core::db::Database;
use spendwise_core::streak;

use super::parse_as_of;

pub fn cmd_badges_evaluate(
    db: &Database,
    user_id: i64,
    config: &EngineConfig,
    as_of: Option<&str>,
) -> Result<()> {
    let now = parse_as_of(as_of)?;
    let registry = builtin_registry();

    let unlocked = BadgeEvaluator::with_config(registry, &config.badges)
        .evaluate(db, user_id, now)
        .context("Badge evaluation failed")?;

    if unlocked.is_empty() {
        println!("No new badges this time");
        return Ok(());
    }

    println!("🏆 New badges unlocked!");
    for id in &unlocked {
        match registry.get(id) {
            Some(badge) => println!("   {} {} - {}", badge.icon, badge.name, badge.description),
            None => println!("   {}", id),
        }
    }
    Ok(())
}

pub fn cmd_badges_list(db: &Database, user_id: i64, json: bool) -> Result<()> {
    let unlocks = db.list_badge_unlocks(user_id)?;
    let registry = builtin_registry();

    if json {
        println!("{}", serde_json::to_string_pretty(&unlocks)?);
        return Ok(());
    }

    if unlocks.is_empty() {
        println!("No badges yet. Check for new ones with:");
        println!("  spendwise badges evaluate");
        return Ok(());
    }

    println!();
    println!("🏆 Badges ({}/{})", unlocks.len(), registry.len());
    println!("   ─────────────────────────────────────");
    for unlock in unlocks {
        let (icon, name) = registry
            .get(&unlock.badge_id)
            .map(|b| (b.icon, b.name))
            .unwrap_or(("❔", unlock.badge_id.as_str()));
        println!(
            "   {} {:<24} {}",
            icon,
            name,
            unlock.unlocked_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

pub fn cmd_badges_catalog() -> Result<()> {
    let registry = builtin_registry();

    println!();
    println!("📖 Badge Catalog ({} badges)", registry.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for badge in registry.badges() {
        println!(
            "   {} {:<24} [{}] {}",
            badge.icon, badge.name, badge.category, badge.description
        );
    }
    Ok(())
}

pub fn cmd_streak(db: &Database, user_id: i64, as_of: Option<&str>) -> Result<()> {
    let dates: Vec<_> = db
        .list_transactions(user_id)?
        .iter()
        .filter(|tx| tx.is_expense())
        .map(|tx| tx.day())
        .collect();

    let current = match as_of {
        Some(_) => streak::compute_streak(&dates, parse_as_of(as_of)?.date_naive()),
        None => streak::current_streak(&dates),
    };

    match current {
        0 => println!("No active streak. Log an expense today to start one!"),
        1 => println!("🔥 1 day streak"),
        n => println!("🔥 {} day streak", n),
    }
    Ok(())
}
