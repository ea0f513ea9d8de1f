//! Budget command implementations

use anyhow::{Context, Result};
use chrono::Utc;
use spendwise_core::db::Database;
use spendwise_core::models::month_key;

pub fn cmd_budgets_set(
    db: &Database,
    user_id: i64,
    amount: f64,
    category: Option<&str>,
    month: Option<&str>,
) -> Result<()> {
    let month = month
        .map(String::from)
        .unwrap_or_else(|| month_key(Utc::now().date_naive()));

    db.set_budget(user_id, &month, category, amount)
        .context("Failed to set budget")?;

    println!(
        "✓ {} budget for {} set to {:.2}",
        category.unwrap_or("Monthly"),
        month,
        amount
    );
    Ok(())
}

pub fn cmd_budgets_list(db: &Database, user_id: i64, month: Option<&str>) -> Result<()> {
    let budgets = match month {
        Some(m) => db.list_budgets_for_month(user_id, m)?,
        None => db.list_budgets(user_id)?,
    };

    if budgets.is_empty() {
        println!("No budgets. Set one with:");
        println!("  spendwise budgets set 20000 [--category Food] [--month YYYY-MM]");
        return Ok(());
    }

    println!();
    println!("💰 Budgets");
    println!("   ─────────────────────────────────────");
    for budget in budgets {
        println!(
            "   {} │ {:<20} │ {:>10.2}",
            budget.month,
            budget.category.as_deref().unwrap_or("(whole month)"),
            budget.amount
        );
    }
    Ok(())
}
