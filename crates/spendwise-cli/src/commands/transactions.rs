//! Transaction command implementations

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use spendwise_core::db::Database;
use spendwise_core::import::{import_csv, parse_timestamp};
use spendwise_core::models::{Frequency, NewTransaction, TransactionType};

use super::truncate;

/// Arguments of `tx add`
pub struct TxInput<'a> {
    pub amount: f64,
    pub description: &'a str,
    pub tx_type: &'a str,
    pub category: Option<&'a str>,
    pub currency: Option<&'a str>,
    pub date: Option<&'a str>,
    pub recurring: Option<&'a str>,
}

pub fn cmd_tx_add(db: &Database, user_id: i64, input: &TxInput<'_>) -> Result<()> {
    let tx_type: TransactionType = input
        .tx_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let date = match input.date {
        Some(s) => parse_timestamp(s).with_context(|| format!("Invalid date '{}'", s))?,
        None => Utc::now(),
    };

    let mut tx = match tx_type {
        TransactionType::Expense => NewTransaction::expense(input.amount, input.description, date),
        TransactionType::Income => NewTransaction::income(input.amount, input.description, date),
    };
    if let Some(category) = input.category {
        tx = tx.with_category(category);
    }
    if let Some(currency) = input.currency {
        tx = tx.with_currency(currency);
    }
    if let Some(freq) = input.recurring {
        let frequency: Frequency = freq.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        tx = tx.recurring(frequency);
    }

    let id = db
        .insert_transaction(user_id, &tx)
        .context("Failed to add transaction")?;
    println!(
        "✓ Added {} #{}: {:.2} {}",
        tx_type, id, input.amount, input.description
    );
    Ok(())
}

pub fn cmd_tx_list(db: &Database, user_id: i64, limit: i64) -> Result<()> {
    let transactions = db.list_recent_transactions(user_id, limit)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  spendwise tx import --file history.csv");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = if tx.is_expense() {
            format!("\x1b[31m-{:.2}\x1b[0m", tx.amount) // Red for expenses
        } else {
            format!("\x1b[32m+{:.2}\x1b[0m", tx.amount) // Green for income
        };
        let recurring = if tx.is_recurring { " 🔁" } else { "" };

        println!(
            "   [{}] {} │ {:>10} │ {:<30} │ {}{}",
            tx.id,
            tx.date.format("%Y-%m-%d %H:%M"),
            amount_str,
            truncate(tx.description.as_deref().unwrap_or("-"), 30),
            tx.category.as_deref().unwrap_or("-"),
            recurring
        );
    }

    Ok(())
}

pub fn cmd_tx_import(db: &Database, user_id: i64, file: &Path) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let reader =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let result = import_csv(db, user_id, reader).context("Import failed")?;

    println!("   Imported: {}", result.imported);
    if result.skipped > 0 {
        println!("   ⚠️  Skipped: {} (run with -v for details)", result.skipped);
    }
    println!("✅ Import complete");
    Ok(())
}
