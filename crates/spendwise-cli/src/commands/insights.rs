//! Insight command implementations

use anyhow::{Context, Result};
use spendwise_core::config::EngineConfig;
use spendwise_core::db::Database;
use spendwise_core::insights::{
    apply_insight, reject_insight, run_insight_engine_at, Insight, InsightEffect, InsightStatus,
    InsightType,
};

use super::{parse_as_of, truncate};

pub async fn cmd_insights_run(
    db: &Database,
    user_id: i64,
    config: &EngineConfig,
    as_of: Option<&str>,
) -> Result<()> {
    let now = parse_as_of(as_of)?;

    println!("🔍 Analyzing transactions...");
    let summary = run_insight_engine_at(db, user_id, now, &config.insights)
        .await
        .context("Insight run failed")?;

    println!();
    println!("   Budget alerts:       {}", summary.alerts);
    println!("   Recurring charges:   {}", summary.recurring);
    println!("   Budget suggestions:  {}", summary.budget_adjustments);
    println!("   ─────────────────────────────────────");

    if summary.total() == 0 {
        println!("✅ Nothing new to report");
    } else {
        println!("✨ {} new insight(s). Review with: spendwise insights list", summary.total());
    }
    Ok(())
}

pub fn cmd_insights_list(
    db: &Database,
    user_id: i64,
    status: Option<&str>,
    json: bool,
) -> Result<()> {
    let status = match status {
        Some("all") => None,
        Some(s) => Some(
            s.parse::<InsightStatus>()
                .map_err(|e| anyhow::anyhow!(e))?,
        ),
        None => Some(InsightStatus::Pending),
    };

    let insights = db.list_insights(user_id, status)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    if insights.is_empty() {
        println!("No insights. Generate some with:");
        println!("  spendwise insights run");
        return Ok(());
    }

    println!();
    println!("💡 Insights");
    println!("   ─────────────────────────────────────────────────────────────");
    for insight in &insights {
        print_insight(insight);
    }
    Ok(())
}

fn print_insight(insight: &Insight) {
    let icon = match insight.insight_type {
        InsightType::Alert => "🚨",
        InsightType::RecurringTransaction => "🔁",
        InsightType::BudgetAdjust => "📊",
    };
    println!(
        "   [{}] {} {} ({}, {})",
        insight.id, icon, insight.title, insight.confidence, insight.status
    );
    println!("       {}", truncate(&insight.message, 90));
}

/// An insight of this user, or an error naming the id
fn owned_insight(db: &Database, user_id: i64, id: i64) -> Result<Insight> {
    db.get_insight(id)?
        .filter(|insight| insight.user_id == user_id)
        .ok_or_else(|| anyhow::anyhow!("Insight {} not found", id))
}

pub fn cmd_insights_approve(db: &Database, user_id: i64, id: i64) -> Result<()> {
    let insight = owned_insight(db, user_id, id)?;

    let effect = apply_insight(db, insight.id)
        .with_context(|| format!("Failed to approve insight {}", id))?;

    println!("✓ Approved: {}", insight.title);
    match effect {
        InsightEffect::Acknowledged => {}
        InsightEffect::MarkedRecurring { transactions } => {
            println!("   Marked {} transaction(s) as recurring", transactions);
        }
        InsightEffect::BudgetSet {
            category,
            month,
            amount,
        } => {
            println!("   {} budget for {} set to {:.2}", category, month, amount);
        }
    }
    Ok(())
}

pub fn cmd_insights_reject(db: &Database, user_id: i64, id: i64) -> Result<()> {
    let insight = owned_insight(db, user_id, id)?;

    reject_insight(db, insight.id)
        .with_context(|| format!("Failed to reject insight {}", id))?;

    println!("✓ Rejected: {}", insight.title);
    Ok(())
}
