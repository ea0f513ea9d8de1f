//! Overspend Detector
//!
//! Alerts when month-to-date spend reaches a share (90% by default) of one
//! of this month's budgets. Category budgets compare against that
//! category's expenses; a whole-month budget compares against all of them.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

use super::engine::{AnalysisContext, Detector};
use super::types::{AlertData, Confidence, InsightType, NewInsight};

/// Discriminator used for a whole-month budget
pub const WHOLE_BUDGET: &str = "*";

/// Detector for budgets about to be exceeded
pub struct OverspendDetector;

impl OverspendDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OverspendDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Detector for OverspendDetector {
    fn id(&self) -> InsightType {
        InsightType::Alert
    }

    fn name(&self) -> &'static str {
        "Overspend"
    }

    async fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<NewInsight>> {
        let budgets = ctx
            .db
            .list_budgets_for_month(ctx.user_id, &ctx.current_month())?;
        if budgets.is_empty() {
            return Ok(vec![]);
        }

        let expenses = ctx
            .db
            .list_expenses_between(ctx.user_id, ctx.month_start(), ctx.window_end())?;
        let ratio = ctx.config.overspend_ratio;

        let mut candidates = Vec::new();
        for budget in &budgets {
            let spent: f64 = match &budget.category {
                Some(category) => expenses
                    .iter()
                    .filter(|tx| tx.category.as_deref() == Some(category.as_str()))
                    .map(|tx| tx.amount)
                    .sum(),
                None => expenses.iter().map(|tx| tx.amount).sum(),
            };

            if spent < ratio * budget.amount {
                continue;
            }

            let percent = (spent / budget.amount * 100.0).round();
            let label = budget.category.as_deref().unwrap_or("monthly");
            debug!(
                budget = label,
                spent,
                limit = budget.amount,
                "Budget threshold reached"
            );

            let data = AlertData {
                category: budget.category.clone(),
                limit: budget.amount,
                current: spent,
            };
            let insight = NewInsight::new(
                ctx.user_id,
                InsightType::Alert,
                budget.category.as_deref().unwrap_or(WHOLE_BUDGET),
                "Budget alert",
                format!(
                    "You have used {}% of your {} budget ({:.2} of {:.2})",
                    percent, label, spent, budget.amount
                ),
                Confidence::High,
            )
            .with_data(serde_json::to_value(&data)?)
            .created_at(ctx.now);

            candidates.push(insight);
        }

        Ok(candidates)
    }
}
