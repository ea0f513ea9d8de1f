//! Habitual-Merchant Budget-Adjustment Detector
//!
//! Looks at last month's merchants. A merchant visited often enough gets a
//! proposed category budget for this month, set a little below what was
//! spent there.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;

use super::engine::{AnalysisContext, Detector};
use super::types::{BudgetAdjustData, Confidence, InsightType, NewInsight};

/// Detector for frequently visited merchants
pub struct BudgetAdjustDetector;

impl BudgetAdjustDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BudgetAdjustDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct MerchantSpend {
    merchant: String,
    count: usize,
    total: f64,
    category: Option<String>,
}

#[async_trait]
impl Detector for BudgetAdjustDetector {
    fn id(&self) -> InsightType {
        InsightType::BudgetAdjust
    }

    fn name(&self) -> &'static str {
        "Budget Adjustment"
    }

    async fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<NewInsight>> {
        let expenses = ctx.db.list_expenses_between(
            ctx.user_id,
            ctx.previous_month_start(),
            ctx.month_start(),
        )?;

        let mut merchants: Vec<MerchantSpend> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for tx in &expenses {
            let Some(description) = tx.description.as_deref() else {
                continue;
            };
            let slot = *index.entry(description).or_insert_with(|| {
                merchants.push(MerchantSpend {
                    merchant: description.to_string(),
                    count: 0,
                    total: 0.0,
                    category: None,
                });
                merchants.len() - 1
            });

            let spend = &mut merchants[slot];
            spend.count += 1;
            spend.total += tx.amount;
            if spend.category.is_none() {
                spend.category = tx.category.clone();
            }
        }

        let month = ctx.current_month();
        let mut candidates = Vec::new();

        for spend in merchants {
            if spend.count < ctx.config.habitual_min_occurrences {
                continue;
            }
            let Some(category) = spend.category else {
                debug!(merchant = %spend.merchant, "Habitual merchant has no category, skipping");
                continue;
            };

            let new_limit = (spend.total * ctx.config.budget_cut_ratio).round();
            debug!(
                merchant = %spend.merchant,
                count = spend.count,
                total = spend.total,
                new_limit,
                "Habitual merchant found"
            );

            let message = format!(
                "You spent {:.2} at {} across {} visits last month. Set your {} budget for {} to {:.0}?",
                spend.total, spend.merchant, spend.count, category, month, new_limit
            );
            let data = BudgetAdjustData {
                category: category.clone(),
                new_limit,
                month: month.clone(),
                merchant: spend.merchant,
            };

            let insight = NewInsight::new(
                ctx.user_id,
                InsightType::BudgetAdjust,
                category,
                "Budget suggestion",
                message,
                Confidence::Medium,
            )
            .with_data(serde_json::to_value(&data)?)
            .created_at(ctx.now);

            candidates.push(insight);
        }

        Ok(candidates)
    }
}
