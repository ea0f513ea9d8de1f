//! Recurring-Charge Detector
//!
//! Finds the same charge (same description, same amount) showing up
//! repeatedly within the look-back window and proposes flagging it as a
//! recurring transaction.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;
use crate::models::Transaction;

use super::engine::{AnalysisContext, Detector};
use super::types::{Confidence, InsightType, NewInsight, RecurringData};

/// Grouping key for descriptions: trimmed and lower-cased
pub fn normalize_description(description: &str) -> String {
    description.trim().to_lowercase()
}

/// Detector for repeated identical charges
pub struct RecurringDetector;

impl RecurringDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RecurringDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Same-charge occurrences, in date order
struct ChargeGroup<'a> {
    key: String,
    occurrences: Vec<&'a Transaction>,
}

fn group_charges(expenses: &[Transaction]) -> Vec<ChargeGroup<'_>> {
    let mut groups: Vec<ChargeGroup> = Vec::new();
    let mut index: HashMap<(String, u64), usize> = HashMap::new();

    for tx in expenses.iter().filter(|tx| !tx.is_recurring) {
        let Some(description) = tx.description.as_deref() else {
            continue;
        };
        let key = normalize_description(description);
        if key.is_empty() {
            continue;
        }

        // amounts must match exactly
        let slot = *index
            .entry((key.clone(), tx.amount.to_bits()))
            .or_insert_with(|| {
                groups.push(ChargeGroup {
                    key,
                    occurrences: Vec::new(),
                });
                groups.len() - 1
            });
        groups[slot].occurrences.push(tx);
    }

    groups
}

#[async_trait]
impl Detector for RecurringDetector {
    fn id(&self) -> InsightType {
        InsightType::RecurringTransaction
    }

    fn name(&self) -> &'static str {
        "Recurring Charge"
    }

    async fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<NewInsight>> {
        let window_start = ctx.months_ago(ctx.config.recurring_window_months);
        let expenses = ctx
            .db
            .list_expenses_between(ctx.user_id, window_start, ctx.window_end())?;

        let frequency = ctx.config.default_frequency;
        let mut candidates = Vec::new();

        for group in group_charges(&expenses) {
            if group.occurrences.len() < ctx.config.recurring_min_occurrences {
                continue;
            }

            // expenses arrive oldest first
            let first = group.occurrences[0];
            let description = first.description.clone().unwrap_or_default();
            debug!(
                charge = %group.key,
                amount = first.amount,
                count = group.occurrences.len(),
                "Repeated charge found"
            );

            let data = RecurringData {
                description: description.clone(),
                amount: first.amount,
                category: first.category.clone(),
                frequency,
            };
            let insight = NewInsight::new(
                ctx.user_id,
                InsightType::RecurringTransaction,
                group.key,
                "Recurring charge detected",
                format!(
                    "\"{}\" was charged {:.2} {} times recently. Mark it as a {} recurring transaction?",
                    description,
                    first.amount,
                    group.occurrences.len(),
                    frequency
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsightConfig;
    use crate::db::Database;
    use crate::insights::{InsightEngine, InsightStatus};
    use crate::models::{Frequency, NewTransaction, DEFAULT_CURRENCY};
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn at(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, m, d, 9, 30, 0).unwrap()
    }

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let user_id = db.upsert_user("asha", DEFAULT_CURRENCY).unwrap();
        (db, user_id)
    }

    fn charge(db: &Database, user_id: i64, description: &str, amount: f64, date: DateTime<Utc>) {
        db.insert_transaction(
            user_id,
            &NewTransaction::expense(amount, description, date).with_category("Entertainment"),
        )
        .unwrap();
    }

    async fn analyze(db: &Database, user_id: i64) -> Vec<NewInsight> {
        let config = InsightConfig::default();
        let ctx = AnalysisContext::new(db, user_id, now(), &config);
        RecurringDetector::new().analyze(&ctx).await.unwrap()
    }

    #[test]
    fn test_normalize_description() {
        assert_eq!(normalize_description("  Netflix "), "netflix");
        assert_eq!(normalize_description("NETFLIX"), "netflix");
    }

    #[tokio::test]
    async fn test_three_identical_charges() {
        let (db, user_id) = setup();
        for month in [8, 9, 10] {
            charge(&db, user_id, "Netflix", 499.0, at(month, 5));
        }

        let found = analyze(&db, user_id).await;
        assert_eq!(found.len(), 1);

        let insight = &found[0];
        assert_eq!(insight.discriminator, "netflix");
        assert_eq!(insight.confidence, Confidence::High);

        let data: RecurringData = serde_json::from_value(insight.data.clone()).unwrap();
        assert_eq!(
            data,
            RecurringData {
                description: "Netflix".to_string(),
                amount: 499.0,
                category: Some("Entertainment".to_string()),
                frequency: Frequency::Monthly,
            }
        );
        assert_eq!(insight.data["frequency"], "monthly");
    }

    #[tokio::test]
    async fn test_two_charges_are_not_enough() {
        let (db, user_id) = setup();
        charge(&db, user_id, "Netflix", 499.0, at(9, 5));
        charge(&db, user_id, "Netflix", 499.0, at(10, 5));

        assert!(analyze(&db, user_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_grouping_ignores_case_and_whitespace() {
        let (db, user_id) = setup();
        charge(&db, user_id, "Netflix", 499.0, at(8, 5));
        charge(&db, user_id, "NETFLIX ", 499.0, at(9, 5));
        charge(&db, user_id, " netflix", 499.0, at(10, 5));

        let found = analyze(&db, user_id).await;
        assert_eq!(found.len(), 1);
        // earliest occurrence is the representative
        assert_eq!(found[0].data["description"], "Netflix");
    }

    #[tokio::test]
    async fn test_different_amounts_do_not_group() {
        let (db, user_id) = setup();
        charge(&db, user_id, "Netflix", 499.0, at(8, 5));
        charge(&db, user_id, "Netflix", 649.0, at(9, 5));
        charge(&db, user_id, "Netflix", 499.0, at(10, 5));

        assert!(analyze(&db, user_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_charges_outside_window_ignored() {
        let (db, user_id) = setup();
        charge(&db, user_id, "Gym", 1500.0, at(6, 1));
        charge(&db, user_id, "Gym", 1500.0, at(9, 1));
        charge(&db, user_id, "Gym", 1500.0, at(10, 1));

        assert!(analyze(&db, user_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_charges_after_now_ignored() {
        let (db, user_id) = setup();
        charge(&db, user_id, "Spotify", 119.0, at(9, 28));
        charge(&db, user_id, "Spotify", 119.0, at(10, 28));
        charge(&db, user_id, "Spotify", 119.0, at(11, 28));

        assert!(analyze(&db, user_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_flagged_and_undescribed_charges_skipped() {
        let (db, user_id) = setup();
        for month in [8, 9, 10] {
            db.insert_transaction(
                user_id,
                &NewTransaction::expense(15000.0, "Rent", at(month, 1)).recurring(Frequency::Monthly),
            )
            .unwrap();

            let mut blank = NewTransaction::expense(99.0, "", at(month, 2));
            blank.description = None;
            db.insert_transaction(user_id, &blank).unwrap();
        }

        assert!(analyze(&db, user_id).await.is_empty());
    }

    #[tokio::test]
    async fn test_approved_recurring_blocks_new_insight() {
        let (db, user_id) = setup();
        for month in [8, 9, 10] {
            charge(&db, user_id, "Spotify", 119.0, at(month, 12));
        }

        let config = InsightConfig::default();
        let ctx = AnalysisContext::new(&db, user_id, now(), &config);
        let engine = InsightEngine::new();

        assert_eq!(engine.run(&ctx).await.unwrap().recurring, 1);

        let pending = db
            .list_insights(user_id, Some(InsightStatus::Pending))
            .unwrap();
        db.set_insight_status(pending[0].id, InsightStatus::Approved)
            .unwrap();

        assert_eq!(engine.run(&ctx).await.unwrap().recurring, 0);
    }
}
