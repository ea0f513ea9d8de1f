//! Acting on insights
//!
//! Approving an insight applies what it proposes; rejecting it frees the
//! slot so the detector may raise it again later.

use serde::Serialize;
use tracing::info;

use crate::db::{flag_recurring, write_budget, Database};
use crate::error::{Error, Result};

use super::recurring::normalize_description;
use super::types::{BudgetAdjustData, Insight, InsightStatus, InsightType, RecurringData};

/// What approving an insight changed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum InsightEffect {
    /// Alerts only need acknowledging
    Acknowledged,
    /// Number of transactions flagged recurring
    MarkedRecurring { transactions: usize },
    /// Category budget written for the month
    BudgetSet {
        category: String,
        month: String,
        amount: f64,
    },
}

fn load_pending(db: &Database, id: i64) -> Result<Insight> {
    let insight = db
        .get_insight(id)?
        .ok_or_else(|| Error::NotFound(format!("insight {}", id)))?;

    if insight.status != InsightStatus::Pending {
        return Err(Error::InvalidData(format!(
            "insight {} is already {}",
            id, insight.status
        )));
    }
    Ok(insight)
}

/// Approve a pending insight and apply its proposal
///
/// The proposal and the status change commit together, or not at all.
pub fn apply_insight(db: &Database, id: i64) -> Result<InsightEffect> {
    let insight = load_pending(db, id)?;

    let effect = match insight.insight_type {
        InsightType::Alert => {
            db.resolve_insight(id, InsightStatus::Approved, |_| Ok(()))?;
            InsightEffect::Acknowledged
        }

        InsightType::RecurringTransaction => {
            let data: RecurringData = serde_json::from_value(insight.data.clone())?;
            let key = normalize_description(&data.description);

            let ids: Vec<i64> = db
                .list_transactions(insight.user_id)?
                .into_iter()
                .filter(|tx| tx.is_expense() && !tx.is_recurring && tx.amount == data.amount)
                .filter(|tx| {
                    tx.description
                        .as_deref()
                        .is_some_and(|d| normalize_description(d) == key)
                })
                .map(|tx| tx.id)
                .collect();

            let transactions = db.resolve_insight(id, InsightStatus::Approved, |conn| {
                flag_recurring(conn, &ids, data.frequency)
            })?;
            InsightEffect::MarkedRecurring { transactions }
        }

        InsightType::BudgetAdjust => {
            let data: BudgetAdjustData = serde_json::from_value(insight.data.clone())?;
            db.resolve_insight(id, InsightStatus::Approved, |conn| {
                write_budget(
                    conn,
                    insight.user_id,
                    &data.month,
                    Some(&data.category),
                    data.new_limit,
                )
            })?;
            InsightEffect::BudgetSet {
                category: data.category,
                month: data.month,
                amount: data.new_limit,
            }
        }
    };

    info!(id, insight_type = %insight.insight_type, ?effect, "Insight approved");
    Ok(effect)
}

/// Reject a pending insight
pub fn reject_insight(db: &Database, id: i64) -> Result<()> {
    let insight = load_pending(db, id)?;
    db.resolve_insight(id, InsightStatus::Rejected, |_| Ok(()))?;
    info!(id, insight_type = %insight.insight_type, "Insight rejected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsightConfig;
    use crate::insights::{run_insight_engine_at, Confidence, NewInsight};
    use crate::models::{Frequency, NewTransaction, DEFAULT_CURRENCY};
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn at(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, m, d, 9, 0, 0).unwrap()
    }

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let user_id = db.upsert_user("asha", DEFAULT_CURRENCY).unwrap();
        (db, user_id)
    }

    fn pending_id(db: &Database, user_id: i64, insight_type: InsightType) -> i64 {
        db.list_insights(user_id, Some(InsightStatus::Pending))
            .unwrap()
            .into_iter()
            .find(|i| i.insight_type == insight_type)
            .map(|i| i.id)
            .unwrap()
    }

    #[tokio::test]
    async fn test_apply_recurring_flags_matching_charges() {
        let (db, user_id) = setup();
        for month in [8, 9, 10] {
            db.insert_transaction(user_id, &NewTransaction::expense(499.0, "Netflix", at(month, 5)))
                .unwrap();
        }
        // same merchant, different amount: left alone
        db.insert_transaction(user_id, &NewTransaction::expense(199.0, "Netflix", at(10, 6)))
            .unwrap();

        let config = InsightConfig::default();
        run_insight_engine_at(&db, user_id, now(), &config).await.unwrap();

        let id = pending_id(&db, user_id, InsightType::RecurringTransaction);
        let effect = apply_insight(&db, id).unwrap();
        assert_eq!(effect, InsightEffect::MarkedRecurring { transactions: 3 });

        let transactions = db.list_transactions(user_id).unwrap();
        let flagged: Vec<_> = transactions.iter().filter(|t| t.is_recurring).collect();
        assert_eq!(flagged.len(), 3);
        assert!(flagged
            .iter()
            .all(|t| t.frequency == Some(Frequency::Monthly) && t.amount == 499.0));

        assert_eq!(
            db.get_insight(id).unwrap().unwrap().status,
            InsightStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_apply_budget_adjust_sets_budget() {
        let (db, user_id) = setup();
        for day in [3, 10, 17, 24] {
            db.insert_transaction(
                user_id,
                &NewTransaction::expense(400.0 + day as f64, "Zomato", at(9, day))
                    .with_category("Food"),
            )
            .unwrap();
        }

        let config = InsightConfig::default();
        run_insight_engine_at(&db, user_id, now(), &config).await.unwrap();

        let id = pending_id(&db, user_id, InsightType::BudgetAdjust);
        let effect = apply_insight(&db, id).unwrap();

        // (403 + 410 + 417 + 424) * 0.9 = 1488.6
        assert_eq!(
            effect,
            InsightEffect::BudgetSet {
                category: "Food".to_string(),
                month: "2026-10".to_string(),
                amount: 1489.0,
            }
        );

        let budgets = db.list_budgets_for_month(user_id, "2026-10").unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, 1489.0);
        assert_eq!(budgets[0].category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_apply_alert_only_acknowledges() {
        let (db, user_id) = setup();
        let id = db
            .create_insight_if_absent(&NewInsight::new(
                user_id,
                InsightType::Alert,
                "Food",
                "Budget alert",
                "You have used 92% of your Food budget",
                Confidence::High,
            ))
            .unwrap()
            .unwrap();

        assert_eq!(apply_insight(&db, id).unwrap(), InsightEffect::Acknowledged);
        assert!(matches!(
            apply_insight(&db, id),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_failed_budget_write_leaves_insight_pending() {
        let (db, user_id) = setup();
        let data = BudgetAdjustData {
            category: "Food".to_string(),
            new_limit: 1800.0,
            month: "next month".to_string(),
            merchant: "Zomato".to_string(),
        };
        let id = db
            .create_insight_if_absent(
                &NewInsight::new(
                    user_id,
                    InsightType::BudgetAdjust,
                    "Food",
                    "Budget suggestion",
                    "Set a Food budget of 1800?",
                    Confidence::Medium,
                )
                .with_data(serde_json::to_value(&data).unwrap()),
            )
            .unwrap()
            .unwrap();

        assert!(matches!(apply_insight(&db, id), Err(Error::InvalidData(_))));
        assert_eq!(
            db.get_insight(id).unwrap().unwrap().status,
            InsightStatus::Pending
        );
        assert!(db.list_budgets(user_id).unwrap().is_empty());
    }

    #[test]
    fn test_reject_and_missing() {
        let (db, user_id) = setup();
        let id = db
            .create_insight_if_absent(&NewInsight::new(
                user_id,
                InsightType::Alert,
                "*",
                "Budget alert",
                "You have used 90% of your monthly budget",
                Confidence::High,
            ))
            .unwrap()
            .unwrap();

        reject_insight(&db, id).unwrap();
        assert_eq!(
            db.get_insight(id).unwrap().unwrap().status,
            InsightStatus::Rejected
        );
        assert!(matches!(reject_insight(&db, id), Err(Error::InvalidData(_))));
        assert!(matches!(reject_insight(&db, 999), Err(Error::NotFound(_))));
    }
}
