//! Badge rule kinds
//!
//! Every badge condition is one of a small closed set of rule kinds with
//! typed parameters. [`BadgeRule::evaluate`] is the single dispatch point.
//! Malformed parameters or snapshot data produce [`Error::Rule`] rather
//! than a panic, so the evaluator can skip just that badge.

use chrono::{Datelike, Duration, Timelike, Weekday};
use regex::RegexBuilder;
use serde::Serialize;

use super::Snapshot;
use crate::error::{Error, Result};
use crate::models::{month_key, parse_month_key, Transaction, TransactionType};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeRule {
    /// Total transactions of any type
    TransactionCount { min: usize },
    /// Month-to-date income minus expense
    MonthlySavings { min: f64 },
    /// Consecutive days with an expense
    Streak { days: u32 },
    /// At least one budget exists
    HasBudget,
    /// Month-to-date expense below this month's whole-budget, checked only
    /// from `from_day` onward
    StayedUnderBudget { from_day: u32 },
    /// Expenses whose category or description mentions any keyword
    CategoryKeyword {
        keywords: &'static [&'static str],
        min_count: usize,
    },
    /// Any single expense of at least `min`
    SingleTransactionAmount { min: f64 },
    /// Expenses with UTC hour in `[start_hour, end_hour)`, wrapping midnight
    /// when `start_hour > end_hour`
    TimeOfDay {
        start_hour: u32,
        end_hour: u32,
        min_count: usize,
    },
    /// A transaction in a currency other than the user's base currency
    ForeignCurrency,
    /// A transaction flagged recurring
    HasRecurring,
    /// Expenses on a Saturday and the Sunday right after it
    WeekendCoverage,
}

impl BadgeRule {
    /// Short name of the rule kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TransactionCount { .. } => "transaction_count",
            Self::MonthlySavings { .. } => "monthly_savings",
            Self::Streak { .. } => "streak",
            Self::HasBudget => "has_budget",
            Self::StayedUnderBudget { .. } => "stayed_under_budget",
            Self::CategoryKeyword { .. } => "category_keyword",
            Self::SingleTransactionAmount { .. } => "single_transaction_amount",
            Self::TimeOfDay { .. } => "time_of_day",
            Self::ForeignCurrency => "foreign_currency",
            Self::HasRecurring => "has_recurring",
            Self::WeekendCoverage => "weekend_coverage",
        }
    }

    /// Whether the snapshot satisfies this rule
    pub fn evaluate(&self, snapshot: &Snapshot) -> Result<bool> {
        match self {
            Self::TransactionCount { min } => Ok(snapshot.transactions.len() >= *min),

            Self::MonthlySavings { min } => {
                check_threshold(*min)?;
                let mut savings = 0.0;
                for tx in snapshot.month_to_date() {
                    let amount = checked_amount(tx)?;
                    match tx.tx_type {
                        TransactionType::Income => savings += amount,
                        TransactionType::Expense => savings -= amount,
                    }
                }
                Ok(savings >= *min)
            }

            Self::Streak { days } => Ok(snapshot.streak() >= *days),

            Self::HasBudget => Ok(!snapshot.budgets.is_empty()),

            Self::StayedUnderBudget { from_day } => stayed_under_budget(snapshot, *from_day),

            Self::CategoryKeyword {
                keywords,
                min_count,
            } => keyword_matches(snapshot, keywords).map(|count| count >= *min_count),

            Self::SingleTransactionAmount { min } => {
                check_threshold(*min)?;
                for tx in snapshot.expenses() {
                    if checked_amount(tx)? >= *min {
                        return Ok(true);
                    }
                }
                Ok(false)
            }

            Self::TimeOfDay {
                start_hour,
                end_hour,
                min_count,
            } => {
                let in_window = hour_window(*start_hour, *end_hour)?;
                let count = snapshot
                    .expenses()
                    .filter(|tx| in_window(tx.date.hour()))
                    .count();
                Ok(count >= *min_count)
            }

            Self::ForeignCurrency => {
                let base = &snapshot.user.base_currency;
                Ok(snapshot.transactions.iter().any(|tx| {
                    tx.currency
                        .as_deref()
                        .is_some_and(|c| !c.eq_ignore_ascii_case(base))
                }))
            }

            Self::HasRecurring => Ok(snapshot.transactions.iter().any(|tx| tx.is_recurring)),

            Self::WeekendCoverage => {
                let days = snapshot.expense_days();
                Ok(days.iter().any(|day| {
                    day.weekday() == Weekday::Sat && days.contains(&(*day + Duration::days(1)))
                }))
            }
        }
    }
}

fn check_threshold(min: f64) -> Result<()> {
    if !min.is_finite() {
        return Err(Error::Rule(format!("threshold is not finite: {}", min)));
    }
    Ok(())
}

fn checked_amount(tx: &Transaction) -> Result<f64> {
    if !tx.amount.is_finite() {
        return Err(Error::Rule(format!(
            "transaction {} has a non-finite amount",
            tx.id
        )));
    }
    Ok(tx.amount)
}

fn stayed_under_budget(snapshot: &Snapshot, from_day: u32) -> Result<bool> {
    if !(1..=31).contains(&from_day) {
        return Err(Error::Rule(format!("from_day out of range: {}", from_day)));
    }
    if snapshot.today().day() < from_day {
        return Ok(false);
    }

    let current_month = month_key(snapshot.today());
    let mut whole_budget = None;
    for budget in snapshot.budgets.iter().filter(|b| b.category.is_none()) {
        if parse_month_key(&budget.month).is_none() {
            return Err(Error::Rule(format!(
                "budget {} has an unparsable month: {}",
                budget.id, budget.month
            )));
        }
        if budget.month == current_month {
            whole_budget = Some(budget);
        }
    }

    let Some(budget) = whole_budget else {
        return Ok(false);
    };

    let mut spent = 0.0;
    for tx in snapshot.month_to_date().filter(|tx| tx.is_expense()) {
        spent += checked_amount(tx)?;
    }
    Ok(spent < budget.amount)
}

fn keyword_matches(snapshot: &Snapshot, keywords: &[&str]) -> Result<usize> {
    if keywords.is_empty() {
        return Err(Error::Rule("keyword rule has no keywords".to_string()));
    }

    let pattern = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Rule(format!("bad keyword pattern: {}", e)))?;

    Ok(snapshot
        .expenses()
        .filter(|tx| {
            tx.category.as_deref().is_some_and(|c| re.is_match(c))
                || tx.description.as_deref().is_some_and(|d| re.is_match(d))
        })
        .count())
}

/// Membership test for an hour window, validated once
fn hour_window(start: u32, end: u32) -> Result<impl Fn(u32) -> bool> {
    if start > 23 || end > 23 {
        return Err(Error::Rule(format!(
            "hour window out of range: {}..{}",
            start, end
        )));
    }
    if start == end {
        return Err(Error::Rule(format!("empty hour window: {}..{}", start, end)));
    }

    Ok(move |hour: u32| {
        if start < end {
            hour >= start && hour < end
        } else {
            hour >= start || hour < end
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Budget, Frequency, User};
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        // a Monday
        Utc.with_ymd_and_hms(2026, 10, 26, 12, 0, 0).unwrap()
    }

    fn snapshot(transactions: Vec<Transaction>, budgets: Vec<Budget>) -> Snapshot {
        Snapshot {
            user: User {
                id: 1,
                name: "asha".to_string(),
                base_currency: "INR".to_string(),
                created_at: now(),
            },
            transactions,
            budgets,
            now: now(),
        }
    }

    fn tx(tx_type: TransactionType, amount: f64, date: DateTime<Utc>) -> Transaction {
        Transaction {
            id: 0,
            user_id: 1,
            tx_type,
            amount,
            description: None,
            category: None,
            currency: None,
            date,
            is_recurring: false,
            frequency: None,
            created_at: date,
        }
    }

    fn expense(amount: f64, date: DateTime<Utc>) -> Transaction {
        tx(TransactionType::Expense, amount, date)
    }

    fn income(amount: f64, date: DateTime<Utc>) -> Transaction {
        tx(TransactionType::Income, amount, date)
    }

    fn oct(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
    }

    fn budget(month: &str, category: Option<&str>, amount: f64) -> Budget {
        Budget {
            id: 1,
            user_id: 1,
            month: month.to_string(),
            amount,
            category: category.map(String::from),
        }
    }

    #[test]
    fn test_transaction_count_counts_all_types() {
        let snap = snapshot(vec![income(10.0, oct(1, 9)), expense(5.0, oct(2, 9))], vec![]);
        assert!(BadgeRule::TransactionCount { min: 2 }.evaluate(&snap).unwrap());
        assert!(!BadgeRule::TransactionCount { min: 3 }.evaluate(&snap).unwrap());
    }

    #[test]
    fn test_monthly_savings_boundary() {
        let rule = BadgeRule::MonthlySavings { min: 1000.0 };

        let exact = snapshot(vec![income(1500.0, oct(1, 9)), expense(500.0, oct(3, 9))], vec![]);
        assert!(rule.evaluate(&exact).unwrap());

        let short = snapshot(vec![income(1499.0, oct(1, 9)), expense(500.0, oct(3, 9))], vec![]);
        assert!(!rule.evaluate(&short).unwrap());
    }

    #[test]
    fn test_monthly_savings_ignores_previous_months() {
        let september = Utc.with_ymd_and_hms(2026, 9, 30, 9, 0, 0).unwrap();
        let snap = snapshot(vec![income(5000.0, september), income(200.0, oct(2, 9))], vec![]);
        assert!(!BadgeRule::MonthlySavings { min: 1000.0 }.evaluate(&snap).unwrap());
    }

    #[test]
    fn test_streak_rule() {
        let snap = snapshot(
            vec![
                expense(1.0, oct(26, 8)),
                expense(1.0, oct(25, 8)),
                expense(1.0, oct(24, 8)),
            ],
            vec![],
        );
        assert!(BadgeRule::Streak { days: 3 }.evaluate(&snap).unwrap());
        assert!(!BadgeRule::Streak { days: 7 }.evaluate(&snap).unwrap());
    }

    #[test]
    fn test_stayed_under_budget() {
        let rule = BadgeRule::StayedUnderBudget { from_day: 25 };

        let under = snapshot(
            vec![expense(900.0, oct(5, 9))],
            vec![budget("2026-10", None, 1000.0)],
        );
        assert!(rule.evaluate(&under).unwrap());

        let at_limit = snapshot(
            vec![expense(1000.0, oct(5, 9))],
            vec![budget("2026-10", None, 1000.0)],
        );
        assert!(!rule.evaluate(&at_limit).unwrap());

        // category budgets don't count
        let category_only = snapshot(vec![], vec![budget("2026-10", Some("Food"), 1000.0)]);
        assert!(!rule.evaluate(&category_only).unwrap());

        // last month's budget doesn't count
        let stale = snapshot(vec![], vec![budget("2026-09", None, 1000.0)]);
        assert!(!rule.evaluate(&stale).unwrap());
    }

    #[test]
    fn test_stayed_under_budget_waits_for_from_day() {
        let snap = snapshot(vec![], vec![budget("2026-10", None, 1000.0)]);
        assert!(!BadgeRule::StayedUnderBudget { from_day: 27 }
            .evaluate(&snap)
            .unwrap());
    }

    #[test]
    fn test_stayed_under_budget_bad_month_is_rule_error() {
        let snap = snapshot(vec![], vec![budget("October", None, 1000.0)]);
        assert!(matches!(
            BadgeRule::StayedUnderBudget { from_day: 25 }.evaluate(&snap),
            Err(Error::Rule(_))
        ));
    }

    #[test]
    fn test_category_keyword_matches_category_or_description() {
        let mut by_category = expense(300.0, oct(3, 13));
        by_category.category = Some("Food & Drinks".to_string());
        let mut by_description = expense(250.0, oct(4, 20));
        by_description.description = Some("ZOMATO order".to_string());
        let mut unrelated = expense(100.0, oct(4, 21));
        unrelated.description = Some("Metro card".to_string());

        let snap = snapshot(vec![by_category, by_description, unrelated], vec![]);
        let rule = BadgeRule::CategoryKeyword {
            keywords: &["food", "zomato"],
            min_count: 2,
        };
        assert!(rule.evaluate(&snap).unwrap());

        let stricter = BadgeRule::CategoryKeyword {
            keywords: &["food", "zomato"],
            min_count: 3,
        };
        assert!(!stricter.evaluate(&snap).unwrap());
    }

    #[test]
    fn test_category_keyword_escapes_metacharacters() {
        let mut tx = expense(10.0, oct(3, 13));
        tx.description = Some("c++ books".to_string());
        let snap = snapshot(vec![tx], vec![]);

        let rule = BadgeRule::CategoryKeyword {
            keywords: &["c++"],
            min_count: 1,
        };
        assert!(rule.evaluate(&snap).unwrap());
    }

    #[test]
    fn test_single_transaction_amount_ignores_income() {
        let snap = snapshot(vec![income(50000.0, oct(1, 9)), expense(9999.0, oct(2, 9))], vec![]);
        let rule = BadgeRule::SingleTransactionAmount { min: 10000.0 };
        assert!(!rule.evaluate(&snap).unwrap());

        let big = snapshot(vec![expense(10000.0, oct(2, 9))], vec![]);
        assert!(rule.evaluate(&big).unwrap());
    }

    #[test]
    fn test_time_of_day_window() {
        let snap = snapshot(
            vec![
                expense(1.0, oct(1, 0)),
                expense(1.0, oct(2, 4)),
                expense(1.0, oct(3, 5)),
                expense(1.0, oct(4, 23)),
            ],
            vec![],
        );

        let night = BadgeRule::TimeOfDay {
            start_hour: 0,
            end_hour: 5,
            min_count: 2,
        };
        assert!(night.evaluate(&snap).unwrap());

        let wrapping = BadgeRule::TimeOfDay {
            start_hour: 22,
            end_hour: 5,
            min_count: 3,
        };
        assert!(wrapping.evaluate(&snap).unwrap());

        let morning = BadgeRule::TimeOfDay {
            start_hour: 5,
            end_hour: 8,
            min_count: 2,
        };
        assert!(!morning.evaluate(&snap).unwrap());
    }

    #[test]
    fn test_time_of_day_rejects_bad_hours() {
        let snap = snapshot(vec![], vec![]);
        let rule = BadgeRule::TimeOfDay {
            start_hour: 25,
            end_hour: 5,
            min_count: 1,
        };
        assert!(matches!(rule.evaluate(&snap), Err(Error::Rule(_))));

        let empty = BadgeRule::TimeOfDay {
            start_hour: 5,
            end_hour: 5,
            min_count: 1,
        };
        assert!(matches!(empty.evaluate(&snap), Err(Error::Rule(_))));
    }

    #[test]
    fn test_non_finite_amount_is_rule_error() {
        let snap = snapshot(vec![expense(f64::INFINITY, oct(2, 9))], vec![]);
        assert!(matches!(
            BadgeRule::SingleTransactionAmount { min: 10.0 }.evaluate(&snap),
            Err(Error::Rule(_))
        ));
    }

    #[test]
    fn test_foreign_currency() {
        let mut local = expense(10.0, oct(2, 9));
        local.currency = Some("inr".to_string());
        let snap = snapshot(vec![local.clone()], vec![]);
        assert!(!BadgeRule::ForeignCurrency.evaluate(&snap).unwrap());

        let mut abroad = expense(10.0, oct(3, 9));
        abroad.currency = Some("EUR".to_string());
        let snap = snapshot(vec![local, abroad], vec![]);
        assert!(BadgeRule::ForeignCurrency.evaluate(&snap).unwrap());
    }

    #[test]
    fn test_has_recurring_and_has_budget() {
        let mut rent = expense(15000.0, oct(1, 9));
        rent.is_recurring = true;
        rent.frequency = Some(Frequency::Monthly);

        let snap = snapshot(vec![rent], vec![budget("2026-10", None, 30000.0)]);
        assert!(BadgeRule::HasRecurring.evaluate(&snap).unwrap());
        assert!(BadgeRule::HasBudget.evaluate(&snap).unwrap());

        let empty = snapshot(vec![], vec![]);
        assert!(!BadgeRule::HasRecurring.evaluate(&empty).unwrap());
        assert!(!BadgeRule::HasBudget.evaluate(&empty).unwrap());
    }

    #[test]
    fn test_weekend_coverage_needs_adjacent_days() {
        // Oct 24 2026 is a Saturday
        let weekend = snapshot(vec![expense(1.0, oct(24, 10)), expense(1.0, oct(25, 10))], vec![]);
        assert!(BadgeRule::WeekendCoverage.evaluate(&weekend).unwrap());

        // Sunday before Saturday is not the same weekend
        let split = snapshot(vec![expense(1.0, oct(18, 10)), expense(1.0, oct(24, 10))], vec![]);
        assert!(!BadgeRule::WeekendCoverage.evaluate(&split).unwrap());
    }

    #[test]
    fn test_rule_kind_serializes_as_tag() {
        let json = serde_json::to_value(BadgeRule::Streak { days: 7 }).unwrap();
        assert_eq!(json["kind"], "streak");
        assert_eq!(json["days"], 7);
    }
}
