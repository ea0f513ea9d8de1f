//! Achievement badges
//!
//! Badges are one-time, monotonic unlocks granted when a declarative rule
//! over a user's financial history becomes true.
//!
//! ## Structure
//!
//! - [`rules`] - the closed set of rule kinds and their dispatch
//! - [`registry`] - the built-in badge catalog
//! - [`evaluator`] - runs a registry against a user and persists unlocks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spendwise_core::badges::evaluate_badges;
//!
//! let unlocked = evaluate_badges(&db, user_id)?;
//! ```

pub mod evaluator;
pub mod registry;
pub mod rules;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Budget, Transaction, User};
use crate::streak;

pub use evaluator::{evaluate_badges, evaluate_badges_at, BadgeEvaluator};
pub use registry::{builtin_registry, BadgeRegistry};
pub use rules::BadgeRule;

/// Grouping used when presenting the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    General,
    Savings,
    Streak,
    Budget,
    Spending,
    Misc,
}

impl BadgeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Savings => "savings",
            Self::Streak => "streak",
            Self::Budget => "budget",
            Self::Spending => "spending",
            Self::Misc => "misc",
        }
    }
}

impl std::fmt::Display for BadgeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A catalog entry
#[derive(Debug, Clone, Serialize)]
pub struct Badge {
    /// Persisted identifier, stable across releases
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: BadgeCategory,
    pub rule: BadgeRule,
}

/// A badge a user holds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeUnlock {
    pub badge_id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Everything a rule can look at, loaded once per evaluation
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub user: User,
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub now: DateTime<Utc>,
}

impl Snapshot {
    /// Load a user's history up to and including `now`
    ///
    /// Later-dated transactions are left out, so every rule sees the
    /// history as it stood at `now`.
    pub fn load(db: &Database, user_id: i64, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            user: db.require_user(user_id)?,
            transactions: db.list_transactions_through(user_id, now)?,
            budgets: db.list_budgets(user_id)?,
            now,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// First instant of the current month
    pub fn month_start(&self) -> DateTime<Utc> {
        let today = self.today();
        let first = today.with_day(1).unwrap_or(today);
        first.and_time(NaiveTime::MIN).and_utc()
    }

    pub fn expenses(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| tx.is_expense())
    }

    /// Transactions dated in the current month so far
    pub fn month_to_date(&self) -> impl Iterator<Item = &Transaction> {
        let start = self.month_start();
        let now = self.now;
        self.transactions
            .iter()
            .filter(move |tx| tx.date >= start && tx.date <= now)
    }

    pub fn expense_days(&self) -> HashSet<NaiveDate> {
        streak::expense_days(&self.transactions)
    }

    pub fn streak(&self) -> u32 {
        streak::streak_from_days(&self.expense_days(), self.today())
    }
}
