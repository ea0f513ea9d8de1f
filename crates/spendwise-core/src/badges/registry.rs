//! Built-in badge catalog
//!
//! Ids are persisted in `badge_unlocks` and must never change.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::{Badge, BadgeCategory, BadgeRule};
use crate::error::{Error, Result};

static BUILTIN: Lazy<BadgeRegistry> = Lazy::new(BadgeRegistry::builtin);

/// The process-wide built-in registry
pub fn builtin_registry() -> &'static BadgeRegistry {
    &BUILTIN
}

const FOOD_KEYWORDS: &[&str] = &["food", "restaurant", "zomato", "swiggy", "dining"];

/// An ordered, read-only set of badges
#[derive(Debug, Clone)]
pub struct BadgeRegistry {
    badges: Vec<Badge>,
}

impl BadgeRegistry {
    /// Build a custom registry; ids must be unique
    pub fn new(badges: Vec<Badge>) -> Result<Self> {
        let mut seen = HashSet::new();
        for badge in &badges {
            if !seen.insert(badge.id) {
                return Err(Error::InvalidData(format!(
                    "duplicate badge id: {}",
                    badge.id
                )));
            }
        }
        Ok(Self { badges })
    }

    /// The built-in catalog
    #[rustfmt::skip]
    pub fn builtin() -> Self {
        use BadgeCategory::*;

        let badges = vec![
            badge("first_step", "First Step", "Log your first transaction", "👣", General,
                BadgeRule::TransactionCount { min: 1 }),
            badge("getting_started", "Getting Started", "Log 10 transactions", "🌱", General,
                BadgeRule::TransactionCount { min: 10 }),
            badge("consistent_tracker", "Consistent Tracker", "Log 50 transactions", "📒", General,
                BadgeRule::TransactionCount { min: 50 }),
            badge("centurion", "Centurion", "Log 100 transactions", "💯", General,
                BadgeRule::TransactionCount { min: 100 }),

            badge("saver_bronze", "Bronze Saver", "Save 1,000 this month", "🥉", Savings,
                BadgeRule::MonthlySavings { min: 1_000.0 }),
            badge("saver_silver", "Silver Saver", "Save 5,000 this month", "🥈", Savings,
                BadgeRule::MonthlySavings { min: 5_000.0 }),
            badge("saver_gold", "Gold Saver", "Save 10,000 this month", "🥇", Savings,
                BadgeRule::MonthlySavings { min: 10_000.0 }),
            badge("saver_platinum", "Platinum Saver", "Save 50,000 this month", "💎", Savings,
                BadgeRule::MonthlySavings { min: 50_000.0 }),

            badge("streak_3", "On a Roll", "Log expenses 3 days in a row", "🔥", Streak,
                BadgeRule::Streak { days: 3 }),
            badge("streak_7", "Week Warrior", "Log expenses 7 days in a row", "📅", Streak,
                BadgeRule::Streak { days: 7 }),
            badge("streak_14", "Fortnight Focus", "Log expenses 14 days in a row", "⚡", Streak,
                BadgeRule::Streak { days: 14 }),
            badge("streak_30", "Habit Formed", "Log expenses 30 days in a row", "🏆", Streak,
                BadgeRule::Streak { days: 30 }),

            badge("budget_planner", "Budget Planner", "Create your first budget", "📝", Budget,
                BadgeRule::HasBudget),
            badge("budget_keeper", "Budget Keeper", "Stay under your monthly budget", "🛡️", Budget,
                BadgeRule::StayedUnderBudget { from_day: 25 }),

            badge("foodie", "Foodie", "Log 10 food expenses", "🍜", Spending,
                BadgeRule::CategoryKeyword { keywords: FOOD_KEYWORDS, min_count: 10 }),
            badge("big_spender", "Big Spender", "Make a single purchase of 10,000 or more", "💸", Spending,
                BadgeRule::SingleTransactionAmount { min: 10_000.0 }),
            badge("night_owl", "Night Owl", "Log 5 expenses between midnight and 5 AM", "🦉", Spending,
                BadgeRule::TimeOfDay { start_hour: 0, end_hour: 5, min_count: 5 }),
            badge("early_bird", "Early Bird", "Log 5 expenses between 5 AM and 8 AM", "🐦", Spending,
                BadgeRule::TimeOfDay { start_hour: 5, end_hour: 8, min_count: 5 }),

            badge("globetrotter", "Globetrotter", "Spend in a foreign currency", "🌍", Misc,
                BadgeRule::ForeignCurrency),
            badge("autopilot", "Autopilot", "Set up a recurring transaction", "🔁", Misc,
                BadgeRule::HasRecurring),
            badge("weekend_warrior", "Weekend Warrior", "Log expenses on a Saturday and Sunday", "🎉", Misc,
                BadgeRule::WeekendCoverage),
        ];

        Self { badges }
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn get(&self, id: &str) -> Option<&Badge> {
        self.badges.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}

fn badge(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    category: BadgeCategory,
    rule: BadgeRule,
) -> Badge {
    Badge {
        id,
        name,
        description,
        icon,
        category,
        rule,
    }
}
