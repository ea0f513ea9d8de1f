//! Consecutive-day logging streaks
//!
//! A streak counts the consecutive calendar days with at least one expense,
//! ending today, or ending yesterday if today has nothing logged yet. Any
//! earlier gap ends the streak.

use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashSet;

use crate::models::Transaction;

/// Calendar days (UTC) with at least one expense
pub fn expense_days(transactions: &[Transaction]) -> HashSet<NaiveDate> {
    transactions
        .iter()
        .filter(|tx| tx.is_expense())
        .map(|tx| tx.day())
        .collect()
}

/// Streak length for a set of expense dates, as of `today`
///
/// Duplicates and ordering in `expense_dates` don't matter.
pub fn compute_streak(expense_dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = expense_dates.iter().copied().collect();
    streak_from_days(&days, today)
}

/// Streak length as of the current UTC date
pub fn current_streak(expense_dates: &[NaiveDate]) -> u32 {
    compute_streak(expense_dates, Utc::now().date_naive())
}

/// Streak length over an already-normalized day set
pub fn streak_from_days(days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = today - Duration::days(1);

    let anchor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 1;
    let mut day = anchor - Duration::days(1);
    while days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }

    streak
}
