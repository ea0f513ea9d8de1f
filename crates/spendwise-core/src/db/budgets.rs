//! Budget operations

use rusqlite::{params, Connection, OptionalExtension};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{parse_month_key, Budget};

impl Database {
    /// Set the budget for a month, replacing any existing amount
    ///
    /// `category = None` sets the whole-budget for the month.
    pub fn set_budget(
        &self,
        user_id: i64,
        month: &str,
        category: Option<&str>,
        amount: f64,
    ) -> Result<i64> {
        let conn = self.conn()?;
        write_budget(&conn, user_id, month, category, amount)
    }

    /// All budgets of a user, newest month first
    pub fn list_budgets(&self, user_id: i64) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, month, amount, category FROM budgets
             WHERE user_id = ? ORDER BY month DESC, category",
        )?;
        let budgets = stmt
            .query_map(params![user_id], Self::row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(budgets)
    }

    /// Budgets of a user for one "YYYY-MM" month
    pub fn list_budgets_for_month(&self, user_id: i64, month: &str) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, month, amount, category FROM budgets
             WHERE user_id = ? AND month = ? ORDER BY id",
        )?;
        let budgets = stmt
            .query_map(params![user_id, month], Self::row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(budgets)
    }

    fn row_to_budget(row: &rusqlite::Row) -> rusqlite::Result<Budget> {
        Ok(Budget {
            id: row.get(0)?,
            user_id: row.get(1)?,
            month: row.get(2)?,
            amount: row.get(3)?,
            category: row.get(4)?,
        })
    }
}

/// Upsert a budget on an existing connection, so callers can batch it into
/// their own SQL transaction
pub(crate) fn write_budget(
    conn: &Connection,
    user_id: i64,
    month: &str,
    category: Option<&str>,
    amount: f64,
) -> Result<i64> {
    if parse_month_key(month).is_none() {
        return Err(Error::InvalidData(format!(
            "budget month must be YYYY-MM, got '{}'",
            month
        )));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidData(format!(
            "budget amount must be positive, got {}",
            amount
        )));
    }

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM budgets WHERE user_id = ? AND month = ? AND COALESCE(category, '') = COALESCE(?, '')",
            params![user_id, month, category],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        conn.execute(
            "UPDATE budgets SET amount = ? WHERE id = ?",
            params![amount, id],
        )?;
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO budgets (user_id, month, amount, category) VALUES (?, ?, ?, ?)",
        params![user_id, month, amount, category],
    )?;

    Ok(conn.last_insert_rowid())
}
