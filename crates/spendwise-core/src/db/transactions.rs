//! Transaction operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Frequency, NewTransaction, Transaction, TransactionType};

const TRANSACTION_COLUMNS: &str = "id, user_id, type, amount, description, category, currency, \
     date, is_recurring, frequency, created_at";

impl Database {
    /// Insert a transaction for a user
    pub fn insert_transaction(&self, user_id: i64, tx: &NewTransaction) -> Result<i64> {
        if !tx.amount.is_finite() || tx.amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "transaction amount must be positive, got {}",
                tx.amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (user_id, type, amount, description, category, currency, date, is_recurring, frequency)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                tx.tx_type.as_str(),
                tx.amount,
                tx.description,
                tx.category,
                tx.currency.as_ref().map(|c| c.to_uppercase()),
                format_datetime(&tx.date),
                tx.is_recurring,
                tx.frequency.map(|f| f.as_str()),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// All transactions of a user, oldest first
    pub fn list_transactions(&self, user_id: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE user_id = ? ORDER BY date ASC, id ASC",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(params![user_id], Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// Most recent transactions of a user, newest first
    pub fn list_recent_transactions(&self, user_id: i64, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE user_id = ? ORDER BY date DESC, id DESC LIMIT ?",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(params![user_id, limit], Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// Transactions of a user dated at or before `through`, oldest first
    pub fn list_transactions_through(
        &self,
        user_id: i64,
        through: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions WHERE user_id = ? AND date <= ? ORDER BY date ASC, id ASC",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(
                params![user_id, format_datetime(&through)],
                Self::row_to_transaction,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// Expenses of a user dated in `[from, until)`, oldest first
    pub fn list_expenses_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions
             WHERE user_id = ? AND type = 'expense' AND date >= ? AND date < ?
             ORDER BY date ASC, id ASC",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(
                params![user_id, format_datetime(&from), format_datetime(&until)],
                Self::row_to_transaction,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(transactions)
    }

    /// Flag transactions recurring by id
    pub fn mark_transactions_recurring(&self, ids: &[i64], frequency: Frequency) -> Result<usize> {
        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;
        let updated = flag_recurring(&db_tx, ids, frequency)?;
        db_tx.commit()?;
        Ok(updated)
    }

    fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let type_str: String = row.get(2)?;
        let date_str: String = row.get(7)?;
        let frequency_str: Option<String> = row.get(9)?;
        let created_at_str: String = row.get(10)?;

        Ok(Transaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            tx_type: type_str.parse().unwrap_or(TransactionType::Expense),
            amount: row.get(3)?,
            description: row.get(4)?,
            category: row.get(5)?,
            currency: row.get(6)?,
            date: parse_datetime(&date_str),
            is_recurring: row.get(8)?,
            frequency: frequency_str.and_then(|s| s.parse().ok()),
            created_at: parse_datetime(&created_at_str),
        })
    }
}

/// Flag transactions recurring on an existing connection
pub(crate) fn flag_recurring(conn: &Connection, ids: &[i64], frequency: Frequency) -> Result<usize> {
    let mut stmt =
        conn.prepare("UPDATE transactions SET is_recurring = 1, frequency = ? WHERE id = ?")?;
    let mut updated = 0;
    for id in ids {
        updated += stmt.execute(params![frequency.as_str(), id])?;
    }
    Ok(updated)
}
