//! Insight database operations

use rusqlite::{params, Connection, OptionalExtension};

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::insights::{Confidence, Insight, InsightStatus, InsightType, NewInsight};

const INSIGHT_COLUMNS: &str =
    "id, user_id, type, discriminator, title, message, data, confidence, status, created_at";

impl Database {
    /// Insert an insight unless an open one with the same
    /// (user, type, discriminator) already exists
    ///
    /// The `idx_insights_open` partial unique index makes this atomic, so two
    /// concurrent detector runs cannot both insert. Returns the new id, or
    /// `None` when the insert was refused as a duplicate.
    pub fn create_insight_if_absent(&self, insight: &NewInsight) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let data_json = serde_json::to_string(&insight.data)?;

        let inserted = conn.execute(
            r#"
            INSERT INTO insights (user_id, type, discriminator, title, message, data, confidence, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?)
            ON CONFLICT DO NOTHING
            "#,
            params![
                insight.user_id,
                insight.insight_type.as_str(),
                insight.discriminator,
                insight.title,
                insight.message,
                data_json,
                insight.confidence.as_str(),
                format_datetime(&insight.created_at),
            ],
        )?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(conn.last_insert_rowid()))
    }

    /// List a user's insights, newest first, with optional status filter
    pub fn list_insights(
        &self,
        user_id: i64,
        status: Option<InsightStatus>,
    ) -> Result<Vec<Insight>> {
        let conn = self.conn()?;

        let insights = if let Some(s) = status {
            let sql = format!(
                "SELECT {} FROM insights WHERE user_id = ? AND status = ? ORDER BY created_at DESC, id DESC",
                INSIGHT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id, s.as_str()], Self::row_to_insight)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            let sql = format!(
                "SELECT {} FROM insights WHERE user_id = ? ORDER BY created_at DESC, id DESC",
                INSIGHT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![user_id], Self::row_to_insight)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(insights)
    }

    /// Get a single insight by ID
    pub fn get_insight(&self, id: i64) -> Result<Option<Insight>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM insights WHERE id = ?", INSIGHT_COLUMNS);
        let insight = conn
            .query_row(&sql, params![id], Self::row_to_insight)
            .optional()?;
        Ok(insight)
    }

    /// Move an insight to a new status
    pub fn set_insight_status(&self, id: i64, status: InsightStatus) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE insights SET status = ? WHERE id = ?",
            params![status.as_str(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("insight {}", id)));
        }
        Ok(())
    }

    /// Move a pending insight to `status`, running `effect` in the same SQL
    /// transaction
    ///
    /// Nothing is written unless both the effect and the status change
    /// succeed. Fails with `InvalidData` if the insight is no longer pending.
    pub fn resolve_insight<T>(
        &self,
        id: i64,
        status: InsightStatus,
        effect: impl FnOnce(&Connection) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;

        let value = effect(&db_tx)?;

        let updated = db_tx.execute(
            "UPDATE insights SET status = ? WHERE id = ? AND status = 'pending'",
            params![status.as_str(), id],
        )?;
        if updated == 0 {
            return Err(Error::InvalidData(format!("insight {} is not pending", id)));
        }

        db_tx.commit()?;
        Ok(value)
    }

    /// Count a user's insights of one type in one status
    pub fn count_insights(
        &self,
        user_id: i64,
        insight_type: InsightType,
        status: InsightStatus,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM insights WHERE user_id = ? AND type = ? AND status = ?",
            params![user_id, insight_type.as_str(), status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn row_to_insight(row: &rusqlite::Row) -> rusqlite::Result<Insight> {
        let type_str: String = row.get(2)?;
        let data_json: String = row.get(6)?;
        let confidence_str: String = row.get(7)?;
        let status_str: String = row.get(8)?;
        let created_at_str: String = row.get(9)?;

        Ok(Insight {
            id: row.get(0)?,
            user_id: row.get(1)?,
            insight_type: type_str.parse().unwrap_or(InsightType::Alert),
            discriminator: row.get(3)?,
            title: row.get(4)?,
            message: row.get(5)?,
            data: serde_json::from_str(&data_json).unwrap_or_default(),
            confidence: confidence_str.parse().unwrap_or(Confidence::Low),
            status: status_str.parse().unwrap_or(InsightStatus::Pending),
            created_at: parse_datetime(&created_at_str),
        })
    }
}
