//! Badge unlock operations

use chrono::{DateTime, Utc};
use rusqlite::params;
use std::collections::HashSet;

use super::{format_datetime, parse_datetime, Database};
use crate::badges::BadgeUnlock;
use crate::error::Result;

impl Database {
    /// Badge ids the user has already unlocked
    pub fn unlocked_badge_ids(&self, user_id: i64) -> Result<HashSet<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT badge_id FROM badge_unlocks WHERE user_id = ?")?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    /// A user's unlocks, oldest first
    pub fn list_badge_unlocks(&self, user_id: i64) -> Result<Vec<BadgeUnlock>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT badge_id, unlocked_at FROM badge_unlocks
             WHERE user_id = ? ORDER BY unlocked_at ASC, rowid ASC",
        )?;
        let unlocks = stmt
            .query_map(params![user_id], |row| {
                let unlocked_at_str: String = row.get(1)?;
                Ok(BadgeUnlock {
                    badge_id: row.get(0)?,
                    unlocked_at: parse_datetime(&unlocked_at_str),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(unlocks)
    }

    /// Append unlocks in one transaction
    ///
    /// Ids the user already holds are ignored. Returns the ids actually
    /// inserted, in input order.
    pub fn append_badge_unlocks(
        &self,
        user_id: i64,
        badge_ids: &[&str],
        unlocked_at: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;
        let at = format_datetime(&unlocked_at);
        let mut inserted = Vec::new();
        {
            let mut stmt = db_tx.prepare(
                "INSERT OR IGNORE INTO badge_unlocks (user_id, badge_id, unlocked_at) VALUES (?, ?, ?)",
            )?;
            for badge_id in badge_ids {
                if stmt.execute(params![user_id, badge_id, at])? > 0 {
                    inserted.push(badge_id.to_string());
                }
            }
        }
        db_tx.commit()?;
        Ok(inserted)
    }
}
