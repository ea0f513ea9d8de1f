//! Badge evaluator - runs a registry against a user's snapshot

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::registry::{builtin_registry, BadgeRegistry};
use super::Snapshot;
use crate::config::BadgeConfig;
use crate::db::Database;
use crate::error::Result;

/// Evaluate the built-in registry as of now
pub fn evaluate_badges(db: &Database, user_id: i64) -> Result<Vec<String>> {
    evaluate_badges_at(db, user_id, Utc::now())
}

/// Evaluate the built-in registry as of `now`
pub fn evaluate_badges_at(db: &Database, user_id: i64, now: DateTime<Utc>) -> Result<Vec<String>> {
    BadgeEvaluator::new(builtin_registry()).evaluate(db, user_id, now)
}

/// Evaluates badges and appends the newly qualifying ones
pub struct BadgeEvaluator<'a> {
    registry: &'a BadgeRegistry,
    disabled: HashSet<String>,
}

impl<'a> BadgeEvaluator<'a> {
    pub fn new(registry: &'a BadgeRegistry) -> Self {
        Self {
            registry,
            disabled: HashSet::new(),
        }
    }

    /// Skip the badges the config disables
    pub fn with_config(registry: &'a BadgeRegistry, config: &BadgeConfig) -> Self {
        Self {
            registry,
            disabled: config.disabled.iter().cloned().collect(),
        }
    }

    /// Unlock every badge the user now qualifies for
    ///
    /// A failing rule is logged and skipped. Returns the ids inserted by
    /// this call, in registry order.
    pub fn evaluate(&self, db: &Database, user_id: i64, now: DateTime<Utc>) -> Result<Vec<String>> {
        let snapshot = Snapshot::load(db, user_id, now)?;
        let unlocked = db.unlocked_badge_ids(user_id)?;

        let mut qualifying: Vec<&str> = Vec::new();
        for badge in self.registry.badges() {
            if unlocked.contains(badge.id) || self.disabled.contains(badge.id) {
                continue;
            }

            match badge.rule.evaluate(&snapshot) {
                Ok(true) => qualifying.push(badge.id),
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        badge = badge.id,
                        rule = badge.rule.kind(),
                        error = %e,
                        "Badge rule failed, skipping"
                    );
                }
            }
        }

        if qualifying.is_empty() {
            debug!(user_id, "No new badges");
            return Ok(Vec::new());
        }

        let inserted = db.append_badge_unlocks(user_id, &qualifying, now)?;
        info!(user_id, badges = ?inserted, "Unlocked badges");
        Ok(inserted)
    }
}
