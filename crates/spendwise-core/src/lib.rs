//! Spendwise Core Library
//!
//! Financial behavior analysis for the Spendwise budgeting tool:
//! - Database access and migrations
//! - Consecutive-day expense streaks
//! - Achievement badges evaluated from a declarative catalog
//! - Insight detectors (overspend, recurring charges, habitual merchants)
//! - CSV transaction import
//! - TOML engine configuration

pub mod badges;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod insights;
pub mod models;
pub mod streak;

pub use badges::{evaluate_badges, evaluate_badges_at, BadgeEvaluator, BadgeRegistry};
pub use config::EngineConfig;
pub use db::Database;
pub use error::{Error, Result};
pub use import::{import_csv, ImportResult};
pub use insights::{
    apply_insight, reject_insight, run_insight_engine, run_insight_engine_at, InsightEngine,
    RunSummary,
};
pub use streak::{compute_streak, current_streak};
