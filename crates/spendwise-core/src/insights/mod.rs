//! Insight Engine - Proactive Financial Insights
//!
//! Detectors look at a user's transactions and budgets and propose
//! insights for the user to approve or reject. The store keeps at most one
//! open insight per (user, type, discriminator), so re-running the engine
//! never piles up duplicates.
//!
//! ## Detectors
//!
//! - **Overspend** - month-to-date spend close to a budget
//! - **Recurring Charge** - the same charge seen repeatedly
//! - **Budget Adjustment** - a habitual merchant from last month
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spendwise_core::insights::run_insight_engine;
//!
//! let summary = run_insight_engine(&db, user_id).await?;
//! println!("{} new insights", summary.total());
//! ```

pub mod actions;
pub mod budget_adjust;
pub mod engine;
pub mod overspend;
pub mod recurring;
pub mod types;

pub use actions::{apply_insight, reject_insight, InsightEffect};
pub use budget_adjust::BudgetAdjustDetector;
pub use engine::{
    run_insight_engine, run_insight_engine_at, AnalysisContext, Detector, InsightEngine,
};
pub use overspend::OverspendDetector;
pub use recurring::{normalize_description, RecurringDetector};
pub use types::{
    AlertData, BudgetAdjustData, Confidence, Insight, InsightStatus, InsightType, NewInsight,
    RecurringData, RunSummary,
};
