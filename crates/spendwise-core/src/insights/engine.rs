//! Insight Engine - runs the detectors and persists what they find

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};

use crate::config::InsightConfig;
use crate::db::Database;
use crate::models::month_key;
use crate::Result;

use super::types::{InsightType, NewInsight, RunSummary};
use super::{BudgetAdjustDetector, OverspendDetector, RecurringDetector};

/// Context provided to detectors
pub struct AnalysisContext<'a> {
    /// Database for querying transaction data
    pub db: &'a Database,
    /// User being analyzed
    pub user_id: i64,
    /// Clock for this run; all windows are relative to it
    pub now: DateTime<Utc>,
    /// Detector thresholds
    pub config: &'a InsightConfig,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        db: &'a Database,
        user_id: i64,
        now: DateTime<Utc>,
        config: &'a InsightConfig,
    ) -> Self {
        Self {
            db,
            user_id,
            now,
            config,
        }
    }

    /// First day of the current month
    pub fn month_start_date(&self) -> NaiveDate {
        let today = self.now.date_naive();
        today.with_day(1).unwrap_or(today)
    }

    /// First instant of the current month
    pub fn month_start(&self) -> DateTime<Utc> {
        start_of_day(self.month_start_date())
    }

    /// First instant of the previous month
    pub fn previous_month_start(&self) -> DateTime<Utc> {
        let first = self.month_start_date();
        start_of_day(first.checked_sub_months(Months::new(1)).unwrap_or(first))
    }

    /// The instant `months` calendar months before now
    pub fn months_ago(&self, months: u32) -> DateTime<Utc> {
        self.now
            .checked_sub_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Exclusive end of every to-date window
    ///
    /// Stored timestamps have whole-second precision, so a transaction dated
    /// exactly at `now` is still inside the window.
    pub fn window_end(&self) -> DateTime<Utc> {
        self.now + Duration::seconds(1)
    }

    /// Current month as "YYYY-MM"
    pub fn current_month(&self) -> String {
        month_key(self.now.date_naive())
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// A single insight detector
#[async_trait]
pub trait Detector: Send + Sync {
    /// Insight type this detector produces
    fn id(&self) -> InsightType;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Propose insights for the context's user
    ///
    /// Candidates may duplicate an open insight; the store drops those.
    async fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Vec<NewInsight>>;
}

/// Runs detectors in registration order
pub struct InsightEngine {
    detectors: Vec<Box<dyn Detector>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Engine with the built-in detectors: overspend, recurring, budget adjustment
    pub fn new() -> Self {
        let mut engine = Self { detectors: vec![] };

        engine.register(Box::new(OverspendDetector::new()));
        engine.register(Box::new(RecurringDetector::new()));
        engine.register(Box::new(BudgetAdjustDetector::new()));

        engine
    }

    /// Append a detector; it runs after those already registered
    pub fn register(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    /// Run every detector and persist new insights
    ///
    /// The first detector error aborts the run.
    pub async fn run(&self, ctx: &AnalysisContext<'_>) -> Result<RunSummary> {
        ctx.db.require_user(ctx.user_id)?;

        let mut summary = RunSummary::default();

        for detector in &self.detectors {
            let candidates = detector.analyze(ctx).await?;
            let proposed = candidates.len();

            let mut created = 0;
            for candidate in &candidates {
                match ctx.db.create_insight_if_absent(candidate)? {
                    Some(id) => {
                        tracing::debug!(
                            id,
                            detector = detector.name(),
                            discriminator = %candidate.discriminator,
                            "Insight created"
                        );
                        created += 1;
                    }
                    None => {
                        tracing::debug!(
                            detector = detector.name(),
                            discriminator = %candidate.discriminator,
                            "Open insight already exists, skipping"
                        );
                    }
                }
            }

            tracing::debug!(
                detector = detector.name(),
                proposed,
                created,
                "Detector complete"
            );
            summary.record(detector.id(), created);
        }

        tracing::info!(
            user_id = ctx.user_id,
            alerts = summary.alerts,
            recurring = summary.recurring,
            budget_adjustments = summary.budget_adjustments,
            "Insight run complete"
        );
        Ok(summary)
    }

    /// Registered detector types, in run order
    pub fn detector_types(&self) -> Vec<InsightType> {
        self.detectors.iter().map(|d| d.id()).collect()
    }
}

/// Run the built-in detectors for a user with default thresholds
pub async fn run_insight_engine(db: &Database, user_id: i64) -> Result<RunSummary> {
    let config = InsightConfig::default();
    run_insight_engine_at(db, user_id, Utc::now(), &config).await
}

/// Same as [`run_insight_engine`] with an explicit clock and thresholds
pub async fn run_insight_engine_at(
    db: &Database,
    user_id: i64,
    now: DateTime<Utc>,
    config: &InsightConfig,
) -> Result<RunSummary> {
    let ctx = AnalysisContext::new(db, user_id, now, config);
    InsightEngine::new().run(&ctx).await
}
