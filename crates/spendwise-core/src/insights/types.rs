//! Core types for the Insight Engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Frequency;

/// Kinds of insight the detectors produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// Budget usage crossed the alert threshold
    Alert,
    /// A repeating charge that isn't flagged recurring yet
    RecurringTransaction,
    /// A proposed category budget for a habitual merchant
    BudgetAdjust,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Alert => "alert",
            InsightType::RecurringTransaction => "recurring_transaction",
            InsightType::BudgetAdjust => "budget_adjust",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alert" => Ok(InsightType::Alert),
            "recurring_transaction" => Ok(InsightType::RecurringTransaction),
            "budget_adjust" => Ok(InsightType::BudgetAdjust),
            _ => Err(format!("Unknown insight type: {}", s)),
        }
    }
}

/// How strongly a detector believes its own suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            _ => Err(format!("Unknown confidence: {}", s)),
        }
    }
}

/// Lifecycle of an insight; only the user moves it out of `Pending`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightStatus {
    Pending,
    Approved,
    Rejected,
}

impl InsightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightStatus::Pending => "pending",
            InsightStatus::Approved => "approved",
            InsightStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for InsightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InsightStatus::Pending),
            "approved" => Ok(InsightStatus::Approved),
            "rejected" => Ok(InsightStatus::Rejected),
            _ => Err(format!("Unknown insight status: {}", s)),
        }
    }
}

/// An insight produced by a detector (before persistence)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInsight {
    pub user_id: i64,
    pub insight_type: InsightType,
    /// Identifies "the same" insight for dedup (category or normalized description)
    pub discriminator: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub confidence: Confidence,
    pub created_at: DateTime<Utc>,
}

impl NewInsight {
    pub fn new(
        user_id: i64,
        insight_type: InsightType,
        discriminator: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self {
            user_id,
            insight_type,
            discriminator: discriminator.into(),
            title: title.into(),
            message: message.into(),
            data: serde_json::Value::Null,
            confidence,
            created_at: Utc::now(),
        }
    }

    /// Add structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Override the creation time (detectors stamp the run clock)
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }
}

/// A persisted insight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    #[serde(skip_serializing)]
    pub discriminator: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub confidence: Confidence,
    pub status: InsightStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload of an `alert` insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertData {
    /// `None` for a whole-month budget
    pub category: Option<String>,
    pub limit: f64,
    pub current: f64,
}

/// Payload of a `recurring_transaction` insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringData {
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    pub frequency: Frequency,
}

/// Payload of a `budget_adjust` insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAdjustData {
    pub category: String,
    pub new_limit: f64,
    /// "YYYY-MM" the proposal applies to
    pub month: String,
    pub merchant: String,
}

/// Insights created by one orchestrator run, per detector
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub alerts: usize,
    pub recurring: usize,
    pub budget_adjustments: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.alerts + self.recurring + self.budget_adjustments
    }

    pub(crate) fn record(&mut self, insight_type: InsightType, created: usize) {
        match insight_type {
            InsightType::Alert => self.alerts += created,
            InsightType::RecurringTransaction => self.recurring += created,
            InsightType::BudgetAdjust => self.budget_adjustments += created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_type_serialization() {
        assert_eq!(
            InsightType::RecurringTransaction.as_str(),
            "recurring_transaction"
        );
        assert_eq!(
            InsightType::from_str("budget_adjust").unwrap(),
            InsightType::BudgetAdjust
        );
        assert!(InsightType::from_str("savings").is_err());
    }

    #[test]
    fn test_budget_adjust_payload_uses_camel_case() {
        let data = BudgetAdjustData {
            category: "Food".to_string(),
            new_limit: 1800.0,
            month: "2026-10".to_string(),
            merchant: "Zomato".to_string(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["newLimit"], 1800.0);
        assert!(json.get("new_limit").is_none());
    }

    #[test]
    fn test_recurring_payload_frequency_is_lowercase() {
        let data = RecurringData {
            description: "Netflix".to_string(),
            amount: 499.0,
            category: None,
            frequency: Frequency::Monthly,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["frequency"], "monthly");
        assert!(json["category"].is_null());
    }

    #[test]
    fn test_run_summary_records_per_type() {
        let mut summary = RunSummary::default();
        summary.record(InsightType::Alert, 2);
        summary.record(InsightType::BudgetAdjust, 1);
        assert_eq!(summary.alerts, 2);
        assert_eq!(summary.recurring, 0);
        assert_eq!(summary.total(), 3);
    }
}
