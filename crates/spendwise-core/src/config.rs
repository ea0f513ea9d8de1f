//! Engine configuration
//!
//! Thresholds used by the insight detectors and the badge evaluator.
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path (CLI `--config`)
//! 2. The override in the data dir (~/.local/share/spendwise/config/engine.toml)
//! 3. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Frequency;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Detector thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct InsightConfig {
    /// Share of a budget that triggers an overspend alert
    pub overspend_ratio: f64,
    /// Look-back window of the recurring-charge detector
    pub recurring_window_months: u32,
    /// Occurrences of the same description + amount needed to call it recurring
    pub recurring_min_occurrences: usize,
    /// Visits to one merchant last month needed to propose a budget
    pub habitual_min_occurrences: usize,
    /// Proposed budget as a share of last month's merchant spend
    pub budget_cut_ratio: f64,
    /// Frequency proposed for detected recurring charges
    pub default_frequency: Frequency,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            overspend_ratio: 0.9,
            recurring_window_months: 3,
            recurring_min_occurrences: 3,
            habitual_min_occurrences: 4,
            budget_cut_ratio: 0.9,
            default_frequency: Frequency::Monthly,
        }
    }
}

/// Badge evaluator settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BadgeConfig {
    /// Badge ids that are never awarded
    pub disabled: Vec<String>,
}

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub insights: InsightConfig,
    pub badges: BadgeConfig,
}

impl EngineConfig {
    /// Load configuration (explicit path, then data-dir override, then defaults)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => read_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_config(&path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        parse_config(&content)
    }

    /// The embedded defaults
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendwise").join("config").join("engine.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "Loading engine config");
    fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read {}: {}", path.display(), e))
    })
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    insights: Option<RawInsights>,
    badges: Option<RawBadges>,
}

#[derive(Debug, Deserialize)]
struct RawInsights {
    overspend_ratio: Option<f64>,
    recurring_window_months: Option<u32>,
    recurring_min_occurrences: Option<usize>,
    habitual_min_occurrences: Option<usize>,
    budget_cut_ratio: Option<f64>,
    default_frequency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBadges {
    disabled: Option<Vec<String>>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = EngineConfig::default();

    if let Some(insights) = raw.insights {
        let target = &mut config.insights;
        if let Some(ratio) = insights.overspend_ratio {
            target.overspend_ratio = ratio;
        }
        if let Some(months) = insights.recurring_window_months {
            target.recurring_window_months = months;
        }
        if let Some(min) = insights.recurring_min_occurrences {
            target.recurring_min_occurrences = min;
        }
        if let Some(min) = insights.habitual_min_occurrences {
            target.habitual_min_occurrences = min;
        }
        if let Some(ratio) = insights.budget_cut_ratio {
            target.budget_cut_ratio = ratio;
        }
        if let Some(freq) = insights.default_frequency {
            target.default_frequency = freq.parse().map_err(Error::Config)?;
        }
    }

    if let Some(badges) = raw.badges {
        if let Some(disabled) = badges.disabled {
            config.badges.disabled = disabled;
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &EngineConfig) -> Result<()> {
    let insights = &config.insights;

    for (name, ratio) in [
        ("overspend_ratio", insights.overspend_ratio),
        ("budget_cut_ratio", insights.budget_cut_ratio),
    ] {
        if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
            return Err(Error::Config(format!(
                "{} must be in (0, 1], got {}",
                name, ratio
            )));
        }
    }

    if insights.recurring_window_months == 0 {
        return Err(Error::Config(
            "recurring_window_months must be at least 1".to_string(),
        ));
    }
    if insights.recurring_min_occurrences < 2 || insights.habitual_min_occurrences < 2 {
        return Err(Error::Config(
            "occurrence thresholds must be at least 2".to_string(),
        ));
    }

    Ok(())
}
