use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReadinessError, Result};

/// Detection constants for the alert rules. None of these are observed
/// values; they are tunable defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AlertConfig {
    /// Fraction below the trailing average that counts as a sudden drop.
    pub hrv_drop_fraction: f64,
    /// Number of prior readings in the trailing HRV average.
    pub hrv_window: usize,
    pub sleep_baseline: f64,
    pub stress_ceiling: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            hrv_drop_fraction: 0.15,
            hrv_window: 3,
            sleep_baseline: 70.0,
            stress_ceiling: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TrendConfig {
    /// Minimum half-over-half change, in metric units, to leave `Stable`.
    pub epsilon: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self { epsilon: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    pub alerts: AlertConfig,
    pub trend: TrendConfig,
}

impl Thresholds {
    pub fn from_json(raw: &str) -> Result<Self> {
        let thresholds: Thresholds = serde_json::from_str(raw)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ReadinessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        let alerts = &self.alerts;
        if !(alerts.hrv_drop_fraction > 0.0 && alerts.hrv_drop_fraction < 1.0) {
            return Err(ReadinessError::invalid(
                "alerts.hrvDropFraction",
                alerts.hrv_drop_fraction,
            ));
        }
        if alerts.hrv_window == 0 {
            return Err(ReadinessError::invalid("alerts.hrvWindow", alerts.hrv_window));
        }
        crate::classify::validate_score("alerts.sleepBaseline", alerts.sleep_baseline)?;
        crate::classify::validate_score("alerts.stressCeiling", alerts.stress_ceiling)?;
        if !self.trend.epsilon.is_finite() || self.trend.epsilon < 0.0 {
            return Err(ReadinessError::invalid("trend.epsilon", self.trend.epsilon));
        }
        Ok(())
    }
}
