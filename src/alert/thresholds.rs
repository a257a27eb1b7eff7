//! Threshold table for convergence scoring.
//!
//! The defaults are product-tuned constants and must stay exactly as they are
//! for the engine to keep its behaviour. Deployments may override individual
//! values from the `[thresholds]` table of the service config; every field
//! left out keeps its default.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Default constants
// ---------------------------------------------------------------------------

/// Radar reflectivity tiers (dBZ).
pub const REFLECTIVITY_MODERATE_DBZ: f64 = 35.0;
pub const REFLECTIVITY_STRONG_DBZ: f64 = 45.0;
pub const REFLECTIVITY_SEVERE_DBZ: f64 = 55.0;

/// Radar rainfall-rate tiers (mm/h).
pub const RAIN_RATE_HEAVY_MM_H: f64 = 25.0;
pub const RAIN_RATE_VERY_HEAVY_MM_H: f64 = 50.0;

/// River level tiers (m). Same defaults for every sub-basin.
pub const RIVER_LEVEL_ATTENTION_M: f64 = 2.0;
pub const RIVER_LEVEL_ALERT_M: f64 = 2.5;
pub const RIVER_LEVEL_CRITICAL_M: f64 = 3.0;

/// 24-hour accumulated rainfall tiers (mm).
pub const ACCUMULATED_ATTENTION_MM: f64 = 30.0;
pub const ACCUMULATED_ALERT_MM: f64 = 50.0;
pub const ACCUMULATED_CRITICAL_MM: f64 = 80.0;

/// Minimum confidence score per severity tier.
pub const SCORE_MIN_ATTENTION: u32 = 50;
pub const SCORE_MIN_ALERT: u32 = 70;
pub const SCORE_MIN_MAX_ALERT: u32 = 85;

/// Risk indicators needed (with both sources valid) to call it convergence.
pub const CONVERGENCE_MIN_INDICATORS: u32 = 4;
pub const CONVERGENCE_BONUS: u32 = 20;

/// Upper bound of the confidence score.
pub const SCORE_CEILING: u32 = 100;

// ---------------------------------------------------------------------------
// Threshold table
// ---------------------------------------------------------------------------

/// Every threshold the scoring rules compare against.
///
/// Point and indicator weights are not part of the table; they are fixed in
/// `alert::scoring`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdTable {
    pub reflectivity_moderate_dbz: f64,
    pub reflectivity_strong_dbz: f64,
    pub reflectivity_severe_dbz: f64,

    pub rain_rate_heavy_mm_h: f64,
    pub rain_rate_very_heavy_mm_h: f64,

    pub river_level_attention_m: f64,
    pub river_level_alert_m: f64,
    pub river_level_critical_m: f64,

    pub accumulated_attention_mm: f64,
    pub accumulated_alert_mm: f64,
    pub accumulated_critical_mm: f64,

    pub score_min_attention: u32,
    pub score_min_alert: u32,
    pub score_min_max_alert: u32,

    pub convergence_min_indicators: u32,
    pub convergence_bonus: u32,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            reflectivity_moderate_dbz: REFLECTIVITY_MODERATE_DBZ,
            reflectivity_strong_dbz: REFLECTIVITY_STRONG_DBZ,
            reflectivity_severe_dbz: REFLECTIVITY_SEVERE_DBZ,
            rain_rate_heavy_mm_h: RAIN_RATE_HEAVY_MM_H,
            rain_rate_very_heavy_mm_h: RAIN_RATE_VERY_HEAVY_MM_H,
            river_level_attention_m: RIVER_LEVEL_ATTENTION_M,
            river_level_alert_m: RIVER_LEVEL_ALERT_M,
            river_level_critical_m: RIVER_LEVEL_CRITICAL_M,
            accumulated_attention_mm: ACCUMULATED_ATTENTION_MM,
            accumulated_alert_mm: ACCUMULATED_ALERT_MM,
            accumulated_critical_mm: ACCUMULATED_CRITICAL_MM,
            score_min_attention: SCORE_MIN_ATTENTION,
            score_min_alert: SCORE_MIN_ALERT,
            score_min_max_alert: SCORE_MIN_MAX_ALERT,
            convergence_min_indicators: CONVERGENCE_MIN_INDICATORS,
            convergence_bonus: CONVERGENCE_BONUS,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThresholdError {
    /// A tier of the named group is NaN or infinite.
    NonFinite(&'static str),
    /// The tiers of the named group are not strictly ascending.
    NotAscending(&'static str),
    /// The top score tier can never be reached.
    ScoreAboveCeiling(u32),
}

impl fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdError::NonFinite(group) => write!(f, "{} thresholds must be finite numbers", group),
            ThresholdError::NotAscending(group) => {
                write!(f, "{} thresholds must be strictly ascending", group)
            }
            ThresholdError::ScoreAboveCeiling(score) => write!(
                f,
                "score_min_max_alert {} exceeds the score ceiling {}",
                score, SCORE_CEILING
            ),
        }
    }
}

impl std::error::Error for ThresholdError {}

impl ThresholdTable {
    /// Checks that every tier list is strictly ascending.
    ///
    /// Returns the first violation found. An unordered table would make the
    /// first-match tier checks pick the wrong tier.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        let float_tiers: [(&'static str, &[f64]); 4] = [
            (
                "reflectivity",
                &[
                    self.reflectivity_moderate_dbz,
                    self.reflectivity_strong_dbz,
                    self.reflectivity_severe_dbz,
                ],
            ),
            (
                "rain rate",
                &[self.rain_rate_heavy_mm_h, self.rain_rate_very_heavy_mm_h],
            ),
            (
                "river level",
                &[
                    self.river_level_attention_m,
                    self.river_level_alert_m,
                    self.river_level_critical_m,
                ],
            ),
            (
                "accumulated rainfall",
                &[
                    self.accumulated_attention_mm,
                    self.accumulated_alert_mm,
                    self.accumulated_critical_mm,
                ],
            ),
        ];

        for (name, tiers) in float_tiers {
            if tiers.iter().any(|t| !t.is_finite()) {
                return Err(ThresholdError::NonFinite(name));
            }
            if tiers.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ThresholdError::NotAscending(name));
            }
        }

        if !(self.score_min_attention < self.score_min_alert
            && self.score_min_alert < self.score_min_max_alert)
        {
            return Err(ThresholdError::NotAscending("score"));
        }
        if self.score_min_max_alert > SCORE_CEILING {
            return Err(ThresholdError::ScoreAboveCeiling(self.score_min_max_alert));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        ThresholdTable::default()
            .validate()
            .expect("the built-in constants must form a valid table");
    }

    #[test]
    fn test_default_table_matches_constants() {
        let t = ThresholdTable::default();
        assert_eq!(t.reflectivity_severe_dbz, 55.0);
        assert_eq!(t.river_level_alert_m, 2.5);
        assert_eq!(t.accumulated_critical_mm, 80.0);
        assert_eq!(t.score_min_max_alert, 85);
        assert_eq!(t.convergence_min_indicators, 4);
        assert_eq!(t.convergence_bonus, 20);
    }

    #[test]
    fn test_partial_toml_keeps_defaults_for_missing_fields() {
        let t: ThresholdTable = toml::from_str("river_level_critical_m = 3.4\n")
            .expect("partial table should parse");
        assert_eq!(t.river_level_critical_m, 3.4);
        assert_eq!(t.river_level_alert_m, RIVER_LEVEL_ALERT_M);
        assert_eq!(t.score_min_alert, SCORE_MIN_ALERT);
    }

    #[test]
    fn test_unordered_river_levels_are_rejected() {
        let t = ThresholdTable {
            river_level_alert_m: 3.5,
            ..ThresholdTable::default()
        };
        let err = t.validate().expect_err("3.5 above critical 3.0 must be rejected");
        assert_eq!(err, ThresholdError::NotAscending("river level"));
        assert_eq!(err.to_string(), "river level thresholds must be strictly ascending");
    }

    #[test]
    fn test_unordered_score_tiers_are_rejected() {
        let t = ThresholdTable {
            score_min_alert: 90,
            ..ThresholdTable::default()
        };
        assert_eq!(t.validate(), Err(ThresholdError::NotAscending("score")));
    }

    #[test]
    fn test_non_finite_threshold_is_rejected() {
        let t = ThresholdTable {
            rain_rate_heavy_mm_h: f64::NAN,
            ..ThresholdTable::default()
        };
        assert_eq!(t.validate(), Err(ThresholdError::NonFinite("rain rate")));
    }

    #[test]
    fn test_unreachable_max_alert_tier_is_rejected() {
        let t = ThresholdTable {
            score_min_max_alert: 101,
            ..ThresholdTable::default()
        };
        let err = t.validate().expect_err("a tier above 100 can never fire");
        assert_eq!(err, ThresholdError::ScoreAboveCeiling(101));
        assert_eq!(err.to_string(), "score_min_max_alert 101 exceeds the score ceiling 100");
    }
}
