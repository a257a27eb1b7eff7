//! Convergence scoring rules.
//!
//! Everything here is a pure function of the observations and the threshold
//! table: no clock, no randomness, no logging. `alert::convergence` wraps
//! these with the reasoning trace.
//!
//! Points and risk indicators accumulate independently per signal. A radar
//! is "valid" only when its reflectivity reaches at least the moderate tier,
//! a sensor only when its river level reaches at least the attention tier;
//! rainfall figures add points but never validate a source on their own.

use crate::alert::thresholds::{SCORE_CEILING, ThresholdTable};
use crate::model::{AlertSeverity, AlertType, RadarObservation, SensorObservation};

/// Points and indicators contributed by one observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalScore {
    pub points: u32,
    pub indicators: u32,
    /// Whether the source reached a tier that lets it count towards convergence.
    pub valid: bool,
}

/// Full breakdown of one scoring pass, before any text is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub radar: SignalScore,
    pub sensor: SignalScore,
    pub convergent: bool,
    /// Sum of points plus bonus, before clamping.
    pub raw_score: u32,
    /// Final confidence score in `0..=100`.
    pub score: u8,
    pub severity: Option<AlertSeverity>,
}

impl ScoreBreakdown {
    pub fn indicators(&self) -> u32 {
        self.radar.indicators + self.sensor.indicators
    }
}

// ---------------------------------------------------------------------------
// Per-signal scoring
// ---------------------------------------------------------------------------

/// Scores a radar observation. Reflectivity and rainfall rate are independent
/// sub-scores and both apply when both conditions hold.
pub fn score_radar(radar: &RadarObservation, t: &ThresholdTable) -> SignalScore {
    let mut s = SignalScore::default();

    let dbz = radar.reflectivity_dbz;
    if dbz >= t.reflectivity_severe_dbz {
        s.points += 30;
        s.indicators += 3;
        s.valid = true;
    } else if dbz >= t.reflectivity_strong_dbz {
        s.points += 20;
        s.indicators += 2;
        s.valid = true;
    } else if dbz >= t.reflectivity_moderate_dbz {
        s.points += 10;
        s.indicators += 1;
        s.valid = true;
    }

    let rate = radar.rainfall_rate_mm_h;
    if rate >= t.rain_rate_very_heavy_mm_h {
        s.points += 25;
        s.indicators += 2;
    } else if rate >= t.rain_rate_heavy_mm_h {
        s.points += 15;
        s.indicators += 1;
    }

    s
}

/// Scores a ground sensor reading. River level and 24h rainfall are
/// independent sub-scores; the lowest rainfall tier adds points only.
pub fn score_sensor(sensor: &SensorObservation, t: &ThresholdTable) -> SignalScore {
    let mut s = SignalScore::default();

    let level = sensor.river_level_m;
    if level >= t.river_level_critical_m {
        s.points += 35;
        s.indicators += 3;
        s.valid = true;
    } else if level >= t.river_level_alert_m {
        s.points += 25;
        s.indicators += 2;
        s.valid = true;
    } else if level >= t.river_level_attention_m {
        s.points += 15;
        s.indicators += 1;
        s.valid = true;
    }

    let acc = sensor.accumulated_rain_24h_mm;
    if acc >= t.accumulated_critical_mm {
        s.points += 20;
        s.indicators += 2;
    } else if acc >= t.accumulated_alert_mm {
        s.points += 15;
        s.indicators += 1;
    } else if acc >= t.accumulated_attention_mm {
        s.points += 10;
    }

    s
}

// ---------------------------------------------------------------------------
// Combination
// ---------------------------------------------------------------------------

/// Both sources valid and enough combined indicators.
pub fn is_convergent(radar: &SignalScore, sensor: &SignalScore, t: &ThresholdTable) -> bool {
    radar.valid && sensor.valid && radar.indicators + sensor.indicators >= t.convergence_min_indicators
}

/// Picks the severity tier for a clamped score. First match wins:
/// MAX_ALERT needs convergence, the lower tiers do not.
pub fn select_severity(score: u8, convergent: bool, t: &ThresholdTable) -> Option<AlertSeverity> {
    let score = u32::from(score);
    if score >= t.score_min_max_alert && convergent {
        Some(AlertSeverity::MaxAlert)
    } else if score >= t.score_min_alert {
        Some(AlertSeverity::Alert)
    } else if score >= t.score_min_attention {
        Some(AlertSeverity::Attention)
    } else {
        None
    }
}

/// Classifies the hazard from the sensor reading.
///
/// A high river means riverine flooding. Heavy accumulated rain without the
/// river rising to the alert tier means urban flooding. Anything else, and
/// every radar-only case, defaults to FLOOD.
pub fn classify_alert_type(sensor: Option<&SensorObservation>, t: &ThresholdTable) -> AlertType {
    let Some(sensor) = sensor else {
        return AlertType::Flood;
    };

    if sensor.river_level_m >= t.river_level_alert_m {
        return AlertType::Flood;
    }
    if sensor.accumulated_rain_24h_mm >= t.accumulated_alert_mm {
        // Level is below the alert tier here (or missing/NaN, which fails the check above).
        return AlertType::UrbanFlooding;
    }
    AlertType::Flood
}

/// Runs the whole scoring pass over zero, one or two observations.
pub fn score(
    radar: Option<&RadarObservation>,
    sensor: Option<&SensorObservation>,
    t: &ThresholdTable,
) -> ScoreBreakdown {
    let radar_score = radar.map(|r| score_radar(r, t)).unwrap_or_default();
    let sensor_score = sensor.map(|s| score_sensor(s, t)).unwrap_or_default();

    let convergent = is_convergent(&radar_score, &sensor_score, t);
    let mut raw_score = radar_score.points + sensor_score.points;
    if convergent {
        raw_score = raw_score.saturating_add(t.convergence_bonus);
    }

    let score = raw_score.min(SCORE_CEILING) as u8;
    let severity = select_severity(score, convergent, t);

    ScoreBreakdown {
        radar: radar_score,
        sensor: sensor_score,
        convergent,
        raw_score,
        score,
        severity,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RadarSource, SensorSource};
    use chrono::{TimeZone, Utc};

    fn radar(rate: f64, dbz: f64) -> RadarObservation {
        RadarObservation {
            rainfall_rate_mm_h: rate,
            reflectivity_dbz: dbz,
            captured_at: Utc.with_ymd_and_hms(2024, 1, 15, 18, 0, 0).unwrap(),
            source: RadarSource::AlertaRio,
        }
    }

    fn sensor(level: f64, acc: f64) -> SensorObservation {
        SensorObservation {
            river_level_m: level,
            discharge_m3_s: 30.0 + level * 20.0,
            accumulated_rain_24h_mm: acc,
            captured_at: Utc.with_ymd_and_hms(2024, 1, 15, 18, 0, 0).unwrap(),
            source: SensorSource::Inea,
        }
    }

    fn t() -> ThresholdTable {
        ThresholdTable::default()
    }

    // --- Radar --------------------------------------------------------------

    #[test]
    fn test_radar_reflectivity_tiers() {
        assert_eq!(
            score_radar(&radar(0.0, 55.0), &t()),
            SignalScore { points: 30, indicators: 3, valid: true }
        );
        assert_eq!(
            score_radar(&radar(0.0, 45.0), &t()),
            SignalScore { points: 20, indicators: 2, valid: true }
        );
        assert_eq!(
            score_radar(&radar(0.0, 35.0), &t()),
            SignalScore { points: 10, indicators: 1, valid: true }
        );
        assert_eq!(score_radar(&radar(0.0, 34.9), &t()), SignalScore::default());
    }

    #[test]
    fn test_radar_rain_rate_does_not_validate_radar() {
        let s = score_radar(&radar(80.0, 20.0), &t());
        assert_eq!(s.points, 25);
        assert_eq!(s.indicators, 2);
        assert!(!s.valid, "rainfall rate alone must not mark the radar valid");
    }

    #[test]
    fn test_radar_sub_scores_are_additive() {
        let s = score_radar(&radar(30.0, 47.0), &t());
        assert_eq!(s, SignalScore { points: 20 + 15, indicators: 2 + 1, valid: true });
    }

    // --- Sensor -------------------------------------------------------------

    #[test]
    fn test_sensor_river_level_tiers() {
        assert_eq!(score_sensor(&sensor(3.0, 0.0), &t()).points, 35);
        assert_eq!(score_sensor(&sensor(2.5, 0.0), &t()).points, 25);
        assert_eq!(score_sensor(&sensor(2.0, 0.0), &t()).points, 15);
        assert_eq!(score_sensor(&sensor(1.99, 0.0), &t()), SignalScore::default());
    }

    #[test]
    fn test_sensor_lowest_rain_tier_adds_points_without_indicator() {
        let s = score_sensor(&sensor(0.0, 30.0), &t());
        assert_eq!(s, SignalScore { points: 10, indicators: 0, valid: false });
    }

    #[test]
    fn test_sensor_accumulated_tiers() {
        assert_eq!(score_sensor(&sensor(0.0, 80.0), &t()).indicators, 2);
        assert_eq!(score_sensor(&sensor(0.0, 50.0), &t()).indicators, 1);
        assert_eq!(score_sensor(&sensor(0.0, 79.9), &t()).points, 15);
    }

    #[test]
    fn test_negative_and_nan_inputs_contribute_nothing() {
        assert_eq!(score_radar(&radar(-10.0, -5.0), &t()), SignalScore::default());
        assert_eq!(score_radar(&radar(f64::NAN, f64::NAN), &t()), SignalScore::default());
        assert_eq!(score_sensor(&sensor(-1.0, -30.0), &t()), SignalScore::default());
    }

    // --- Convergence --------------------------------------------------------

    #[test]
    fn test_convergence_needs_both_sources_valid() {
        let r = SignalScore { points: 30, indicators: 3, valid: true };
        let s_invalid = SignalScore { points: 20, indicators: 2, valid: false };
        assert!(!is_convergent(&r, &s_invalid, &t()));
    }

    #[test]
    fn test_convergence_needs_four_indicators() {
        let r = SignalScore { points: 10, indicators: 1, valid: true };
        let s = SignalScore { points: 25, indicators: 2, valid: true };
        assert!(!is_convergent(&r, &s, &t()), "3 indicators is below the gate");
        let s = SignalScore { points: 35, indicators: 3, valid: true };
        assert!(is_convergent(&r, &s, &t()), "4 indicators reaches the gate");
    }

    #[test]
    fn test_bonus_is_added_only_when_convergent() {
        // radar 45 dBZ (+20, 2 ind) + sensor 2.5 m (+25, 2 ind) => 4 ind, convergent
        let b = score(Some(&radar(0.0, 45.0)), Some(&sensor(2.5, 0.0)), &t());
        assert!(b.convergent);
        assert_eq!(b.raw_score, 20 + 25 + 20);
        assert_eq!(b.score, 65);

        // same points but the sensor is not valid (rain only) => no bonus
        let b = score(Some(&radar(0.0, 45.0)), Some(&sensor(0.0, 80.0)), &t());
        assert!(!b.convergent);
        assert_eq!(b.raw_score, 20 + 20);
    }

    #[test]
    fn test_score_is_clamped_to_100() {
        let b = score(Some(&radar(60.0, 60.0)), Some(&sensor(3.2, 85.0)), &t());
        assert_eq!(b.raw_score, 130);
        assert_eq!(b.score, 100);
    }

    // --- Severity -----------------------------------------------------------

    #[test]
    fn test_severity_tiers() {
        assert_eq!(select_severity(85, true, &t()), Some(AlertSeverity::MaxAlert));
        assert_eq!(
            select_severity(100, false, &t()),
            Some(AlertSeverity::Alert),
            "MAX_ALERT requires convergence"
        );
        assert_eq!(select_severity(70, false, &t()), Some(AlertSeverity::Alert));
        assert_eq!(select_severity(84, true, &t()), Some(AlertSeverity::Alert));
        assert_eq!(select_severity(50, true, &t()), Some(AlertSeverity::Attention));
        assert_eq!(select_severity(49, true, &t()), None);
    }

    #[test]
    fn test_no_observations_scores_zero() {
        let b = score(None, None, &t());
        assert_eq!(b.score, 0);
        assert!(!b.convergent);
        assert_eq!(b.severity, None);
        assert_eq!(b.indicators(), 0);
    }

    // --- Classification -----------------------------------------------------

    #[test]
    fn test_high_river_is_flood() {
        assert_eq!(classify_alert_type(Some(&sensor(2.5, 90.0)), &t()), AlertType::Flood);
    }

    #[test]
    fn test_heavy_rain_low_river_is_urban_flooding() {
        assert_eq!(
            classify_alert_type(Some(&sensor(1.2, 60.0)), &t()),
            AlertType::UrbanFlooding
        );
        assert_eq!(
            classify_alert_type(Some(&sensor(0.0, 50.0)), &t()),
            AlertType::UrbanFlooding,
            "a zero river reading counts as no rise"
        );
    }

    #[test]
    fn test_classification_defaults_to_flood() {
        assert_eq!(classify_alert_type(None, &t()), AlertType::Flood);
        assert_eq!(classify_alert_type(Some(&sensor(1.0, 40.0)), &t()), AlertType::Flood);
    }
}
