/// Development mode utilities: simulated radar and sensor feeds.
///
/// Real radar and gauge feeds are fetched by external collaborators. When
/// they are unavailable, use this module to produce plausible observations
/// so the engine, alert store and dashboards can be exercised end to end.
/// Seed the simulator to replay the exact same sequence.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::model::{RadarObservation, RadarSource, SensorObservation, SensorSource};

/// Rainfall-rate values (mm/h) the radar simulator picks from.
pub const SIMULATED_RAIN_RATES: [f64; 6] = [0.0, 5.0, 15.0, 30.0, 50.0, 80.0];

/// River levels (m) the sensor simulator picks from.
pub const SIMULATED_RIVER_LEVELS: [f64; 6] = [1.2, 1.5, 1.8, 2.2, 2.8, 3.5];

/// 24h accumulated rainfall values (mm) the sensor simulator picks from.
pub const SIMULATED_ACCUMULATED: [f64; 6] = [0.0, 10.0, 25.0, 40.0, 60.0, 90.0];

const SENSOR_SOURCES: [SensorSource; 3] = [SensorSource::Inea, SensorSource::Cemaden, SensorSource::Inmet];

/// Reflectivity band matching a rainfall rate: a 10 dBZ-wide band above the
/// rate's class, or a flat 15 dBZ for drizzle and dry conditions.
fn reflectivity_band(rate: f64) -> Option<(f64, f64)> {
    if rate > 50.0 {
        Some((55.0, 65.0))
    } else if rate > 25.0 {
        Some((45.0, 55.0))
    } else if rate > 10.0 {
        Some((35.0, 45.0))
    } else if rate > 2.0 {
        Some((25.0, 35.0))
    } else {
        None
    }
}

/// Produces one simulated radar observation captured at `now`.
pub fn simulate_radar<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> RadarObservation {
    let rate = *SIMULATED_RAIN_RATES.choose(rng).unwrap_or(&0.0);
    let reflectivity = match reflectivity_band(rate) {
        Some((lo, hi)) => rng.gen_range(lo..hi),
        None => 15.0,
    };

    RadarObservation {
        rainfall_rate_mm_h: rate,
        reflectivity_dbz: reflectivity,
        captured_at: now,
        source: if rng.gen_bool(0.5) {
            RadarSource::AlertaRio
        } else {
            RadarSource::Cptec
        },
    }
}

/// Produces one simulated gauge reading captured at `now`.
pub fn simulate_sensor<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> SensorObservation {
    let level = *SIMULATED_RIVER_LEVELS.choose(rng).unwrap_or(&SIMULATED_RIVER_LEVELS[0]);
    let accumulated = *SIMULATED_ACCUMULATED.choose(rng).unwrap_or(&0.0);
    let source = *SENSOR_SOURCES.choose(rng).unwrap_or(&SensorSource::Inea);

    SensorObservation {
        river_level_m: level,
        discharge_m3_s: 30.0 + level * 20.0 + rng.gen_range(0.0..10.0),
        accumulated_rain_24h_mm: accumulated,
        captured_at: now,
        source,
    }
}

/// Configuration for simulated feeds
pub struct Simulator {
    rng: StdRng,
    /// Probability that a feed is missing for a given unit (0.0 = always present).
    pub dropout: f64,
}

impl Simulator {
    /// Simulator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            dropout: 0.0,
        }
    }

    /// Deterministic simulator; the same seed yields the same observations.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            dropout: 0.0,
        }
    }

    /// Sets the per-feed dropout probability, clamped to `0.0..=1.0`.
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = if dropout.is_finite() { dropout.clamp(0.0, 1.0) } else { 0.0 };
        self
    }

    pub fn radar(&mut self, now: DateTime<Utc>) -> Option<RadarObservation> {
        if self.dropout > 0.0 && self.rng.gen_bool(self.dropout) {
            return None;
        }
        Some(simulate_radar(&mut self.rng, now))
    }

    pub fn sensor(&mut self, now: DateTime<Utc>) -> Option<SensorObservation> {
        if self.dropout > 0.0 && self.rng.gen_bool(self.dropout) {
            return None;
        }
        Some(simulate_sensor(&mut self.rng, now))
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_radar_reflectivity_matches_rain_rate() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let r = simulate_radar(&mut rng, fixed_now());
            assert!(SIMULATED_RAIN_RATES.contains(&r.rainfall_rate_mm_h));
            match reflectivity_band(r.rainfall_rate_mm_h) {
                Some((lo, hi)) => assert!(
                    (lo..hi).contains(&r.reflectivity_dbz),
                    "{} dBZ outside [{}, {}) for {} mm/h",
                    r.reflectivity_dbz,
                    lo,
                    hi,
                    r.rainfall_rate_mm_h
                ),
                None => assert_eq!(r.reflectivity_dbz, 15.0),
            }
            assert_eq!(r.captured_at, fixed_now());
        }
    }

    #[test]
    fn test_sensor_values_come_from_tables() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let s = simulate_sensor(&mut rng, fixed_now());
            assert!(SIMULATED_RIVER_LEVELS.contains(&s.river_level_m));
            assert!(SIMULATED_ACCUMULATED.contains(&s.accumulated_rain_24h_mm));
            let base = 30.0 + s.river_level_m * 20.0;
            assert!(s.discharge_m3_s >= base && s.discharge_m3_s < base + 10.0);
        }
    }

    #[test]
    fn test_fifty_mm_rate_is_not_in_the_top_band() {
        // Rates exactly on a class edge fall into the lower band.
        assert_eq!(reflectivity_band(50.0), Some((45.0, 55.0)));
        assert_eq!(reflectivity_band(80.0), Some((55.0, 65.0)));
        assert_eq!(reflectivity_band(0.0), None);
    }

    #[test]
    fn test_seeded_simulators_repeat() {
        let mut a = Simulator::seeded(42);
        let mut b = Simulator::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.radar(fixed_now()), b.radar(fixed_now()));
            assert_eq!(a.sensor(fixed_now()), b.sensor(fixed_now()));
        }
    }

    #[test]
    fn test_full_dropout_removes_every_feed() {
        let mut sim = Simulator::seeded(1).with_dropout(1.0);
        assert!(sim.radar(fixed_now()).is_none());
        assert!(sim.sensor(fixed_now()).is_none());
    }

    #[test]
    fn test_dropout_is_clamped() {
        assert_eq!(Simulator::seeded(1).with_dropout(3.0).dropout, 1.0);
        assert_eq!(Simulator::seeded(1).with_dropout(-1.0).dropout, 0.0);
        assert_eq!(Simulator::seeded(1).with_dropout(f64::NAN).dropout, 0.0);
    }
}
