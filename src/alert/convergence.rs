//! Convergence engine: radar and sensor evidence in, alert decision out.
//!
//! The engine is a scoring calculator with an attached rolling reasoning
//! trace. It carries no analytical state between calls, so every caller
//! (request handler, session, daemon cycle) should own its own instance.
//! Nothing here performs I/O; fetching observations happens before
//! `analyze` is called and persisting alerts happens after `build_alert`.
//!
//! # Clock injection
//! `build_alert_at` accepts `now` explicitly so alert timestamps and ids are
//! deterministic in tests; `build_alert` is the wall-clock wrapper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::alert::messages;
use crate::alert::scoring::{self, ScoreBreakdown};
use crate::alert::thresholds::ThresholdTable;
use crate::model::{
    Alert, AlertSeverity, AlertType, RadarObservation, SensorObservation, WatershedUnit,
};
use crate::trace::{DEFAULT_TRACE_CAPACITY, ReasoningLogEntry, ReasoningStage, ReasoningTrace};

// ---------------------------------------------------------------------------
// Analysis value
// ---------------------------------------------------------------------------

/// Result of one analysis. Identical inputs always give an identical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceAnalysis {
    pub convergent: bool,
    /// Confidence score in `0..=100`.
    pub confidence_score: u8,
    pub radar: Option<RadarObservation>,
    pub sensor: Option<SensorObservation>,
    /// `None` means no alert is warranted.
    pub suggested_severity: Option<AlertSeverity>,
    /// Only meaningful when a severity was suggested; FLOOD otherwise.
    pub alert_type: AlertType,
    /// Empty when no severity was suggested.
    pub justification: String,
    pub risk_indicators: u32,
    pub radar_valid: bool,
    pub sensor_valid: bool,
}

impl ConvergenceAnalysis {
    pub fn warrants_alert(&self) -> bool {
        self.suggested_severity.is_some()
    }
}

/// An analysis together with the trace entries that produced it, in
/// append order (ANALYZE first, CONCLUDE last).
#[derive(Debug, Clone, Serialize)]
pub struct TracedAnalysis {
    pub analysis: ConvergenceAnalysis,
    pub entries: Vec<ReasoningLogEntry>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ConvergenceEngine {
    thresholds: ThresholdTable,
    trace: ReasoningTrace,
}

impl Default for ConvergenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvergenceEngine {
    /// Engine with the built-in thresholds and a 50-entry trace.
    pub fn new() -> Self {
        Self::with_config(ThresholdTable::default(), DEFAULT_TRACE_CAPACITY)
    }

    pub fn with_config(thresholds: ThresholdTable, trace_capacity: usize) -> Self {
        Self {
            thresholds,
            trace: ReasoningTrace::with_capacity(trace_capacity),
        }
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Analyzes one sub-basin from zero, one or two observations.
    ///
    /// Appends ANALYZE, two VERIFY, CONVERGE and CONCLUDE entries to the
    /// trace. Never fails: a missing observation is just a weaker case.
    pub fn analyze(
        &mut self,
        unit: &WatershedUnit,
        radar: Option<&RadarObservation>,
        sensor: Option<&SensorObservation>,
    ) -> ConvergenceAnalysis {
        self.analyze_traced(unit, radar, sensor).analysis
    }

    /// Same as `analyze`, also returning the entries this call appended.
    pub fn analyze_traced(
        &mut self,
        unit: &WatershedUnit,
        radar: Option<&RadarObservation>,
        sensor: Option<&SensorObservation>,
    ) -> TracedAnalysis {
        let mut entries = Vec::with_capacity(5);

        entries.push(entry(
            ReasoningStage::Analyze,
            format!("Starting analysis of sub-basin {}...", unit.name),
            Some(json!({ "watershed_id": unit.id, "code": unit.code })),
        ));

        entries.push(match radar {
            Some(r) => entry(
                ReasoningStage::Verify,
                format!("Radar data received: {}", r.source),
                Some(json!({
                    "rainfall_rate_mm_h": r.rainfall_rate_mm_h,
                    "reflectivity_dbz": r.reflectivity_dbz,
                })),
            ),
            None => entry(
                ReasoningStage::Verify,
                "No radar data available for this sub-basin".to_string(),
                None,
            ),
        });

        entries.push(match sensor {
            Some(s) => entry(
                ReasoningStage::Verify,
                format!("Sensor data received: {}", s.source),
                Some(json!({
                    "river_level_m": s.river_level_m,
                    "discharge_m3_s": s.discharge_m3_s,
                    "accumulated_rain_24h_mm": s.accumulated_rain_24h_mm,
                })),
            ),
            None => entry(
                ReasoningStage::Verify,
                "No sensor data available for this sub-basin".to_string(),
                None,
            ),
        });

        let breakdown = scoring::score(radar, sensor, &self.thresholds);
        let analysis = self.assemble(radar, sensor, &breakdown);

        entries.push(entry(
            ReasoningStage::Converge,
            "Convergence analysis complete".to_string(),
            Some(json!({
                "convergent": analysis.convergent,
                "confidence_score": analysis.confidence_score,
                "risk_indicators": analysis.risk_indicators,
            })),
        ));

        entries.push(match analysis.suggested_severity {
            Some(severity) => entry(
                ReasoningStage::Conclude,
                format!("{} suggested for {}", severity, unit.name),
                Some(json!({
                    "alert_type": analysis.alert_type,
                    "severity": severity,
                    "justification": analysis.justification,
                })),
            ),
            None => entry(
                ReasoningStage::Conclude,
                format!("No alert needed for {}", unit.name),
                None,
            ),
        });

        for e in &entries {
            self.trace.push(e.clone());
        }

        TracedAnalysis { analysis, entries }
    }

    fn assemble(
        &self,
        radar: Option<&RadarObservation>,
        sensor: Option<&SensorObservation>,
        b: &ScoreBreakdown,
    ) -> ConvergenceAnalysis {
        let (alert_type, justification) = match b.severity {
            Some(severity) => (
                scoring::classify_alert_type(sensor, &self.thresholds),
                messages::justification(severity).to_string(),
            ),
            None => (AlertType::Flood, String::new()),
        };

        ConvergenceAnalysis {
            convergent: b.convergent,
            confidence_score: b.score,
            radar: radar.cloned(),
            sensor: sensor.cloned(),
            suggested_severity: b.severity,
            alert_type,
            justification,
            risk_indicators: b.indicators(),
            radar_valid: b.radar.valid,
            sensor_valid: b.sensor.valid,
        }
    }

    /// Builds the alert record for an analysis, stamped with the current time.
    /// Returns `None` when the analysis suggests no severity.
    pub fn build_alert(&self, unit: &WatershedUnit, analysis: &ConvergenceAnalysis) -> Option<Alert> {
        self.build_alert_at(unit, analysis, Utc::now())
    }

    /// Clock-injected variant of `build_alert`.
    pub fn build_alert_at(
        &self,
        unit: &WatershedUnit,
        analysis: &ConvergenceAnalysis,
        now: DateTime<Utc>,
    ) -> Option<Alert> {
        let severity = analysis.suggested_severity?;

        let mut confirming_sources = Vec::with_capacity(2);
        if let Some(r) = &analysis.radar {
            confirming_sources.push(r.source.to_string());
        }
        if let Some(s) = &analysis.sensor {
            confirming_sources.push(s.source.to_string());
        }

        Some(Alert {
            id: format!("alert-{}-{}", now.timestamp_millis(), unit.id),
            watershed_id: unit.id.clone(),
            alert_type: analysis.alert_type,
            severity,
            title: messages::title(analysis.alert_type, unit),
            description: messages::description(
                analysis.radar.as_ref(),
                analysis.sensor.as_ref(),
                analysis.convergent,
            ),
            recommended_actions: messages::recommended_actions(severity).to_string(),
            confidence_score: analysis.confidence_score,
            had_radar: analysis.radar.is_some(),
            had_sensor: analysis.sensor.is_some(),
            convergent: analysis.convergent,
            confirming_sources,
            active: true,
            started_at: now,
            ended_at: None,
        })
    }

    /// Retained trace, most recent first. The returned vector is a copy.
    pub fn trace(&self) -> Vec<ReasoningLogEntry> {
        self.trace.snapshot()
    }

    /// At most `n` retained entries, most recent first.
    pub fn recent_trace(&self, n: usize) -> Vec<ReasoningLogEntry> {
        self.trace.recent(n)
    }

    pub fn reset(&mut self) {
        self.trace.clear();
    }
}

fn entry(stage: ReasoningStage, message: String, payload: Option<serde_json::Value>) -> ReasoningLogEntry {
    ReasoningLogEntry {
        stage,
        message,
        payload,
        timestamp: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
