/// Core data types for the SiMoHi hydrological alert service.
///
/// This module defines the shared domain model imported by all other modules:
/// the watershed units supplied by the catalog, the two observation records
/// fed to the convergence engine, and the alert record it produces.
/// It contains no logic beyond small display helpers, and no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Watershed units
// ---------------------------------------------------------------------------

/// Mean flood risk level attached to a sub-basin by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

/// A hydrographic sub-basin, the unit every analysis is run against.
///
/// Supplied by the external catalog (see `basins::BASIN_REGISTRY`). The
/// engine never creates or validates these; `id` is unique and immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatershedUnit {
    pub id: String,
    pub code: String,
    pub name: String,
    /// Primary river; `None` or blank means titles fall back to `name`.
    pub river_name: Option<String>,
    pub mean_risk: RiskLevel,
    pub macro_region_id: String,
    pub area_km2: f64,
    pub estimated_population: u64,
}

impl WatershedUnit {
    /// Name used in FLOOD alert titles: the river when set, else the unit name.
    pub fn display_river(&self) -> &str {
        self.river_name
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Observation types
// ---------------------------------------------------------------------------

/// Radar providers whose rainfall estimates the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RadarSource {
    AlertaRio,
    Cptec,
}

impl RadarSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RadarSource::AlertaRio => "ALERTA_RIO",
            RadarSource::Cptec => "CPTEC",
        }
    }
}

impl fmt::Display for RadarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ground-network providers whose gauge readings the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorSource {
    Inea,
    Cemaden,
    Inmet,
}

impl SensorSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorSource::Inea => "INEA",
            SensorSource::Cemaden => "CEMADEN",
            SensorSource::Inmet => "INMET",
        }
    }
}

impl fmt::Display for SensorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A radar-derived rainfall estimate over a sub-basin.
///
/// Constructed fresh by the caller for each analysis; the engine copies it
/// verbatim into the returned analysis and never persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarObservation {
    pub rainfall_rate_mm_h: f64,
    pub reflectivity_dbz: f64,
    pub captured_at: DateTime<Utc>,
    pub source: RadarSource,
}

/// A ground gauge reading for the sub-basin's river.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorObservation {
    pub river_level_m: f64,
    pub discharge_m3_s: f64,
    pub accumulated_rain_24h_mm: f64,
    pub captured_at: DateTime<Utc>,
    pub source: SensorSource,
}

// ---------------------------------------------------------------------------
// Alert types
// ---------------------------------------------------------------------------

/// Hazard classification of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Flood,
    UrbanFlooding,
    Landslide,
    Drought,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Flood => "FLOOD",
            AlertType::UrbanFlooding => "URBAN_FLOODING",
            AlertType::Landslide => "LANDSLIDE",
            AlertType::Drought => "DROUGHT",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Attention,
    Alert,
    MaxAlert,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Attention => "ATTENTION",
            AlertSeverity::Alert => "ALERT",
            AlertSeverity::MaxAlert => "MAX_ALERT",
        }
    }

    /// Parses the tag stored in the database.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ATTENTION" => Some(AlertSeverity::Attention),
            "ALERT" => Some(AlertSeverity::Alert),
            "MAX_ALERT" => Some(AlertSeverity::MaxAlert),
            _ => None,
        }
    }

    /// Numeric rank used for ordering in SQL (higher is more severe).
    pub fn rank(&self) -> i16 {
        match self {
            AlertSeverity::Attention => 1,
            AlertSeverity::Alert => 2,
            AlertSeverity::MaxAlert => 3,
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AlertType {
    /// Parses the tag stored in the database.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "FLOOD" => Some(AlertType::Flood),
            "URBAN_FLOODING" => Some(AlertType::UrbanFlooding),
            "LANDSLIDE" => Some(AlertType::Landslide),
            "DROUGHT" => Some(AlertType::Drought),
            _ => None,
        }
    }
}

/// A hydrological alert raised for one sub-basin.
///
/// Built by `ConvergenceEngine::build_alert` and never touched by the engine
/// afterwards. Closing an alert (`active = false`, `ended_at = Some(..)`) is
/// done by the persistence layer in `store`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub watershed_id: String,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub title: String,
    pub description: String,
    pub recommended_actions: String,
    pub confidence_score: u8,
    pub had_radar: bool,
    pub had_sensor: bool,
    pub convergent: bool,
    /// Radar tag first (if any), then sensor tag (if any).
    pub confirming_sources: Vec<String>,
    pub active: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}
