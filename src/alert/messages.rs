//! Fixed alert wording: justification, titles, descriptions, recommended actions.

use crate::model::{AlertSeverity, AlertType, RadarObservation, SensorObservation, WatershedUnit};

pub const CONVERGENCE_CLAUSE: &str = "CONVERGENCE CONFIRMED between sources";

/// One-line justification attached to an analysis that warrants an alert.
pub fn justification(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::MaxAlert => {
            "Critical convergence between radar and sensors. Immediate evacuation recommended."
        }
        AlertSeverity::Alert => "Elevated indicators detected. Intensive monitoring required.",
        AlertSeverity::Attention => "Attention conditions. Monitor the evolution.",
    }
}

/// Recommended actions shown to the public, per severity.
pub fn recommended_actions(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Attention => {
            "Stay informed. Avoid risk areas. Keep an emergency plan ready."
        }
        AlertSeverity::Alert => {
            "Move away from risk areas. Do not cross flooded roads. Follow Civil Defense guidance."
        }
        AlertSeverity::MaxAlert => {
            "EVACUATE risk areas IMMEDIATELY. Seek higher ground. Call 193/199. \
             DO NOT cross flooded areas."
        }
    }
}

/// Alert title. FLOOD names the river (or the unit when no river is set),
/// every other type names the unit.
pub fn title(alert_type: AlertType, unit: &WatershedUnit) -> String {
    match alert_type {
        AlertType::Flood => format!("Flood Risk - {}", unit.display_river()),
        AlertType::UrbanFlooding => format!("Urban Flooding Risk - {}", unit.name),
        AlertType::Landslide => format!("Landslide Risk - {}", unit.name),
        AlertType::Drought => format!("Drought Alert - {}", unit.name),
    }
}

/// Alert description built from whichever figures are present, in the fixed
/// order radar rate, river level, 24h rainfall, convergence clause.
pub fn description(
    radar: Option<&RadarObservation>,
    sensor: Option<&SensorObservation>,
    convergent: bool,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(r) = radar {
        parts.push(format!("Radar: estimated rainfall of {}mm/h", r.rainfall_rate_mm_h));
    }
    if let Some(s) = sensor {
        parts.push(format!("River level: {}m", s.river_level_m));
        parts.push(format!("24h accumulated rainfall: {}mm", s.accumulated_rain_24h_mm));
    }
    if convergent {
        parts.push(CONVERGENCE_CLAUSE.to_string());
    }

    format!("{}.", parts.join(". "))
}
