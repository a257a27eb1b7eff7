/// Alert persistence against PostgreSQL.
///
/// The engine only builds `Alert` values; this module stores them and is
/// the one place an alert is ever changed afterwards (closing it). Schema:
/// `sql/001_alerts.sql`.

use chrono::{DateTime, Utc};
use postgres::{Client, Row};
use std::fmt;

use crate::model::{Alert, AlertSeverity, AlertType};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum StoreError {
    /// The query itself failed.
    Database(postgres::Error),
    /// A stored row holds a value the model cannot represent.
    CorruptRow { alert_id: String, detail: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::CorruptRow { alert_id, detail } => {
                write!(f, "Corrupt alert row {}: {}", alert_id, detail)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            StoreError::CorruptRow { .. } => None,
        }
    }
}

impl From<postgres::Error> for StoreError {
    fn from(e: postgres::Error) -> Self {
        StoreError::Database(e)
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts a freshly built alert.
pub fn insert_alert(client: &mut Client, alert: &Alert) -> Result<(), StoreError> {
    let sources = encode_sources(&alert.confirming_sources);

    client.execute(
        "INSERT INTO alerts
            (id, watershed_id, alert_type, severity, severity_rank, title, description,
             recommended_actions, confidence_score, had_radar, had_sensor, convergent,
             confirming_sources, active, started_at, ended_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        &[
            &alert.id,
            &alert.watershed_id,
            &alert.alert_type.as_str(),
            &alert.severity.as_str(),
            &alert.severity.rank(),
            &alert.title,
            &alert.description,
            &alert.recommended_actions,
            &i16::from(alert.confidence_score),
            &alert.had_radar,
            &alert.had_sensor,
            &alert.convergent,
            &sources,
            &alert.active,
            &alert.started_at,
            &alert.ended_at,
        ],
    )?;

    Ok(())
}

/// Closes an active alert: `active = false`, `ended_at = now`.
///
/// Returns `false` if no active alert has that id (unknown or already closed).
pub fn close_alert(client: &mut Client, alert_id: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
    let updated = client.execute(
        "UPDATE alerts SET active = FALSE, ended_at = $2
         WHERE id = $1 AND active",
        &[&alert_id, &now],
    )?;
    Ok(updated > 0)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Active alerts, most severe first, then most recent first.
pub fn active_alerts(client: &mut Client, limit: i64) -> Result<Vec<Alert>, StoreError> {
    let rows = client.query(
        "SELECT id, watershed_id, alert_type, severity, title, description,
                recommended_actions, confidence_score, had_radar, had_sensor, convergent,
                confirming_sources, active, started_at, ended_at
         FROM alerts
         WHERE active
         ORDER BY severity_rank DESC, started_at DESC
         LIMIT $1",
        &[&limit],
    )?;

    rows.iter().map(row_to_alert).collect()
}

/// Number of active alerts, optionally restricted to one severity.
pub fn count_active(client: &mut Client, severity: Option<AlertSeverity>) -> Result<i64, StoreError> {
    let row = match severity {
        Some(sev) => client.query_one(
            "SELECT COUNT(*) FROM alerts WHERE active AND severity = $1",
            &[&sev.as_str()],
        )?,
        None => client.query_one("SELECT COUNT(*) FROM alerts WHERE active", &[])?,
    };
    Ok(row.get(0))
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn row_to_alert(row: &Row) -> Result<Alert, StoreError> {
    let id: String = row.get(0);

    let type_tag: String = row.get(2);
    let alert_type = AlertType::from_tag(&type_tag).ok_or_else(|| StoreError::CorruptRow {
        alert_id: id.clone(),
        detail: format!("unknown alert type '{}'", type_tag),
    })?;

    let severity_tag: String = row.get(3);
    let severity = AlertSeverity::from_tag(&severity_tag).ok_or_else(|| StoreError::CorruptRow {
        alert_id: id.clone(),
        detail: format!("unknown severity '{}'", severity_tag),
    })?;

    let score: i16 = row.get(7);
    let confidence_score = u8::try_from(score)
        .ok()
        .filter(|s| *s <= 100)
        .ok_or_else(|| StoreError::CorruptRow {
            alert_id: id.clone(),
            detail: format!("confidence score {} outside 0..=100", score),
        })?;

    let sources_json: String = row.get(11);
    let confirming_sources = decode_sources(&sources_json).map_err(|detail| StoreError::CorruptRow {
        alert_id: id.clone(),
        detail,
    })?;

    Ok(Alert {
        id,
        watershed_id: row.get(1),
        alert_type,
        severity,
        title: row.get(4),
        description: row.get(5),
        recommended_actions: row.get(6),
        confidence_score,
        had_radar: row.get(8),
        had_sensor: row.get(9),
        convergent: row.get(10),
        confirming_sources,
        active: row.get(12),
        started_at: row.get(13),
        ended_at: row.get(14),
    })
}

/// Confirming sources are stored as a JSON array of tags.
fn encode_sources(sources: &[String]) -> String {
    serde_json::Value::from(sources.to_vec()).to_string()
}

fn decode_sources(text: &str) -> Result<Vec<String>, String> {
    serde_json::from_str(text).map_err(|e| format!("confirming_sources is not a JSON string array: {}", e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Database tests - need DATABASE_URL and the schema in sql/001_alerts.sql
// ---------------------------------------------------------------------------
//
// To run these tests manually:
//   cargo test -- --ignored store_db
