/// Demo daemon cycle for the SiMoHi alert service.
///
/// Runs one analysis over every catalog sub-basin (or a single one given as
/// the first argument, by id or code) with simulated radar and sensor feeds,
/// prints each decision as JSON, and stores raised alerts when
/// `DATABASE_URL` is set.
///
/// Usage:
///   simohi_service [sb-NN | RJ-NN] [--seed N] [--dropout P] [--config path]

use chrono::Utc;
use clap::Parser;
use postgres::{Client, NoTls};
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;

use simohi_service::alert::ConvergenceEngine;
use simohi_service::basins::{self, BASIN_REGISTRY, Basin};
use simohi_service::config::{self, DEFAULT_CONFIG_PATH};
use simohi_service::dev_mode::Simulator;
use simohi_service::logging::{self, Source};
use simohi_service::store;

#[derive(Parser, Debug)]
#[command(name = "simohi_service")]
#[command(about = "One SiMoHi alert cycle over simulated radar and gauge feeds", long_about = None)]
#[command(version)]
struct Args {
    /// Sub-basin id (sb-02) or code (RJ-02); every sub-basin when omitted
    unit: Option<String>,

    /// Seed for a reproducible simulator
    #[arg(long)]
    seed: Option<u64>,

    /// Probability that a simulated feed is missing (0.0 - 1.0)
    #[arg(long, default_value_t = 0.0)]
    dropout: f64,

    /// Config file path
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn select_basins(unit: Option<&str>) -> Result<Vec<&'static Basin>, String> {
    match unit {
        None => Ok(BASIN_REGISTRY.iter().collect()),
        Some(key) => basins::find_basin(key)
            .or_else(|| basins::find_basin_by_code(key))
            .map(|b| vec![b])
            .ok_or_else(|| format!("sub-basin '{}' not found", key)),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    let config_found = args.config.exists();
    let config = config::load_from_env(&args.config)?;

    logging::init_logger(
        config.logging.min_level(),
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );
    if !config_found {
        logging::warn(
            Source::System,
            None,
            &format!("{} not found, using built-in defaults", args.config.display()),
        );
    }

    let selected = select_basins(args.unit.as_deref())?;

    let mut db = match &config.database_url {
        Some(url) => match Client::connect(url, NoTls) {
            Ok(client) => Some(client),
            Err(e) => {
                logging::error(Source::Database, None, &format!("connect failed: {}", e));
                None
            }
        },
        None => {
            logging::info(Source::System, None, "DATABASE_URL not set, alerts will not be stored");
            None
        }
    };

    let simulator = match args.seed {
        Some(seed) => Simulator::seeded(seed),
        None => Simulator::new(),
    };
    let mut simulator = simulator.with_dropout(args.dropout);
    let mut engine = ConvergenceEngine::with_config(config.thresholds.clone(), config.engine.trace_capacity);

    let mut alerts_raised = 0;
    let mut persist_failures = 0;

    for basin in &selected {
        let unit = basin.to_unit();
        let now = Utc::now();
        let radar = simulator.radar(now);
        let sensor = simulator.sensor(now);
        if radar.is_none() {
            logging::debug(Source::Radar, Some(&unit.code), "no radar feed this cycle");
        }
        if sensor.is_none() {
            logging::debug(Source::Sensor, Some(&unit.code), "no gauge reading this cycle");
        }

        let analysis = engine.analyze(&unit, radar.as_ref(), sensor.as_ref());
        match analysis.suggested_severity {
            Some(severity) => logging::info(
                Source::Engine,
                Some(&unit.code),
                &format!(
                    "{} suggested ({}, score {}, convergent={})",
                    severity, analysis.alert_type, analysis.confidence_score, analysis.convergent
                ),
            ),
            None => logging::debug(
                Source::Engine,
                Some(&unit.code),
                &format!("no alert (score {})", analysis.confidence_score),
            ),
        }
        let alert = engine.build_alert_at(&unit, &analysis, now);

        if let Some(alert) = &alert {
            alerts_raised += 1;
            if let Some(client) = db.as_mut() {
                if let Err(e) = store::insert_alert(client, alert) {
                    persist_failures += 1;
                    logging::log_store_failure(&unit.id, "insert_alert", &e);
                }
            }
        }

        let report = json!({
            "watershed": unit,
            "analysis": analysis,
            "alert": alert,
            "trace": engine.recent_trace(config.engine.surfaced_trace),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if let Some(client) = db.as_mut() {
        match store::count_active(client, None) {
            Ok(n) => logging::info(Source::Database, None, &format!("{} active alerts stored", n)),
            Err(e) => logging::log_store_failure("-", "count_active", &e),
        }
    }

    logging::log_cycle_summary(selected.len(), alerts_raised, persist_failures);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["simohi_service"]).expect("no arguments is valid");
        assert_eq!(args.unit, None);
        assert_eq!(args.seed, None);
        assert_eq!(args.dropout, 0.0);
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_args_unit_seed_and_config() {
        let args = Args::try_parse_from([
            "simohi_service",
            "RJ-02",
            "--seed",
            "42",
            "--dropout",
            "0.25",
            "--config",
            "/etc/simohi.toml",
        ])
        .expect("valid arguments");
        assert_eq!(args.unit.as_deref(), Some("RJ-02"));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.dropout, 0.25);
        assert_eq!(args.config, PathBuf::from("/etc/simohi.toml"));
    }

    #[test]
    fn test_args_reject_bad_seed_and_extra_positional() {
        assert!(Args::try_parse_from(["simohi_service", "--seed", "soon"]).is_err());
        assert!(Args::try_parse_from(["simohi_service", "sb-01", "sb-02"]).is_err());
    }

    #[test]
    fn test_select_basins_by_id_or_code() {
        assert_eq!(select_basins(None).expect("whole catalog").len(), BASIN_REGISTRY.len());
        let by_id = select_basins(Some("sb-02")).expect("known id");
        let by_code = select_basins(Some("RJ-02")).expect("known code");
        assert_eq!(by_id[0].id, by_code[0].id);
        assert!(select_basins(Some("sb-99")).is_err());
    }
}
