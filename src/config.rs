/// Service configuration.
///
/// Runtime settings come from a TOML file (`simohi.toml` by default) plus
/// the environment. The file is optional: every table and field has a
/// default, and a missing file yields the defaults. The database URL is
/// read from `DATABASE_URL` only, so credentials stay out of the file;
/// callers load `.env` with `dotenv` before calling `load_from_env`.

use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::alert::thresholds::ThresholdTable;
use crate::logging::LogLevel;
use crate::trace::{DEFAULT_TRACE_CAPACITY, MAX_TRACE_CAPACITY};

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "simohi.toml";

/// Entries surfaced to a UI panel after each analysis.
pub const DEFAULT_SURFACED_TRACE: usize = 10;

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Reasoning entries retained per engine instance.
    pub trace_capacity: usize,
    /// Reasoning entries shown after each analysis.
    pub surfaced_trace: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            trace_capacity: DEFAULT_TRACE_CAPACITY,
            surfaced_trace: DEFAULT_SURFACED_TRACE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: true,
        }
    }
}

impl LoggingSection {
    /// Parsed level; `validate` guarantees this succeeds for loaded configs.
    pub fn min_level(&self) -> LogLevel {
        LogLevel::parse(&self.level).unwrap_or(LogLevel::Info)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub engine: EngineSection,
    pub logging: LoggingSection,
    pub thresholds: ThresholdTable,
    /// Filled from `DATABASE_URL`, never from the file.
    #[serde(skip)]
    pub database_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    Io(String, std::io::Error),
    /// The file is not valid TOML or has wrongly typed fields.
    Parse(String),
    /// The file parsed but a value is out of range.
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, err) => write!(f, "Cannot read config {}: {}", path, err),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, err) => Some(err),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl ServiceConfig {
    /// Parses and validates config text. Does not read the environment.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_TRACE_CAPACITY).contains(&self.engine.trace_capacity) {
            return Err(ConfigError::InvalidValue(format!(
                "engine.trace_capacity {} must be between 1 and {}",
                self.engine.trace_capacity, MAX_TRACE_CAPACITY
            )));
        }
        if LogLevel::parse(&self.logging.level).is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "logging.level '{}' is not one of debug, info, warn, error",
                self.logging.level
            )));
        }
        self.thresholds
            .validate()
            .map_err(|e| ConfigError::InvalidValue(format!("thresholds: {}", e)))
    }
}

/// Loads the config file at `path`. Returns `Ok(None)` if it does not exist.
pub fn load_config(path: &Path) -> Result<Option<ServiceConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
    ServiceConfig::from_toml_str(&text).map(Some)
}

/// Loads the config file (defaults when absent) and overlays the environment.
pub fn load_from_env(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let mut config = load_config(path)?.unwrap_or_default();
    config.database_url = env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty());
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").expect("empty config should be valid");
        assert_eq!(config.engine.trace_capacity, 50);
        assert_eq!(config.engine.surfaced_trace, 10);
        assert_eq!(config.logging.min_level(), LogLevel::Info);
        assert_eq!(config.thresholds, ThresholdTable::default());
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_full_config_parses() {
        let text = r#"
            [engine]
            trace_capacity = 200
            surfaced_trace = 5

            [logging]
            level = "debug"
            file = "simohi.log"
            timestamps = false

            [thresholds]
            river_level_critical_m = 3.5
        "#;
        let config = ServiceConfig::from_toml_str(text).expect("valid config");
        assert_eq!(config.engine.trace_capacity, 200);
        assert_eq!(config.engine.surfaced_trace, 5);
        assert_eq!(config.logging.min_level(), LogLevel::Debug);
        assert_eq!(config.logging.file.as_deref(), Some("simohi.log"));
        assert!(!config.logging.timestamps);
        assert_eq!(config.thresholds.river_level_critical_m, 3.5);
        assert_eq!(config.thresholds.river_level_alert_m, 2.5);
    }

    #[test]
    fn test_database_url_in_file_is_ignored() {
        let config = ServiceConfig::from_toml_str("database_url = \"postgres://x\"\n")
            .expect("unknown top-level keys are ignored");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_zero_trace_capacity_is_rejected() {
        let err = ServiceConfig::from_toml_str("[engine]\ntrace_capacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)), "got {:?}", err);
    }

    #[test]
    fn test_oversized_trace_capacity_is_rejected() {
        let err = ServiceConfig::from_toml_str("[engine]\ntrace_capacity = 9000000000000000000\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)), "got {:?}", err);
        assert!(err.to_string().contains("between 1 and 10000"), "got {}", err);

        let config = ServiceConfig::from_toml_str("[engine]\ntrace_capacity = 10000\n")
            .expect("the maximum window is allowed");
        assert_eq!(config.engine.trace_capacity, MAX_TRACE_CAPACITY);
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let err = ServiceConfig::from_toml_str("[logging]\nlevel = \"chatty\"\n").unwrap_err();
        assert!(err.to_string().contains("chatty"));
    }

    #[test]
    fn test_unordered_thresholds_are_rejected() {
        let text = "[thresholds]\nscore_min_attention = 80\n";
        let err = ServiceConfig::from_toml_str(text).unwrap_err();
        assert!(err.to_string().starts_with("Invalid config value: thresholds"));
    }

    #[test]
    fn test_wrong_type_is_a_parse_error() {
        let err = ServiceConfig::from_toml_str("[engine]\ntrace_capacity = \"lots\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_returns_none() {
        let result = load_config(Path::new("/nonexistent/simohi.toml")).expect("not an error");
        assert!(result.is_none());
    }
}
