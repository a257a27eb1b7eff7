/// Structured logging for the alert service
///
/// Provides context-rich logging with sub-basin identifiers, timestamps,
/// and severity levels. Supports both console output and file-based
/// logging for daemon operations. This is process logging; the engine's
/// per-analysis reasoning trace lives in `trace`.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a config value such as `"info"` or `"WARN"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Radar,
    Sensor,
    Engine,
    Database,
    System,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Radar => write!(f, "RADAR"),
            Source::Sensor => write!(f, "SENSOR"),
            Source::Engine => write!(f, "ENGINE"),
            Source::Database => write!(f, "DB"),
            Source::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. the alert was already stored by a previous cycle
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance. Stays `None` (logging disabled) until `init_logger`.
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        // A poisoned lock only means another thread panicked mid-log; reuse it.
        let mut guard = LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(logger);
    }

    fn log(&self, level: LogLevel, source: &Source, unit_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        let unit_part = unit_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format!("{} {} {}{}: {}", timestamp, level, source, unit_part, message);

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", log_entry),
                LogLevel::Debug => println!("   [DEBUG] {}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, unit_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, unit_part, message),
                LogLevel::Info => println!("   {}{}: {}", source, unit_part, message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch(level: LogLevel, source: Source, unit_id: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &source, unit_id, message);
        }
    }
}

/// Log a general informational message
pub fn info(source: Source, unit_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, source, unit_id, message);
}

/// Log a warning message
pub fn warn(source: Source, unit_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, source, unit_id, message);
}

/// Log an error message
pub fn error(source: Source, unit_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, source, unit_id, message);
}

/// Log a debug message
pub fn debug(source: Source, unit_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, source, unit_id, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an alert persistence failure from its error message
pub fn classify_store_failure(error_message: &str) -> FailureType {
    let msg = error_message.to_ascii_lowercase();

    // Re-running a cycle inside the same millisecond produces the same alert id
    if msg.contains("duplicate key") || msg.contains("unique constraint") {
        FailureType::Expected
    }
    // Connection-level problems mean the database is unreachable or misconfigured
    else if msg.contains("connection") || msg.contains("timeout") || msg.contains("refused") {
        FailureType::Unexpected
    }
    // Schema drift (missing table/column) is a deployment bug
    else if msg.contains("does not exist") {
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

/// Log a persistence failure with automatic classification
pub fn log_store_failure(unit_id: &str, operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_store_failure(&error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(Source::Database, Some(unit_id), &message),
        FailureType::Unexpected => error(Source::Database, Some(unit_id), &message),
        FailureType::Unknown => warn(Source::Database, Some(unit_id), &message),
    }
}

// ---------------------------------------------------------------------------
// Cycle Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one analysis cycle over the catalog
pub fn log_cycle_summary(analyzed: usize, alerts: usize, persist_failures: usize) {
    let message = format!(
        "Cycle complete: {} sub-basins analyzed, {} alerts raised, {} persistence failures",
        analyzed, alerts, persist_failures
    );

    if persist_failures == 0 {
        info(Source::System, None, &message);
    } else if persist_failures == alerts {
        error(Source::System, None, &message);
    } else {
        warn(Source::System, None, &message);
    }
}
