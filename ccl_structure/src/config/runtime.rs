// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to reject files without a CCL source extension
    pub require_ccl_extension: bool,

    /// Whether to log size/line/duration metrics for each file
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_ccl_extension: env_flag(env_vars::REQUIRE_CCL_EXTENSION, false),
            enable_performance_logging: env_flag(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeclarationPreferences {
    /// Match the status-block include path ignoring case
    pub case_insensitive_status_block: bool,

    /// Stop scanning a source at the first declaration that fails
    pub stop_on_first_error: bool,

    /// Re-check the level-stack invariant on every built structure
    pub validate_levels: bool,
}

impl Default for DeclarationPreferences {
    fn default() -> Self {
        Self {
            case_insensitive_status_block: env_flag(env_vars::STATUS_BLOCK_IGNORE_CASE, true),
            stop_on_first_error: env_flag(env_vars::STOP_ON_FIRST_ERROR, false),
            validate_levels: env_flag(env_vars::VALIDATE_LEVELS, cfg!(debug_assertions)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordPreferences {
    /// Omit setter commands for zero/empty values
    pub skip_default_values: bool,

    /// Look up reply JSON keys in upper case (CCL's record-to-JSON convention)
    pub uppercase_reply_keys: bool,
}

impl Default for RecordPreferences {
    fn default() -> Self {
        Self {
            skip_default_values: env_flag(env_vars::SKIP_DEFAULT_VALUES, true),
            uppercase_reply_keys: env_flag(env_vars::UPPERCASE_REPLY_KEYS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the logger
    pub min_log_level: LogLevel,

    /// Whether to attach the current file to every event
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_file_context: env_flag(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Errors loading a runtime configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub declaration: DeclarationPreferences,
    pub record: RecordPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse TOML text; sections and keys left out fall back to their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_CCL_EXTENSION: &str = "CCL_REQUIRE_CCL_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "CCL_ENABLE_PERFORMANCE_LOGGING";

    // Declarations
    pub const STATUS_BLOCK_IGNORE_CASE: &str = "CCL_DECLARATION_STATUS_BLOCK_IGNORE_CASE";
    pub const STOP_ON_FIRST_ERROR: &str = "CCL_DECLARATION_STOP_ON_FIRST_ERROR";
    pub const VALIDATE_LEVELS: &str = "CCL_DECLARATION_VALIDATE_LEVELS";

    // Records
    pub const SKIP_DEFAULT_VALUES: &str = "CCL_RECORD_SKIP_DEFAULT_VALUES";
    pub const UPPERCASE_REPLY_KEYS: &str = "CCL_RECORD_UPPERCASE_REPLY_KEYS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "CCL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "CCL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "CCL_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "CCL_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("WARN"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [declaration]
            stop_on_first_error = true

            [logging]
            min_log_level = "Debug"
            "#,
        )
        .unwrap();

        assert!(config.declaration.stop_on_first_error);
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
        assert_eq!(
            config.record.skip_default_values,
            RecordPreferences::default().skip_default_values
        );
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = RuntimeConfig::from_toml_str("[declaration\nstop_on_first_error = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ccl.toml");

        let mut config = RuntimeConfig::default();
        config.file_processor.require_ccl_extension = true;
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert!(loaded.file_processor.require_ccl_extension);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = RuntimeConfig::load(Path::new("/nonexistent/ccl.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ccl.toml"));
    }
}
