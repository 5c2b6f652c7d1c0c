//! Logging configuration: compile-time limits plus runtime preferences

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install logging preferences; only the first call takes effect
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

pub fn get_min_log_level() -> EventsLogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

pub fn include_file_context() -> bool {
    get_runtime_preferences().include_file_context
}

pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_events_per_file() -> usize {
    MAX_LOG_EVENTS_PER_FILE
}

pub fn validate_config() -> Result<(), String> {
    if !(100..=100_000).contains(&LOG_BUFFER_SIZE) {
        return Err(format!("Log buffer size out of range: {}", LOG_BUFFER_SIZE));
    }

    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err("Max log events per file exceeds total buffer size".to_string());
    }

    Ok(())
}

pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         - Log buffer size: {}\n\
         - Max events per file: {}\n\
         - Max message length: {}\n\
         - Min log level: {:?}\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Include file context: {}",
        LOG_BUFFER_SIZE,
        MAX_LOG_EVENTS_PER_FILE,
        MAX_LOG_MESSAGE_LENGTH,
        preferences.min_log_level,
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.include_file_context,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
        assert!(get_max_log_events_per_file() <= get_error_buffer_size());
    }

    #[test]
    fn test_runtime_preferences_install_once() {
        let _ = init_runtime_preferences(LoggingPreferences::default());
        assert!(init_runtime_preferences(LoggingPreferences::default()).is_err());
    }

    #[test]
    fn test_config_summary_mentions_limits() {
        let summary = get_config_summary();
        assert!(summary.contains("Log buffer size: 10000"));
        assert!(summary.contains("Min log level"));
    }
}
