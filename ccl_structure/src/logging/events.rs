//! Log events emitted while scanning declarations and moving record data

use super::codes::{self, Code};
use crate::utils::Span;
use std::collections::HashMap;
use std::time::SystemTime;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
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
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    fn at_level(level: LogLevel, code: Code, message: &str) -> Self {
        let max = crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
        let message = match message.char_indices().nth(max) {
            Some((cut, _)) => format!("{}...", &message[..cut]),
            None => message.to_string(),
        };

        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message,
            span: None,
            context: HashMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::at_level(LogLevel::Error, error_code, message)
    }

    /// Warning without a specific code (W000)
    pub fn warning(message: &str) -> Self {
        Self::at_level(LogLevel::Warning, Code::new("W000"), message)
    }

    /// Info without a specific code (I000)
    pub fn info(message: &str) -> Self {
        Self::at_level(LogLevel::Info, Code::new("I000"), message)
    }

    /// Info-level event carrying a success code
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::at_level(LogLevel::Info, success_code, message)
    }

    /// Debug without a specific code (D000)
    pub fn debug(message: &str) -> Self {
        Self::at_level(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.code.as_str())
    }

    /// One-line form: `[LEVEL] CODE - message at line:col`
    pub fn format(&self) -> String {
        let span_str = self
            .span
            .as_ref()
            .map(|s| format!(" at {}:{}", s.start().line, s.start().column))
            .unwrap_or_default();

        format!(
            "[{}] {} - {}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            span_str
        )
    }

    /// Multi-line form with registry metadata and context
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();

        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", self.severity()));

        if self.is_error() {
            output.push_str(&format!("\n  Recoverable: {}", self.is_recoverable()));
            output.push_str(&format!("\n  Requires halt: {}", self.requires_halt()));
        }

        let description = self.description();
        if description != "Unknown error" {
            output.push_str(&format!("\n  Description: {}", description));
        }

        let action = self.recommended_action();
        if action != "No specific action available" {
            output.push_str(&format!("\n  Recommended action: {}", action));
        }

        if !self.context.is_empty() {
            let mut keys: Vec<_> = self.context.keys().collect();
            keys.sort();
            output.push_str("\n  Context:");
            for key in keys {
                output.push_str(&format!("\n    {}: {}", key, self.context[key]));
            }
        }

        output
    }

    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let timestamp = self
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut json = serde_json::json!({
            "timestamp": timestamp,
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "recoverable": self.is_recoverable(),
                "requires_halt": self.requires_halt(),
                "description": self.description(),
                "recommended_action": self.recommended_action(),
            });
        }

        if let Some(span) = &self.span {
            json["span"] = serde_json::json!({
                "start_line": span.start().line,
                "start_column": span.start().column,
                "end_line": span.end().line,
                "end_column": span.end().column,
            });
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::Value::Object(
                self.context
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            );
        }

        serde_json::to_string(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_error_event_metadata() {
        let event = LogEvent::error(codes::data_type::INVALID_DATA_TYPE, "Unknown type 'zz'");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E120");
        assert_eq!(event.category(), "DataType");
        assert!(event.is_recoverable());
        assert!(!event.requires_halt());
    }

    #[test]
    fn test_generic_codes() {
        assert_eq!(LogEvent::warning("w").code.as_str(), "W000");
        assert_eq!(LogEvent::info("i").code.as_str(), "I000");
        assert_eq!(LogEvent::debug("d").code.as_str(), "D000");
        assert!(LogEvent::success(codes::success::STRUCTURE_BUILT, "ok").is_info());
    }

    #[test]
    fn test_format_includes_span() {
        let span = Span::from_offsets(4, 8);
        let event =
            LogEvent::error(codes::declaration::UNRECOGNIZED_ITEM, "Unexpected text").with_span(span);

        let formatted = event.format();
        assert!(formatted.starts_with("[ERROR] E101 - Unexpected text"));
        assert!(formatted.ends_with("at 1:5"));
    }

    #[test]
    fn test_detailed_format_lists_context() {
        let event = LogEvent::error(codes::structure::ORPHANED_MEMBER, "Orphan")
            .with_context("level", "2")
            .with_context("member", "name");

        let detailed = event.format_detailed();
        assert!(detailed.contains("Category: Structure"));
        assert!(detailed.contains("level: 2"));
        assert!(detailed.contains("Recommended action: Start the declaration at level 1"));
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::reply::INVALID_DATE, "Bad date")
            .with_context("field", "UPDT_DT_TM");

        let json: serde_json::Value = serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["code"], "E223");
        assert_eq!(json["context"]["field"], "UPDT_DT_TM");
        assert_eq!(json["error_metadata"]["recoverable"], true);
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let max = crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
        let event = LogEvent::info(&"x".repeat(max + 10));
        assert_eq!(event.message.len(), max + 3);
    }
}
