//! Per-file event collection for scanning many CCL sources
//!
//! Errors logged while a file context is active are grouped under that file
//! so a batch of sources can be reported cargo-style at the end.

use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.successful_files as f64 / self.total_files as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    fn events(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.file_events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an event for a file. Past the per-file cap a single
    /// truncation warning is appended and later events are dropped.
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = self.events();
        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    /// Register a file so it counts in the summary even without events
    pub fn register_file(&self, file_path: &Path) {
        self.events().entry(file_path.to_path_buf()).or_default();
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.events().get(file_path).cloned().unwrap_or_default()
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        self.events()
            .get(file_path)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        self.events()
            .get(file_path)
            .is_some_and(|events| events.iter().any(|e| e.is_error()))
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.events().clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = self.events();

        let mut summary = ProcessingSummary {
            total_files: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..Default::default()
        };

        for file_events in events.values() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            } else {
                summary.successful_files += 1;
            }

            summary.total_errors += errors;
            summary.total_warnings += warnings;
        }

        summary
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Render collected errors and warnings grouped by file
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let reportable: Vec<_> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if reportable.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));

        for event in reportable {
            let label = if event.is_error() { "error" } else { "warning" };
            let location = event
                .span
                .as_ref()
                .map(|s| {
                    format!(
                        " --> {}:{}:{}",
                        file_path.display(),
                        s.start().line,
                        s.start().column
                    )
                })
                .unwrap_or_default();

            output.push_str(&format!(
                "{}[{}]: {}{}\n",
                label,
                event.code.as_str(),
                event.message,
                location
            ));

            let mut keys: Vec<_> = event
                .context
                .keys()
                .filter(|k| k.as_str() != "file" && k.as_str() != "file_id")
                .collect();
            keys.sort();
            for key in keys {
                output.push_str(&format!("  = {}: {}\n", key, event.context[key]));
            }

            if event.is_error() {
                let action = event.recommended_action();
                if action != "No specific action available" {
                    output.push_str(&format!("  = help: {}\n", action));
                }
            }
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::Span;

    #[test]
    fn test_summary_counts_files_by_outcome() {
        let collector = ErrorCollector::new();

        collector.record_event(
            Path::new("a.prg"),
            LogEvent::error(codes::declaration::UNBALANCED_PARENTHESES, "Unbalanced"),
        );
        collector.record_event(Path::new("b.inc"), LogEvent::warning("Odd include"));
        collector.register_file(Path::new("c.prg"));

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert_eq!(summary.successful_files, 1);
        assert!((summary.success_rate() - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(ProcessingSummary::default().success_rate(), 0.0);
        assert!(summary.has_errors());
        assert!(collector.file_has_errors(Path::new("a.prg")));
        assert!(!collector.file_has_errors(Path::new("c.prg")));
    }

    #[test]
    fn test_per_file_cap() {
        let collector = ErrorCollector::new();
        let path = Path::new("noisy.prg");

        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record_event(path, LogEvent::info("event"));
        }

        let events = collector.get_file_events(path);
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_FILE + 1);
        assert!(events.last().unwrap().is_warning());
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        collector.record_event(
            Path::new("orders.prg"),
            LogEvent::error(codes::data_type::INVALID_DATA_TYPE, "Unknown type 'zz'")
                .with_span(Span::from_offsets(9, 11))
                .with_context("member", "name")
                .with_context("file", "orders.prg"),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking orders.prg..."));
        assert!(output.contains("error[E120]: Unknown type 'zz' --> orders.prg:1:10"));
        assert!(output.contains("  = member: name"));
        assert!(!output.contains("  = file:"));
        assert!(output.contains("Total errors: 1"));
    }
}
