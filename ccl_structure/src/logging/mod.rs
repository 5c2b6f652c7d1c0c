//! Global logging for declaration scanning and record handling
//!
//! Nothing is printed until `init_global_logging` is called, so library
//! callers that never initialise logging see no output. Errors logged while a
//! file context is active are also collected per file for batch reports.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialise the global logger from the runtime logging preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let service = Arc::new(service::create_configured_service());
    install(service.clone())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

fn install(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;

    let _ = GLOBAL_ERROR_COLLECTOR.set(Arc::new(ErrorCollector::new()));

    Ok(())
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

// ============================================================================
// FILE CONTEXT MANAGEMENT
// ============================================================================

pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    let context = FileProcessingContext::new(file_path, file_id);

    if let Some(collector) = try_get_global_error_collector() {
        collector.register_file(&context.file_path);
    }

    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with `file_path` as the current thread's file context
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_file_context();
    set_file_context(file_path, file_id);
    let result = f();
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

pub fn get_current_file_context() -> Option<FileProcessingContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn attach_file_context(event: LogEvent) -> LogEvent {
    if !config::include_file_context() {
        return event;
    }

    match get_current_file_context() {
        Some(file_ctx) => event
            .with_context("file", &file_ctx.file_path.display().to_string())
            .with_context("file_id", &file_ctx.file_id.to_string()),
        None => event,
    }
}

/// Send an event to the global logger, adding the current file context.
/// Errors are also recorded in the collector under the current file.
pub fn emit(event: LogEvent) {
    let event = attach_file_context(event);

    if event.is_error() {
        if let (Some(file_ctx), Some(collector)) =
            (get_current_file_context(), try_get_global_error_collector())
        {
            collector.record_event(&file_ctx.file_path, event.clone());
        }
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);

    if let Some(s) = span {
        event = event.with_span(s);
    }

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    emit(event);
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::success(code, message);

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    emit(event);
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::info(message);

    for (key, value) in context {
        event = event.with_context(key, value);
    }

    emit(event);
}

// ============================================================================
// BATCH REPORTING
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

pub fn get_file_errors(file_path: &Path) -> Vec<LogEvent> {
    try_get_global_error_collector()
        .map(|collector| collector.get_file_errors(file_path))
        .unwrap_or_default()
}
