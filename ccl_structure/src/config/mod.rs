//! Configuration module for the CCL structure parser
//!
//! Hard limits live in `constants` as compile-time values; user preferences
//! live in `runtime` and can come from `CCL_*` environment variables or a
//! TOML file.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{
    ConfigError, DeclarationPreferences, FileProcessorPreferences, LoggingPreferences,
    RecordPreferences, RuntimeConfig,
};
