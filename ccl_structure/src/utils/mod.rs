//! Shared utilities for declaration parsing
//!
//! Source location tracking used by the tokenizer, the structure builder and
//! the logging system.

pub mod span;

pub use span::{Position, SourceMap, Span};
