//! Record declaration parsing
//!
//! `scan_source` finds every `record <name> ( ... )` declaration in a piece
//! of CCL source and parses each one independently. A declaration that fails
//! is reported with its line and scanning continues after it.

mod builder;
mod error;

pub use builder::{ParsedDeclaration, StructureParser};
pub use error::{StructureError, StructureResult};

use crate::config::runtime::DeclarationPreferences;
use crate::error::{ParserError, ParserResult};
use crate::grammar::Structure;
use crate::lexical::{coalesce_declaration, is_declaration_start, mask_source};
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};

/// Result of parsing one declaration found in a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationOutcome {
    /// 1-based line of the `record` keyword
    pub line: usize,
    pub result: ParserResult<Structure>,
}

impl DeclarationOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn structure(&self) -> Option<&Structure> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ParserError> {
        self.result.as_ref().err()
    }
}

/// Parse every declaration in `source` with default preferences
pub fn scan_source(source: &str) -> Vec<DeclarationOutcome> {
    scan_source_with_parser(source, &StructureParser::new())
}

pub fn scan_source_with_preferences(
    source: &str,
    preferences: DeclarationPreferences,
) -> Vec<DeclarationOutcome> {
    scan_source_with_parser(source, &StructureParser::with_preferences(preferences))
}

pub fn scan_source_with_parser(source: &str, parser: &StructureParser) -> Vec<DeclarationOutcome> {
    let masked = mask_source(source);
    let lines: Vec<&str> = masked.lines().collect();
    let mut outcomes = Vec::new();
    let mut index = 0;

    log_debug!("Scanning source for record declarations", "lines" => lines.len());

    while index < lines.len() {
        if !parser.can_parse(lines[index]) {
            index += 1;
            continue;
        }

        let line = index + 1;
        let result = match coalesce_declaration(&lines, index) {
            Ok(coalesced) => {
                index = coalesced.last_line + 1;
                parser.parse_coalesced(&coalesced)
            }
            Err(err) => {
                // Nothing past this line balances; keep looking for later
                // declarations from the next line
                index += 1;
                Err(ParserError::from(err))
            }
        };

        if let Err(err) = &result {
            report_failure(line, err);
        }

        let failed = result.is_err();
        outcomes.push(DeclarationOutcome { line, result });

        if failed && parser.preferences().stop_on_first_error {
            break;
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    log_success!(
        codes::success::SOURCE_SCAN_COMPLETE,
        "Source scan complete",
        "declarations" => outcomes.len(),
        "failed" => failed
    );

    outcomes
}

/// Parse the first declaration in `source`
pub fn parse_declaration(source: &str) -> ParserResult<Structure> {
    StructureParser::new().parse_text(source)
}

/// Whether any line of `source` starts a declaration
pub fn contains_declaration(source: &str) -> bool {
    mask_source(source).lines().any(is_declaration_start)
}

fn report_failure(line: usize, err: &ParserError) {
    match err.span() {
        Some(span) => log_error!(err.error_code(), "Record declaration rejected",
            span = span,
            "line" => line,
            "error" => err
        ),
        None => log_error!(err.error_code(), "Record declaration rejected",
            "line" => line,
            "error" => err
        ),
    }
}

#[cfg(test)]
mod declaration_properties;
