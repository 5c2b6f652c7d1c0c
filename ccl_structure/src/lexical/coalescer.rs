//! Parenthesis-balanced line coalescing
//!
//! A declaration starts on its `record` line and extends over following
//! lines until the parentheses opened after the record name balance again.
//! Input lines must already be masked so parentheses inside comments and
//! string literals are not counted.

use super::tokenizer::TokenizerError;
use crate::config::constants::compile_time::declaration::{
    MAX_DECLARATION_LENGTH, MAX_DECLARATION_LINES,
};

/// A declaration joined from one or more physical lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coalesced {
    /// Lines `first_line..=last_line` joined with `'\n'`
    pub text: String,
    /// 0-based index of the `record` line
    pub first_line: usize,
    /// 0-based index of the line holding the balancing `)`
    pub last_line: usize,
    /// Byte offset of the opening `(` in `text`
    pub open_paren: usize,
    /// Byte offset of the balancing `)` in `text`
    pub close_paren: usize,
}

impl Coalesced {
    /// Text between the outer parentheses
    pub fn inner(&self) -> &str {
        &self.text[self.open_paren + 1..self.close_paren]
    }

    /// Text before the opening parenthesis
    pub fn header(&self) -> &str {
        &self.text[..self.open_paren]
    }

    pub fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }
}

/// Join lines from `start` until the first `(` and its matching `)` have
/// both been seen
pub fn coalesce_declaration(lines: &[&str], start: usize) -> Result<Coalesced, TokenizerError> {
    let reported_line = start as u32 + 1;
    let mut text = String::new();
    let mut depth = 0usize;
    let mut open_paren = None;

    for (index, line) in lines.iter().enumerate().skip(start) {
        if index > start {
            text.push('\n');
        }
        let line_offset = text.len();
        text.push_str(line);

        let line_count = index - start + 1;
        if text.len() > MAX_DECLARATION_LENGTH || line_count > MAX_DECLARATION_LINES {
            return Err(TokenizerError::DeclarationTooLong {
                line: reported_line,
                length: text.len(),
                lines: line_count,
            });
        }

        for (i, b) in line.bytes().enumerate() {
            match b {
                b'(' => {
                    if open_paren.is_none() {
                        open_paren = Some(line_offset + i);
                    }
                    depth += 1;
                }
                b')' if open_paren.is_some() => {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(open_paren) = open_paren {
                            text.truncate(line_offset + line.len());
                            return Ok(Coalesced {
                                text,
                                first_line: start,
                                last_line: index,
                                open_paren,
                                close_paren: line_offset + i,
                            });
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Err(TokenizerError::UnbalancedParentheses {
        line: reported_line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_single_line() {
        let lines = ["record x ( 1 a = vc )"];
        let coalesced = coalesce_declaration(&lines, 0).unwrap();

        assert_eq!(coalesced.inner(), " 1 a = vc ");
        assert_eq!(coalesced.header(), "record x ");
        assert_eq!(coalesced.last_line, 0);
    }

    #[test]
    fn test_extends_until_balanced() {
        let lines = [
            "set x = 1 go",
            "record reply",
            "(",
            "  1 a = vc",
            ") with protect",
            "call echo(1)",
        ];
        let coalesced = coalesce_declaration(&lines, 1).unwrap();

        assert_eq!(coalesced.first_line, 1);
        assert_eq!(coalesced.last_line, 4);
        assert_eq!(coalesced.line_count(), 4);
        assert_eq!(coalesced.inner(), "\n  1 a = vc\n");
        assert!(coalesced.text.ends_with(") with protect"));
    }

    #[test]
    fn test_nested_parentheses_balance() {
        let lines = ["record x (", " 1 a = vc ; (", ")", ")"];
        let coalesced = coalesce_declaration(&lines, 0).unwrap();

        assert_eq!(coalesced.last_line, 3);
    }

    #[test]
    fn test_stray_close_before_open_is_ignored() {
        let lines = ["record x ) (", "1 a = vc )"];
        let coalesced = coalesce_declaration(&lines, 0).unwrap();

        assert_eq!(coalesced.inner(), "\n1 a = vc ");
    }

    #[test]
    fn test_unbalanced_reports_start_line() {
        let lines = ["", "record x (", " 1 a = vc"];

        assert_matches!(
            coalesce_declaration(&lines, 1),
            Err(TokenizerError::UnbalancedParentheses { line: 2 })
        );
    }
}
