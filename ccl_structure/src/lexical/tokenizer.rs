//! Item tokenizer for the inner text of a record declaration
//!
//! Scans the text between a declaration's outer parentheses and yields one
//! item per call, in source order:
//!
//! ```text
//! <level> <name> = <type-token>      typed field
//! <level> <name> [<occurs-clause>]   list or fixed-length list
//! <level> <name>                     record group (next item follows)
//! %i <include-path>                  include reference
//! ```
//!
//! The tokenizer is strict: any other text is an error rather than being
//! skipped, so a malformed declaration never silently loses members.

use crate::config::constants::compile_time::declaration::{
    MAX_INCLUDE_PATH_LENGTH, MAX_MEMBER_NAME_LENGTH,
};
use crate::logging::{codes, Code};
use crate::utils::{SourceMap, Span};

/// Tokenizer and coalescer errors with source locations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    #[error("Unbalanced parentheses in declaration starting at line {line}")]
    UnbalancedParentheses { line: u32 },

    #[error("Declaration starting at line {line} is too long: {length} bytes over {lines} lines")]
    DeclarationTooLong { line: u32, length: usize, lines: usize },

    #[error("Unrecognized text in declaration: '{text}'")]
    UnrecognizedItem { text: String, span: Span },

    #[error("Invalid level number: '{text}'")]
    InvalidLevel { text: String, span: Span },

    #[error("Missing type after '=' for member '{name}'")]
    MissingTypeToken { name: String, span: Span },

    #[error("Unterminated occurs clause for member '{name}'")]
    UnterminatedOccurs { name: String, span: Span },

    #[error("Include directive without a path")]
    MissingIncludePath { span: Span },

    #[error("Name too long: {length} characters (max {max})")]
    NameTooLong { length: usize, max: usize, span: Span },
}

impl TokenizerError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnbalancedParentheses { .. } => codes::declaration::UNBALANCED_PARENTHESES,
            Self::DeclarationTooLong { .. } => codes::declaration::DECLARATION_TOO_LONG,
            Self::UnrecognizedItem { .. } | Self::MissingIncludePath { .. } => {
                codes::declaration::UNRECOGNIZED_ITEM
            }
            Self::InvalidLevel { .. } => codes::declaration::INVALID_LEVEL,
            Self::MissingTypeToken { .. } => codes::declaration::MISSING_TYPE_TOKEN,
            Self::UnterminatedOccurs { .. } => codes::declaration::UNTERMINATED_OCCURS,
            Self::NameTooLong { .. } => codes::declaration::NAME_TOO_LONG,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnbalancedParentheses { .. } | Self::DeclarationTooLong { .. } => None,
            Self::UnrecognizedItem { span, .. }
            | Self::InvalidLevel { span, .. }
            | Self::MissingTypeToken { span, .. }
            | Self::UnterminatedOccurs { span, .. }
            | Self::MissingIncludePath { span }
            | Self::NameTooLong { span, .. } => Some(*span),
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

/// What follows an item's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemShape {
    /// `= <token>`; the token is a type keyword or character length
    Typed(String),
    /// `[<clause>]`; brackets stripped, clause trimmed
    Occurs(String),
    /// Nothing; the item opens a nested record
    Group,
    /// `%i <path>`
    Include,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextItem {
    /// `None` for includes, which take their level from context
    pub level: Option<u32>,
    /// Member name, or the include path for includes
    pub name: String,
    pub shape: ItemShape,
    /// Byte offset of the item's first character
    pub start: usize,
    /// Byte offset to pass to the next `next_item` call
    pub resume_at: usize,
    pub span: Span,
}

impl NextItem {
    pub fn is_include(&self) -> bool {
        self.shape == ItemShape::Include
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    Item(NextItem),
    EndOfInput,
}

/// Tokenizer over `text[..end]`, where `text` is a coalesced declaration
pub struct ItemTokenizer<'a> {
    text: &'a str,
    end: usize,
    map: &'a SourceMap,
}

impl<'a> ItemTokenizer<'a> {
    pub fn new(text: &'a str, map: &'a SourceMap) -> Self {
        Self {
            text,
            end: text.len(),
            map,
        }
    }

    /// Restrict scanning to `text[..end]`
    pub fn with_end(mut self, end: usize) -> Self {
        self.end = end.min(self.text.len());
        self
    }

    /// Next item at or after `start`. Leading whitespace is skipped; the
    /// leftmost item wins and nothing before `start` is revisited.
    pub fn next_item(&self, start: usize) -> Result<ScanResult, TokenizerError> {
        let bytes = &self.text.as_bytes()[..self.end];
        let item_start = skip_whitespace(bytes, start.min(self.end));

        if item_start >= self.end {
            return Ok(ScanResult::EndOfInput);
        }

        let item = match bytes[item_start] {
            b'%' => self.scan_include(bytes, item_start)?,
            b if b.is_ascii_digit() => self.scan_leveled(bytes, item_start)?,
            _ => {
                let word_end = skip_non_whitespace(bytes, item_start);
                return Err(self.unrecognized(item_start, word_end));
            }
        };

        Ok(ScanResult::Item(item))
    }

    fn scan_include(&self, bytes: &[u8], start: usize) -> Result<NextItem, TokenizerError> {
        let directive_end = skip_non_whitespace(bytes, start);
        if !self.text[start..directive_end].eq_ignore_ascii_case("%i") {
            return Err(self.unrecognized(start, directive_end));
        }

        let path_start = skip_whitespace(bytes, directive_end);
        let path_end = skip_non_whitespace(bytes, path_start);
        if path_start == path_end {
            return Err(TokenizerError::MissingIncludePath {
                span: self.map.span(start, directive_end),
            });
        }

        let path = &self.text[path_start..path_end];
        self.check_length(path, MAX_INCLUDE_PATH_LENGTH, path_start, path_end)?;

        Ok(NextItem {
            level: None,
            name: path.to_string(),
            shape: ItemShape::Include,
            start,
            resume_at: path_end,
            span: self.map.span(start, path_end),
        })
    }

    fn scan_leveled(&self, bytes: &[u8], start: usize) -> Result<NextItem, TokenizerError> {
        let level_end = start + bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();

        // `12abc` is neither a level nor a name
        if level_end < bytes.len() && !bytes[level_end].is_ascii_whitespace() {
            let word_end = skip_non_whitespace(bytes, start);
            return Err(self.unrecognized(start, word_end));
        }

        let level_text = &self.text[start..level_end];
        let level: u32 = level_text
            .parse()
            .map_err(|_| TokenizerError::InvalidLevel {
                text: level_text.to_string(),
                span: self.map.span(start, level_end),
            })?;

        let name_start = skip_whitespace(bytes, level_end);
        let name_end = name_start
            + bytes[name_start..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count();
        if name_start == name_end {
            let word_end = skip_non_whitespace(bytes, name_start).max(level_end);
            return Err(self.unrecognized(start, word_end));
        }

        let name = &self.text[name_start..name_end];
        self.check_length(name, MAX_MEMBER_NAME_LENGTH, name_start, name_end)?;

        let after_name = skip_whitespace(bytes, name_end);
        let (shape, resume_at) = match bytes.get(after_name) {
            Some(b'=') => {
                let token_start = skip_whitespace(bytes, after_name + 1);
                let token_end = skip_non_whitespace(bytes, token_start);
                if token_start == token_end {
                    return Err(TokenizerError::MissingTypeToken {
                        name: name.to_string(),
                        span: self.map.span(start, after_name + 1),
                    });
                }
                let token = self.text[token_start..token_end].to_string();
                (ItemShape::Typed(token), token_end)
            }
            Some(b'[') => {
                let close = bytes[after_name..]
                    .iter()
                    .position(|&b| b == b']')
                    .map(|i| after_name + i)
                    .ok_or_else(|| TokenizerError::UnterminatedOccurs {
                        name: name.to_string(),
                        span: self.map.span(start, bytes.len()),
                    })?;
                let clause = self.text[after_name + 1..close].trim().to_string();
                (ItemShape::Occurs(clause), close + 1)
            }
            // The next item's level (or an include) follows directly; resume
            // at the name's end so that level is not consumed here.
            Some(b) if b.is_ascii_digit() || *b == b'%' => (ItemShape::Group, name_end),
            None => (ItemShape::Group, name_end),
            Some(_) => {
                let word_end = skip_non_whitespace(bytes, after_name);
                return Err(self.unrecognized(after_name, word_end));
            }
        };

        Ok(NextItem {
            level: Some(level),
            name: name.to_string(),
            shape,
            start,
            resume_at,
            span: self.map.span(start, resume_at),
        })
    }

    fn check_length(
        &self,
        text: &str,
        max: usize,
        start: usize,
        end: usize,
    ) -> Result<(), TokenizerError> {
        if text.len() > max {
            return Err(TokenizerError::NameTooLong {
                length: text.len(),
                max,
                span: self.map.span(start, end),
            });
        }
        Ok(())
    }

    fn unrecognized(&self, start: usize, end: usize) -> TokenizerError {
        TokenizerError::UnrecognizedItem {
            text: self.text[start..end].to_string(),
            span: self.map.span(start, end),
        }
    }
}

fn skip_whitespace(bytes: &[u8], from: usize) -> usize {
    from + bytes[from..]
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count()
}

fn skip_non_whitespace(bytes: &[u8], from: usize) -> usize {
    from + bytes[from..]
        .iter()
        .take_while(|b| !b.is_ascii_whitespace())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn items(text: &str) -> Result<Vec<NextItem>, TokenizerError> {
        let map = SourceMap::new(text.to_string());
        let tokenizer = ItemTokenizer::new(text, &map);
        let mut out = Vec::new();
        let mut pos = 0;
        while let ScanResult::Item(item) = tokenizer.next_item(pos)? {
            pos = item.resume_at;
            out.push(item);
        }
        Ok(out)
    }

    #[test]
    fn test_typed_and_occurs_items() {
        let found = items(" 1 programs [*] 2 programName = vc 2 compile = i2 ").unwrap();

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].level, Some(1));
        assert_eq!(found[0].name, "programs");
        assert_eq!(found[0].shape, ItemShape::Occurs("*".to_string()));
        assert_eq!(found[1].shape, ItemShape::Typed("vc".to_string()));
        assert_eq!(found[2].name, "compile");
        assert_eq!(found[2].shape, ItemShape::Typed("i2".to_string()));
    }

    #[test]
    fn test_group_does_not_consume_next_level() {
        let found = items("1 outer 2 inner = c10").unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].shape, ItemShape::Group);
        assert_eq!(found[0].resume_at, "1 outer".len());
        assert_eq!(found[1].level, Some(2));
        assert_eq!(found[1].shape, ItemShape::Typed("c10".to_string()));
    }

    #[test]
    fn test_occurs_resume_point_tolerates_whitespace() {
        let found = items("1 items [ 10 ]\n  2 id = f8\n").unwrap();

        assert_eq!(found[0].shape, ItemShape::Occurs("10".to_string()));
        assert_eq!(found[0].resume_at, "1 items [ 10 ]".len());
        assert_eq!(found[1].name, "id");
    }

    #[test]
    fn test_include_items() {
        let found = items("1 a = vc %i cclsource:status_block.inc").unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[1].level, None);
        assert!(found[1].is_include());
        assert_eq!(found[1].name, "cclsource:status_block.inc");
    }

    #[test]
    fn test_multiline_spans() {
        let text = "\n  1 a = vc\n  1 b = zz\n";
        let found = items(text).unwrap();

        assert_eq!(found[1].span.start.line, 3);
        assert_eq!(found[1].span.start.column, 3);
    }

    #[test]
    fn test_strict_errors() {
        assert_matches!(
            items("1 a = vc garbage"),
            Err(TokenizerError::UnrecognizedItem { ref text, .. }) if text == "garbage"
        );
        assert_matches!(items("1 a ="), Err(TokenizerError::MissingTypeToken { .. }));
        assert_matches!(items("1 a [5"), Err(TokenizerError::UnterminatedOccurs { .. }));
        assert_matches!(items("%i"), Err(TokenizerError::MissingIncludePath { .. }));
        assert_matches!(items("%x foo"), Err(TokenizerError::UnrecognizedItem { .. }));
        assert_matches!(items("1a = vc"), Err(TokenizerError::UnrecognizedItem { .. }));
        assert_matches!(
            items("99999999999 a = vc"),
            Err(TokenizerError::InvalidLevel { .. })
        );
    }

    #[test]
    fn test_end_bound() {
        let text = "1 a = vc ) trailing";
        let map = SourceMap::new(text.to_string());
        let tokenizer = ItemTokenizer::new(text, &map).with_end(text.find(')').unwrap());

        let first = tokenizer.next_item(0).unwrap();
        let resume = match first {
            ScanResult::Item(item) => item.resume_at,
            ScanResult::EndOfInput => panic!("Expected an item"),
        };
        assert_eq!(tokenizer.next_item(resume).unwrap(), ScanResult::EndOfInput);
    }

    #[test]
    fn test_error_codes() {
        let err = items("1 a = vc ???").unwrap_err();
        assert_eq!(err.error_code(), codes::declaration::UNRECOGNIZED_ITEM);
        assert!(err.span().is_some());
    }
}
