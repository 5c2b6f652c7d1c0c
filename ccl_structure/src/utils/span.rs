//! Source location tracking for declaration text
//!
//! Declarations are coalesced from several physical lines before they are
//! tokenized, so the tokenizer works on byte offsets into the coalesced text.
//! `SourceMap` turns those offsets back into line/column positions for
//! error reporting.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start (inclusive) to end (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Span over raw byte offsets of a single-line text (line 1)
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Self {
            start: Position::new(start, 1, start as u32 + 1),
            end: Position::new(end, 1, end as u32 + 1),
        }
    }

    /// Smallest span covering both spans
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Text covered by this span. Returns an empty string for out-of-range spans.
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input
            .get(self.start.offset..self.end.offset)
            .unwrap_or_default()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Line index over a piece of source text
#[derive(Debug, Clone)]
pub struct SourceMap {
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
    /// Line number reported for the first line of `source`
    first_line: u32,
}

impl SourceMap {
    pub fn new(source: String) -> Self {
        Self::with_first_line(source, 1)
    }

    /// Source map for text that starts at `first_line` of a larger file
    pub fn with_first_line(source: String, first_line: u32) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
            first_line: first_line.max(1),
        }
    }

    /// Line and column for a byte offset
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));

        let line_start = self.line_starts[line];
        let column = self
            .source
            .get(line_start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);

        Position::new(
            offset,
            self.first_line + line as u32,
            (column + 1) as u32,
        )
    }

    /// Span for a byte range of the source
    pub fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.position_at(start), self.position_at(end.max(start)))
    }

    /// Line of text by its reported line number
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        if line_num < self.first_line {
            return None;
        }

        let line_idx = (line_num - self.first_line) as usize;
        let start = *self.line_starts.get(line_idx)?;
        let end = match self.line_starts.get(line_idx + 1) {
            Some(next) => next - 1,
            None => self.source.len(),
        };

        self.source
            .get(start..end)
            .map(|line| line.trim_end_matches('\r'))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Error message with the offending line and a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = format!("Error: {}\n  --> {}\n", message, span.start);

        if let Some(line) = self.get_line(span.start.line) {
            let line_num_str = span.start.line.to_string();
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("   {} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let caret_count = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column) as usize
            } else {
                line.chars().count().saturating_sub(span.start.column as usize - 1)
            };

            result.push_str(&format!(
                "   {} | {}{}\n",
                padding,
                " ".repeat(span.start.column.saturating_sub(1) as usize),
                "^".repeat(caret_count.max(1))
            ));
        }

        result
    }
}
