//! Lexical layer for record declarations
//!
//! Masking hides comments and string literals, the coalescer joins a
//! declaration's physical lines, and the item tokenizer walks its inner text.

pub mod coalescer;
pub mod masking;
pub mod tokenizer;

pub use coalescer::{coalesce_declaration, Coalesced};
pub use masking::mask_source;
pub use tokenizer::{ItemShape, ItemTokenizer, NextItem, ScanResult, TokenizerError};

/// Whether a (masked) line starts a record declaration: its stripped text
/// begins with `record` followed by whitespace, ignoring case
pub fn is_declaration_start(line: &str) -> bool {
    let stripped = line.trim_start();
    match stripped.get(..6) {
        Some(keyword) if keyword.eq_ignore_ascii_case("record") => stripped[6..]
            .chars()
            .next()
            .is_some_and(char::is_whitespace),
        _ => false,
    }
}
