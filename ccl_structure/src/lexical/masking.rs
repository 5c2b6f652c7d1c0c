//! Comment and string-literal masking
//!
//! Masked text has every byte of a comment or string literal replaced with a
//! space, newlines excepted. Byte offsets and line numbers are therefore the
//! same in masked and raw text, and parentheses or `record` keywords inside
//! comments and strings no longer reach the coalescer or tokenizer.
//!
//! Recognized constructs:
//! - `/* ... */`, possibly spanning lines
//! - `; ...` and `!...` (but not `!=`) to end of line; a trailing `\`
//!   continues the comment onto the next line
//! - literals delimited by `"`, `'`, `^`, `~` or `|`, possibly spanning lines
//! - length-prefixed literals `@N:<N characters>@`

const QUOTE_DELIMITERS: &[u8] = b"\"'^~|";

/// Mask every comment and string literal in `source`
pub fn mask_source(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = bytes.to_vec();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];

        let masked_until = if b == b'/' && bytes.get(pos + 1) == Some(&b'*') {
            Some(block_comment_end(bytes, pos))
        } else if b == b';' || (b == b'!' && bytes.get(pos + 1) != Some(&b'=')) {
            Some(line_comment_end(bytes, pos))
        } else if QUOTE_DELIMITERS.contains(&b) {
            Some(quoted_end(bytes, pos))
        } else if b == b'@' {
            length_prefixed_end(bytes, pos)
        } else {
            None
        };

        match masked_until {
            Some(end) => {
                mask_range(&mut out, pos, end);
                pos = end;
            }
            None => pos += 1,
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn mask_range(out: &mut [u8], start: usize, end: usize) {
    for byte in &mut out[start..end] {
        if *byte != b'\n' {
            *byte = b' ';
        }
    }
}

/// End (exclusive) of a `/* */` comment, or end of input if unterminated
fn block_comment_end(bytes: &[u8], start: usize) -> usize {
    find_from(bytes, start + 2, b"*/")
        .map(|close| close + 2)
        .unwrap_or(bytes.len())
}

/// End (exclusive) of a line comment, following `\` continuations
fn line_comment_end(bytes: &[u8], start: usize) -> usize {
    let mut pos = start;
    loop {
        let line_end = bytes[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| pos + i)
            .unwrap_or(bytes.len());

        let content_end = if line_end > 0 && bytes.get(line_end - 1) == Some(&b'\r') {
            line_end - 1
        } else {
            line_end
        };

        let continues = content_end > start && bytes[content_end - 1] == b'\\';
        if continues && line_end < bytes.len() {
            pos = line_end + 1;
        } else {
            return line_end;
        }
    }
}

/// End (exclusive) of a quoted literal, or end of input if unterminated
fn quoted_end(bytes: &[u8], start: usize) -> usize {
    let delimiter = bytes[start];
    bytes[start + 1..]
        .iter()
        .position(|&b| b == delimiter)
        .map(|i| start + 1 + i + 1)
        .unwrap_or(bytes.len())
}

/// End (exclusive) of `@N:...@`, or `None` when the text at `start` is not a
/// well-formed length-prefixed literal
fn length_prefixed_end(bytes: &[u8], start: usize) -> Option<usize> {
    let digits = bytes[start + 1..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }

    let colon = start + 1 + digits;
    if bytes.get(colon) != Some(&b':') {
        return None;
    }

    let length: usize = std::str::from_utf8(&bytes[start + 1..colon])
        .ok()?
        .parse()
        .ok()?;

    // N counts characters, not bytes
    let body_start = colon + 1;
    let rest = std::str::from_utf8(bytes.get(body_start..)?).ok()?;
    let body_len = match rest.char_indices().nth(length) {
        Some((offset, _)) => offset,
        None if rest.chars().count() == length => rest.len(),
        None => return None,
    };

    let terminator = body_start + body_len;
    if bytes.get(terminator) == Some(&b'@') {
        Some(terminator + 1)
    } else {
        None
    }
}

fn find_from(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| from + i)
}
