//! Quoted strings and regex literals inside expression text.
//!
//! Bracket counting must never look inside a literal, so the scanner either
//! skips literals in place or masks them behind a marker token. Telling a
//! regex literal from a division uses a lookback heuristic over the previous
//! significant character; it is an approximation and keeps the same operator
//! and keyword table in every release.

use serde::Serialize;

use crate::syntax::{LITERAL_MARKER, REGEX_PRECEDING_CHARS, REGEX_PRECEDING_WORDS};

/// Verbatim text of a literal replaced by a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiddenLiteral {
    pub text: String,
}

impl HiddenLiteral {
    pub fn is_regex(&self) -> bool {
        self.text.starts_with('/')
    }

    /// Source form for embedding in a single-line fragment.
    pub fn escaped_text(&self) -> String {
        self.text.replace('\r', "\\r").replace('\n', "\\n")
    }
}

/// The marker standing in for hidden literal number `index`.
pub fn marker(index: usize) -> String {
    format!("{LITERAL_MARKER}{index}~")
}

/// Parses a marker at `pos`, returning the literal index and the end offset.
pub fn parse_marker(code: &str, pos: usize) -> Option<(usize, usize)> {
    let rest = code.get(pos..)?;
    let digits_start = rest.strip_prefix(LITERAL_MARKER)?;
    let digits_len = digits_start
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digits_len == 0 || digits_start.as_bytes().get(digits_len) != Some(&b'~') {
        return None;
    }
    let index = digits_start[..digits_len].parse().ok()?;
    Some((index, pos + LITERAL_MARKER.len_utf8() + digits_len + 1))
}

pub fn is_quote(byte: u8) -> bool {
    matches!(byte, b'"' | b'\'' | b'`')
}

/// End offset (exclusive) of the quoted string opening at `start`.
///
/// Returns `None` for an unterminated string; the quote is then an ordinary
/// character.
pub fn string_end(code: &str, start: usize) -> Option<usize> {
    let bytes = code.as_bytes();
    let quote = *bytes.get(start)?;
    if !is_quote(quote) {
        return None;
    }
    let mut index = start + 1;
    while index < bytes.len() {
        match bytes[index] {
            b'\\' => index += 2,
            byte if byte == quote => return Some(index + 1),
            _ => index += 1,
        }
    }
    None
}

/// End offset of the regex literal starting at the `/` in `slash`, if the
/// slash starts one.
pub fn regex_end(code: &str, slash: usize) -> Option<usize> {
    let bytes = code.as_bytes();
    if bytes.get(slash) != Some(&b'/') {
        return None;
    }
    let end = regex_body_end(bytes, slash)?;
    if slash_starts_regex(bytes, slash) {
        Some(end)
    } else {
        None
    }
}

/// Where scanning continues after the `/` at `slash`: past the regex literal
/// when there is one, otherwise just past the slash.
pub fn skip_regex(code: &str, slash: usize) -> usize {
    regex_end(code, slash).unwrap_or(slash + 1)
}

fn regex_body_end(bytes: &[u8], slash: usize) -> Option<usize> {
    match bytes.get(slash + 1) {
        None | Some(b'*' | b'/' | b'>' | b'\n' | b'\r') => return None,
        _ => {}
    }
    let mut index = slash + 1;
    loop {
        match *bytes.get(index)? {
            b'\n' | b'\r' => return None,
            b'\\' => {
                match bytes.get(index + 1) {
                    None | Some(b'\n' | b'\r') => return None,
                    _ => index += 2,
                }
            }
            b'[' => {
                index += 1;
                loop {
                    match *bytes.get(index)? {
                        b'\n' | b'\r' => return None,
                        b'\\' => index += 2,
                        b']' => break,
                        _ => index += 1,
                    }
                }
                index += 1;
            }
            b'/' => {
                index += 1;
                while matches!(bytes.get(index), Some(b'g' | b'i' | b'm' | b's' | b'u' | b'y')) {
                    index += 1;
                }
                return Some(index);
            }
            _ => index += 1,
        }
    }
}

fn slash_starts_regex(bytes: &[u8], slash: usize) -> bool {
    let Some(pos) = prev_significant(bytes, slash) else {
        return true;
    };
    let ch = bytes[pos];
    if REGEX_PRECEDING_CHARS.contains(&ch) {
        return true;
    }
    match ch {
        b'.' => pos > 0 && bytes[pos - 1] == b'.',
        b'+' | b'-' => {
            if pos == 0 || bytes[pos - 1] != ch {
                return true;
            }
            match prev_significant(bytes, pos - 1) {
                None => true,
                Some(before) => !is_name_byte(bytes[before]),
            }
        }
        _ if ends_preceding_word(ch) => {
            let end = pos + 1;
            let mut start = pos;
            while start > 0 && is_name_byte(bytes[start - 1]) {
                start -= 1;
            }
            std::str::from_utf8(&bytes[start..end])
                .map(|word| REGEX_PRECEDING_WORDS.contains(&word))
                .unwrap_or(false)
        }
        _ => false,
    }
}

fn prev_significant(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut index = pos;
    while index > 0 {
        index -= 1;
        if !bytes[index].is_ascii_whitespace() {
            return Some(index);
        }
    }
    None
}

fn ends_preceding_word(byte: u8) -> bool {
    REGEX_PRECEDING_WORDS
        .iter()
        .any(|word| word.as_bytes().last() == Some(&byte))
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

/// Replaces every quoted string and confirmed regex literal longer than two
/// characters with a marker, returning the masked code and the hidden texts.
pub fn mask_literals(code: &str) -> (String, Vec<HiddenLiteral>) {
    let mut hidden = Vec::new();
    let bytes = code.as_bytes();
    let mut out = String::with_capacity(code.len());
    let mut copied = 0usize;
    let mut index = 0usize;
    while index < bytes.len() {
        let end = match bytes[index] {
            byte if is_quote(byte) => string_end(code, index),
            b'/' => regex_end(code, index),
            _ => None,
        };
        match end {
            Some(end) => {
                if hide_literal(&code[copied..index], &code[index..end], &mut out, &mut hidden) {
                    copied = end;
                }
                index = end;
            }
            None => index += 1,
        }
    }
    out.push_str(&code[copied..]);
    (out, hidden)
}

/// Appends `lead` and a marker for `literal` to `out`, recording the literal.
/// Literals of two characters or fewer cannot hold a bracket and are left in
/// place; returns whether `literal` was hidden.
pub(crate) fn hide_literal(
    lead: &str,
    literal: &str,
    out: &mut String,
    hidden: &mut Vec<HiddenLiteral>,
) -> bool {
    if literal.len() <= 2 {
        return false;
    }
    out.push_str(lead);
    out.push_str(&marker(hidden.len()));
    hidden.push(HiddenLiteral {
        text: literal.to_string(),
    });
    true
}

/// Puts hidden literals back in place of their markers.
pub fn restore_literals(code: &str, hidden: &[HiddenLiteral]) -> String {
    let mut out = String::with_capacity(code.len());
    let mut copied = 0usize;
    let mut search = 0usize;
    while let Some(offset) = code[search..].find(LITERAL_MARKER) {
        let pos = search + offset;
        match parse_marker(code, pos) {
            Some((index, end)) if index < hidden.len() => {
                out.push_str(&code[copied..pos]);
                out.push_str(&hidden[index].escaped_text());
                copied = end;
                search = end;
            }
            _ => search = pos + LITERAL_MARKER.len_utf8(),
        }
    }
    out.push_str(&code[copied..]);
    out
}
