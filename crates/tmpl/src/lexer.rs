use crate::diagnostics::{Diagnostic, Span};
use crate::literals::{self, HiddenLiteral};
use crate::syntax::{self, LITERAL_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    /// Decoded string contents.
    String,
    /// Full `/source/flags` literal.
    Regex,
    Symbol,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

/// Tokenizes one normalized expression fragment.
///
/// Markers left by the splitter are resolved against `hidden` and lexed as the
/// literal they stand for, so the parser never sees marker text.
pub fn lex(source: &str, hidden: &[HiddenLiteral]) -> Result<Vec<Token>, Diagnostic> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut index = 0usize;

    while index < bytes.len() {
        let byte = bytes[index];

        if byte.is_ascii_whitespace() {
            index += 1;
            continue;
        }

        if source[index..].starts_with(LITERAL_MARKER) {
            let Some((slot, end)) = literals::parse_marker(source, index) else {
                return Err(unexpected_char(source, index));
            };
            let span = Span::new(index, end);
            let literal = hidden.get(slot).ok_or_else(|| {
                Diagnostic::new("E2003", "dangling literal marker", source, span)
            })?;
            tokens.push(lex_literal(&literal.text, source, span)?);
            index = end;
            continue;
        }

        if literals::is_quote(byte) {
            let Some(end) = literals::string_end(source, index) else {
                return Err(Diagnostic::new(
                    "E2001",
                    "unterminated string literal",
                    source,
                    Span::new(index, bytes.len()),
                ));
            };
            let span = Span::new(index, end);
            tokens.push(lex_literal(&source[index..end], source, span)?);
            index = end;
            continue;
        }

        if syntax::is_ident_start(byte as char) {
            let start = index;
            while index < bytes.len() && syntax::is_ident_continue(bytes[index] as char) {
                index += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident,
                text: source[start..index].to_string(),
                span: Span::new(start, index),
            });
            continue;
        }

        if byte.is_ascii_digit()
            || (byte == b'.' && bytes.get(index + 1).is_some_and(u8::is_ascii_digit))
        {
            let end = number_end(bytes, index);
            if bytes.get(end).is_some_and(|b| syntax::is_ident_start(*b as char)) {
                return Err(Diagnostic::new(
                    "E2005",
                    "identifier starts immediately after numeric literal",
                    source,
                    Span::new(index, end + 1),
                ));
            }
            tokens.push(Token {
                kind: TokenKind::Number,
                text: source[index..end].to_string(),
                span: Span::new(index, end),
            });
            index = end;
            continue;
        }

        if let Some((symbol, len)) = match_symbol(bytes, index) {
            tokens.push(Token {
                kind: TokenKind::Symbol,
                text: symbol.to_string(),
                span: Span::new(index, index + len),
            });
            index += len;
            continue;
        }

        return Err(unexpected_char(source, index));
    }

    Ok(tokens)
}

fn unexpected_char(source: &str, index: usize) -> Diagnostic {
    let ch = source[index..].chars().next().unwrap_or('?');
    Diagnostic::new(
        "E2000",
        format!("unexpected character '{ch}'"),
        source,
        Span::new(index, index + ch.len_utf8()),
    )
}

/// Lexes a complete string or regex literal standing at `span`.
fn lex_literal(literal: &str, source: &str, span: Span) -> Result<Token, Diagnostic> {
    if literal.starts_with('/') {
        return Ok(Token {
            kind: TokenKind::Regex,
            text: literal.to_string(),
            span,
        });
    }
    let quote = literal.chars().next().unwrap_or('"');
    let inner = literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or_default();
    if quote == '`' && inner.contains("${") {
        return Err(Diagnostic::new(
            "E2004",
            "template literal substitutions are not supported",
            source,
            span,
        ));
    }
    let text = decode_string(inner).ok_or_else(|| {
        Diagnostic::new("E2002", "invalid escape sequence in string literal", source, span)
    })?;
    Ok(Token {
        kind: TokenKind::String,
        text,
        span,
    })
}

/// Decodes JavaScript string escapes.
pub fn decode_string(inner: &str) -> Option<String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let esc = chars.next()?;
        match esc {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let hex: String = (0..2).filter_map(|_| chars.next()).collect();
                out.push(hex_char(&hex, 2)?);
            }
            'u' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let mut hex = String::new();
                    loop {
                        match chars.next()? {
                            '}' => break,
                            c => hex.push(c),
                        }
                    }
                    if hex.is_empty() || hex.len() > 6 {
                        return None;
                    }
                    out.push(hex_char(&hex, hex.len())?);
                } else {
                    let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                    out.push(hex_char(&hex, 4)?);
                }
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }
    Some(out)
}

fn hex_char(hex: &str, len: usize) -> Option<char> {
    if hex.len() != len || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Radix named by the letter after a leading `0` (`0x`, `0o`, `0b`).
pub(crate) fn radix_of(letter: u8) -> Option<u32> {
    match letter {
        b'x' | b'X' => Some(16),
        b'o' | b'O' => Some(8),
        b'b' | b'B' => Some(2),
        _ => None,
    }
}

fn number_end(bytes: &[u8], start: usize) -> usize {
    let mut index = start;
    if bytes[index] == b'0' {
        if let Some(radix) = bytes.get(index + 1).and_then(|b| radix_of(*b)) {
            index += 2;
            while bytes
                .get(index)
                .is_some_and(|b| (*b as char).is_digit(radix))
            {
                index += 1;
            }
            return index;
        }
    }
    while bytes.get(index).is_some_and(u8::is_ascii_digit) {
        index += 1;
    }
    if bytes.get(index) == Some(&b'.') {
        index += 1;
        while bytes.get(index).is_some_and(u8::is_ascii_digit) {
            index += 1;
        }
    }
    if matches!(bytes.get(index), Some(b'e' | b'E')) {
        let mut exp = index + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            index = exp;
            while bytes.get(index).is_some_and(u8::is_ascii_digit) {
                index += 1;
            }
        }
    }
    index
}

fn match_symbol(bytes: &[u8], index: usize) -> Option<(&'static str, usize)> {
    let at = |offset: usize| bytes.get(index + offset).map(|b| *b as char);

    for (needle, symbol) in syntax::SYMBOLS_3 {
        if at(0) == Some(needle[0]) && at(1) == Some(needle[1]) && at(2) == Some(needle[2]) {
            return Some((symbol, 3));
        }
    }

    for (needle, symbol) in syntax::SYMBOLS_2 {
        if at(0) == Some(needle[0]) && at(1) == Some(needle[1]) {
            // `a?.5:1` is a conditional, not optional chaining.
            if *symbol == "?." && at(2).is_some_and(|c| c.is_ascii_digit()) {
                continue;
            }
            return Some((symbol, 2));
        }
    }

    let ch = at(0)?;
    syntax::SYMBOLS_1
        .iter()
        .position(|candidate| *candidate == ch)
        .map(|position| (SYMBOL_1_TEXT[position], 1))
}

const SYMBOL_1_TEXT: &[&str] = &[
    "+", "-", "*", "/", "%", "<", ">", "!", "~", "?", ":", ".", ",", "(", ")", "[", "]", "{", "}",
    "&", "|", "^", "=", ";",
];
