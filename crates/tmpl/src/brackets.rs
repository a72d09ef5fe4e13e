//! Bracket pair configuration.
//!
//! A [`BracketSet`] is the grammar every other stage reads: the open/close
//! tokens, the "does this text contain an expression" probe and the loop
//! specification patterns. Sets are immutable; reconfiguring means building
//! a new one.

use regex::Regex;
use serde::Serialize;

pub const DEFAULT_BRACKETS: &str = "{ }";

const LOOP_BARE: &str = r"^\s*([$0-9A-Za-z_]+)(?:\s*,\s*(\S+))?\s+in\s+(\S.*?)\s*$";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BracketError {
    #[error("unsupported brackets \"{0}\": expected two tokens separated by a single space")]
    WrongTokenCount(String),
    #[error("unsupported brackets \"{pair}\": character {ch:?} is not allowed")]
    UnsupportedCharacter { pair: String, ch: char },
    #[error("unsupported brackets \"{0}\": tokens must not be empty")]
    EmptyToken(String),
    #[error("unsupported brackets \"{0}\": open and close tokens must differ")]
    IdenticalTokens(String),
    #[error("unsupported brackets \"{pair}\": {message}")]
    InvalidPattern { pair: String, message: String },
}

/// Loop bindings extracted from an `each` expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoopSpec {
    pub key: Option<String>,
    pub pos: Option<String>,
    pub val: String,
}

#[derive(Debug, Clone)]
pub struct BracketSet {
    pair: String,
    open: String,
    close: String,
    has_expr: Regex,
    loop_bracketed: Regex,
    loop_bare: Regex,
}

impl BracketSet {
    pub fn new(pair: &str) -> Result<Self, BracketError> {
        let tokens: Vec<&str> = pair.split(' ').collect();
        if tokens.len() != 2 {
            return Err(BracketError::WrongTokenCount(pair.to_string()));
        }
        if let Some(ch) = pair.chars().find(|ch| is_unsupported(*ch)) {
            return Err(BracketError::UnsupportedCharacter {
                pair: pair.to_string(),
                ch,
            });
        }
        let (open, close) = (tokens[0], tokens[1]);
        if open.is_empty() || close.is_empty() {
            return Err(BracketError::EmptyToken(pair.to_string()));
        }
        if open == close {
            return Err(BracketError::IdenticalTokens(pair.to_string()));
        }

        let open_re = regex::escape(open);
        let close_re = regex::escape(close);
        let has_expr = if close.chars().count() == 1 {
            format!(r"(?:^|[^\\]){open_re}[^{close_re}]*{close_re}")
        } else {
            format!(r"(?s)(?:^|[^\\]){open_re}.*?{close_re}")
        };
        let loop_bracketed = format!(
            r"^\s*{open_re}\^?\s*([$0-9A-Za-z_]+)(?:\s*,\s*(\S+))?\s+in\s+(\S.*)\s*{close_re}"
        );

        Ok(Self {
            pair: pair.to_string(),
            open: open.to_string(),
            close: close.to_string(),
            has_expr: compile_derived(pair, &has_expr)?,
            loop_bracketed: compile_derived(pair, &loop_bracketed)?,
            loop_bare: compile_derived(pair, LOOP_BARE)?,
        })
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub fn is_default(&self) -> bool {
        self.pair == DEFAULT_BRACKETS
    }

    /// True if `text` holds at least one unescaped bracketed expression.
    pub fn has_expression(&self, text: &str) -> bool {
        self.has_expr.is_match(text)
    }

    /// Removes the backslash from escaped open/close tokens.
    pub fn unescape(&self, text: &str) -> String {
        if !text.contains('\\') {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(index) = rest.find('\\') {
            out.push_str(&rest[..index]);
            let after = &rest[index + 1..];
            if after.starts_with(self.open.as_str()) || after.starts_with(self.close.as_str()) {
                rest = after;
            } else {
                out.push('\\');
                rest = after;
            }
        }
        out.push_str(rest);
        out
    }

    /// Parses `key[, pos] in collection`, either bare or wrapped in this bracket pair.
    ///
    /// The bracketed form keeps the collection wrapped so it can be evaluated as a
    /// template; the bare form returns the collection expression itself.
    pub fn parse_loop_spec(&self, expr: &str) -> LoopSpec {
        if let Some(caps) = self.loop_bracketed.captures(expr) {
            return LoopSpec {
                key: caps.get(1).map(|m| m.as_str().to_string()),
                pos: caps.get(2).map(|m| m.as_str().to_string()),
                val: format!(
                    "{}{}{}",
                    self.open,
                    caps.get(3).map_or("", |m| m.as_str().trim()),
                    self.close
                ),
            };
        }
        if !expr.trim_start().starts_with(self.open.as_str()) {
            if let Some(caps) = self.loop_bare.captures(expr) {
                return LoopSpec {
                    key: caps.get(1).map(|m| m.as_str().to_string()),
                    pos: caps.get(2).map(|m| m.as_str().to_string()),
                    val: caps.get(3).map_or("", |m| m.as_str().trim()).to_string(),
                };
            }
        }
        LoopSpec {
            key: None,
            pos: None,
            val: expr.trim().to_string(),
        }
    }

    /// Closing character for a nesting bracket inside an expression.
    pub fn nest_closer(ch: u8) -> Option<u8> {
        match ch {
            b'(' => Some(b')'),
            b'[' => Some(b']'),
            b'{' => Some(b'}'),
            _ => None,
        }
    }
}

impl Default for BracketSet {
    fn default() -> Self {
        match Self::new(DEFAULT_BRACKETS) {
            Ok(set) => set,
            Err(err) => unreachable!("default brackets are valid: {err}"),
        }
    }
}

fn is_unsupported(ch: char) -> bool {
    (ch as u32) < 0x20
        || ch.is_ascii_alphanumeric()
        || matches!(ch, '<' | '>' | '\'' | '"' | ',' | ';' | '\\')
}

fn compile_derived(pair: &str, pattern: &str) -> Result<Regex, BracketError> {
    Regex::new(pattern).map_err(|err| BracketError::InvalidPattern {
        pair: pair.to_string(),
        message: err.to_string(),
    })
}
