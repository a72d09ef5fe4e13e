//! Splits a template into literal text and bracketed expressions.
//!
//! The scanner walks the template once, alternating between text and
//! expression state. Inside an expression, quoted strings and regex literals
//! are consumed whole (and masked when longer than a quote pair) so bracket
//! characters inside them are never counted, and nested `(`, `[` and `{`
//! blocks are skipped by depth.

use serde::Serialize;

use crate::brackets::BracketSet;
use crate::literals::{self, HiddenLiteral};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PartKind {
    Text,
    Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplatePart {
    pub kind: PartKind,
    pub raw: String,
}

impl TemplatePart {
    pub fn is_expression(&self) -> bool {
        self.kind == PartKind::Expression
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitTemplate {
    pub parts: Vec<TemplatePart>,
    /// Literals masked out of expression parts, indexed by their markers.
    pub hidden: Vec<HiddenLiteral>,
}

impl SplitTemplate {
    /// The single expression of a template that is nothing but one expression.
    pub fn sole_expression(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [part] if part.is_expression() => Some(part.raw.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    Expression,
}

pub fn split(template: &str, brackets: &BracketSet) -> SplitTemplate {
    Splitter::new(template, brackets).run()
}

struct Splitter<'a> {
    src: &'a str,
    bytes: &'a [u8],
    brackets: &'a BracketSet,
    state: State,
    /// Start of the part text not yet copied into `pending`.
    start: usize,
    /// Part text collected so far, with literals already replaced by markers.
    pending: String,
    out: SplitTemplate,
}

impl<'a> Splitter<'a> {
    fn new(src: &'a str, brackets: &'a BracketSet) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            brackets,
            state: State::Text,
            start: 0,
            pending: String::new(),
            out: SplitTemplate::default(),
        }
    }

    fn run(mut self) -> SplitTemplate {
        let brackets = self.brackets;
        let open = brackets.open().as_bytes();
        let close = brackets.close().as_bytes();
        let len = self.bytes.len();
        let mut pos = 0usize;

        while pos < len {
            let byte = self.bytes[pos];
            match self.state {
                State::Text => {
                    if byte == b'\\' && self.at(pos + 1, open) {
                        pos += 1 + open.len();
                    } else if self.at(pos, open) {
                        self.finish_part(pos);
                        pos += open.len();
                        self.start = pos;
                        self.state = State::Expression;
                    } else {
                        pos += 1;
                    }
                }
                State::Expression => {
                    if byte == b'\\' && self.at(pos + 1, close) {
                        pos += 1 + close.len();
                    } else if let Some(closer) = BracketSet::nest_closer(byte) {
                        pos = self.skip_nested(pos, byte, closer);
                    } else if self.at(pos, close) {
                        self.finish_part(pos);
                        pos += close.len();
                        self.start = pos;
                        self.state = State::Text;
                    } else {
                        pos = self.skip_literal(pos).unwrap_or(pos + 1);
                    }
                }
            }
        }

        if self.start < len || !self.pending.is_empty() {
            self.finish_part(len);
        }
        self.out
    }

    fn at(&self, pos: usize, token: &[u8]) -> bool {
        self.bytes
            .get(pos..)
            .is_some_and(|rest| rest.starts_with(token))
    }

    /// Consumes a string or regex literal at `pos`, returning where scanning resumes.
    fn skip_literal(&mut self, pos: usize) -> Option<usize> {
        let byte = self.bytes[pos];
        if literals::is_quote(byte) {
            let end = literals::string_end(self.src, pos)?;
            self.hide(pos, end);
            return Some(end);
        }
        if byte == b'/' && !matches!(self.bytes.get(pos + 1), Some(b'*' | b'/')) {
            let end = literals::skip_regex(self.src, pos);
            self.hide(pos, end);
            return Some(end);
        }
        None
    }

    /// Skips a bracketed block counting only `opener`/`closer`. An unbalanced
    /// block swallows the rest of the template.
    fn skip_nested(&mut self, pos: usize, opener: u8, closer: u8) -> usize {
        let mut depth = 1usize;
        let mut index = pos + 1;
        while index < self.bytes.len() {
            let byte = self.bytes[index];
            if byte == opener {
                depth += 1;
                index += 1;
            } else if byte == closer {
                depth -= 1;
                index += 1;
                if depth == 0 {
                    return index;
                }
            } else {
                index = self.skip_literal(index).unwrap_or(index + 1);
            }
        }
        self.bytes.len()
    }

    fn hide(&mut self, pos: usize, end: usize) {
        let src = self.src;
        if literals::hide_literal(
            &src[self.start..pos],
            &src[pos..end],
            &mut self.pending,
            &mut self.out.hidden,
        ) {
            self.start = end;
        }
    }

    fn finish_part(&mut self, end: usize) {
        let mut raw = std::mem::take(&mut self.pending);
        raw.push_str(&self.src[self.start..end]);
        let kind = match self.state {
            State::Text => PartKind::Text,
            State::Expression => PartKind::Expression,
        };
        if kind == PartKind::Text && raw.is_empty() && self.out.parts.is_empty() {
            return;
        }
        self.out.parts.push(TemplatePart {
            kind,
            raw: self.brackets.unescape(&raw),
        });
    }
}

#[cfg(test)]
mod tests;
