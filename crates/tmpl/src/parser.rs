//! Expression parser.
//!
//! Precedence climbing over the token stream from [`crate::lexer`]. While
//! building the tree the parser also decides whether the expression needs an
//! error guard: any free identifier that is dereferenced or called can fail at
//! render time when the context lacks it.

use std::sync::Arc;

use regex::RegexBuilder;

use crate::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use crate::diagnostics::{Diagnostic, Span};
use crate::lexer::{lex, radix_of, Token, TokenKind};
use crate::literals::HiddenLiteral;
use crate::runtime::values::{RegexValue, Value};
use crate::syntax;

/// Deepest expression nesting accepted.
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone)]
pub struct ParsedExpr {
    pub expr: Expr,
    /// Evaluation errors are caught and reported instead of propagated.
    pub guarded: bool,
}

/// Parses one normalized fragment, resolving literal markers through `hidden`.
pub fn parse_expression(source: &str, hidden: &[HiddenLiteral]) -> Result<ParsedExpr, Diagnostic> {
    let tokens = lex(source, hidden)?;
    let mut parser = Parser::new(tokens, source);
    let expr = parser.parse_root()?;
    Ok(ParsedExpr {
        expr,
        guarded: parser.guarded,
    })
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
    depth: usize,
    guarded: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            depth: 0,
            guarded: false,
        }
    }

    fn parse_root(&mut self) -> Result<Expr, Diagnostic> {
        let expr = self.parse_expr()?;
        if let Some(token) = self.tokens.get(self.pos) {
            return Err(self.unexpected(token));
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr, Diagnostic> {
        let span = self.peek_span();
        self.enter(span)?;
        let expr = self.parse_conditional()?;
        self.depth -= 1;
        Ok(expr)
    }

    /// Counts one more level of tree depth. Chains built in a loop enter once
    /// per link, so the counter bounds the depth of the finished tree.
    fn enter(&mut self, span: Span) -> Result<(), Diagnostic> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.diag("E2103", "expression nesting is too deep", span));
        }
        Ok(())
    }

    fn parse_conditional(&mut self) -> Result<Expr, Diagnostic> {
        let test = self.parse_binary(0)?;
        if !self.consume_symbol("?") {
            return Ok(test);
        }
        let then = self.parse_expr()?;
        self.expect_symbol(":", "expected ':' in conditional expression")?;
        let otherwise = self.parse_expr()?;
        let span = test.span().merge(otherwise.span());
        Ok(Expr::Conditional {
            test: Box::new(test),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
            span,
        })
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, Diagnostic> {
        let mut left = self.parse_unary()?;
        let mut links = 0usize;
        loop {
            let Some(op) = self.peek_operator() else {
                break;
            };
            let Some(prec) = binary_prec(&op) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let op_span = self.peek_span();
            self.pos += 1;
            links += 1;
            self.enter(op_span)?;
            if op == "instanceof" {
                return Err(self.diag("E2102", "'instanceof' is not supported", op_span));
            }
            let right = self.parse_binary(prec + 1)?;
            let span = left.span().merge(right.span());
            left = match logical_op(&op) {
                Some(op) => Expr::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                },
                None => Expr::Binary {
                    op: binary_op(&op).ok_or_else(|| {
                        self.diag("E2100", format!("unexpected operator '{op}'"), op_span)
                    })?,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                },
            };
        }
        self.depth -= links;
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Err(self.end_of_input());
        };
        let op = match (token.kind, token.text.as_str()) {
            (TokenKind::Symbol, "!") => Some(UnaryOp::Not),
            (TokenKind::Symbol, "-") => Some(UnaryOp::Neg),
            (TokenKind::Symbol, "+") => Some(UnaryOp::Plus),
            (TokenKind::Symbol, "~") => Some(UnaryOp::BitNot),
            (TokenKind::Ident, "typeof") => Some(UnaryOp::TypeOf),
            (TokenKind::Ident, "void") => Some(UnaryOp::Void),
            _ => None,
        };
        let Some(op) = op else {
            return self.parse_postfix();
        };
        self.pos += 1;
        self.enter(token.span)?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        let span = token.span.merge(operand.span());
        Ok(Expr::Unary {
            op,
            expr: Box::new(operand),
            span,
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.parse_primary()?;
        let mut links = 0usize;
        loop {
            if self.peek_postfix() {
                links += 1;
                let span = self.peek_span();
                self.enter(span)?;
            }
            if self.consume_symbol(".") {
                let name = self.expect_property_name()?;
                let span = expr.span().merge(name.span);
                expr = Expr::Member {
                    base: Box::new(expr),
                    name: name.text,
                    optional: false,
                    span,
                };
            } else if self.consume_symbol("?.") {
                if self.consume_symbol("[") {
                    expr = self.finish_index(expr, true)?;
                } else {
                    let name = self.expect_property_name()?;
                    let span = expr.span().merge(name.span);
                    expr = Expr::Member {
                        base: Box::new(expr),
                        name: name.text,
                        optional: true,
                        span,
                    };
                }
            } else if self.consume_symbol("[") {
                expr = self.finish_index(expr, false)?;
            } else if self.consume_symbol("(") {
                let args = self.parse_list(")")?;
                let span = expr.span().merge(self.previous_span());
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    span,
                };
            } else {
                break;
            }
        }
        self.depth -= links;
        Ok(expr)
    }

    fn peek_postfix(&self) -> bool {
        [".", "?.", "[", "("]
            .iter()
            .any(|symbol| self.peek_symbol(symbol))
    }

    fn finish_index(&mut self, base: Expr, optional: bool) -> Result<Expr, Diagnostic> {
        let index = self.parse_expr()?;
        self.expect_symbol("]", "expected ']' after index")?;
        let span = base.span().merge(self.previous_span());
        Ok(Expr::Index {
            base: Box::new(base),
            index: Box::new(index),
            optional,
            span,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, Diagnostic> {
        let Some(token) = self.tokens.get(self.pos).cloned() else {
            return Err(self.end_of_input());
        };
        self.pos += 1;
        let span = token.span;
        match token.kind {
            TokenKind::Number => Ok(Expr::Literal {
                value: Value::Number(self.parse_number(&token)?),
                span,
            }),
            TokenKind::String => Ok(Expr::Literal {
                value: Value::Text(token.text),
                span,
            }),
            TokenKind::Regex => Ok(Expr::Literal {
                value: Value::Regex(self.compile_regex(&token)?),
                span,
            }),
            TokenKind::Ident => self.parse_name(token),
            TokenKind::Symbol => match token.text.as_str() {
                "(" => {
                    let expr = self.parse_expr()?;
                    self.expect_symbol(")", "expected ')'")?;
                    Ok(expr)
                }
                "[" => {
                    let items = self.parse_list("]")?;
                    Ok(Expr::Array {
                        items,
                        span: span.merge(self.previous_span()),
                    })
                }
                "{" => self.parse_object(span),
                _ => Err(self.unexpected(&token)),
            },
        }
    }

    fn parse_name(&mut self, token: Token) -> Result<Expr, Diagnostic> {
        let span = token.span;
        let name = token.text;
        match name.as_str() {
            "true" => Ok(Expr::Literal {
                value: Value::Bool(true),
                span,
            }),
            "false" => Ok(Expr::Literal {
                value: Value::Bool(false),
                span,
            }),
            "null" => Ok(Expr::Literal {
                value: Value::Null,
                span,
            }),
            "undefined" => Ok(Expr::Literal {
                value: Value::Undefined,
                span,
            }),
            "new" => Err(self.diag("E2102", "'new' is not supported", span)),
            "in" | "instanceof" => Err(self.diag(
                "E2100",
                format!("unexpected keyword '{name}'"),
                span,
            )),
            _ if syntax::is_special_name(&name) => {
                self.check_special_access();
                if name == "this" {
                    Ok(Expr::This { span })
                } else {
                    Ok(Expr::GlobalScope { span })
                }
            }
            _ if syntax::is_reserved_name(&name) => Ok(Expr::Global { name, span }),
            _ => {
                if self.peek_symbol(".")
                    || self.peek_symbol("?.")
                    || self.peek_symbol("(")
                    || self.peek_symbol("[")
                {
                    self.guarded = true;
                }
                Ok(Expr::Ident { name, span })
            }
        }
    }

    /// `this`, `global` and `window` stay unguarded only for a single plain
    /// property read.
    fn check_special_access(&mut self) {
        let plain_read = self.peek_symbol(".")
            && self
                .tokens
                .get(self.pos + 1)
                .is_some_and(|token| token.kind == TokenKind::Ident)
            && !self.tokens.get(self.pos + 2).is_some_and(|token| {
                token.kind == TokenKind::Symbol
                    && matches!(token.text.as_str(), "." | "[" | "(" | "?.")
            });
        if !plain_read {
            self.guarded = true;
        }
    }

    fn parse_object(&mut self, open: Span) -> Result<Expr, Diagnostic> {
        let mut fields = Vec::new();
        loop {
            if self.consume_symbol("}") {
                break;
            }
            let Some(token) = self.tokens.get(self.pos).cloned() else {
                return Err(self.end_of_input());
            };
            self.pos += 1;
            let key = match token.kind {
                TokenKind::Ident | TokenKind::String => token.text.clone(),
                TokenKind::Number => {
                    crate::runtime::values::format_number(self.parse_number(&token)?)
                }
                _ => return Err(self.unexpected(&token)),
            };
            let value = if self.consume_symbol(":") {
                self.parse_expr()?
            } else if token.kind == TokenKind::Ident
                && (self.peek_symbol(",") || self.peek_symbol("}"))
            {
                Expr::Ident {
                    name: key.clone(),
                    span: token.span,
                }
            } else {
                let span = self.peek_span();
                return Err(self.diag("E2100", "expected ':' after property name", span));
            };
            fields.push((key, value));
            if !self.consume_symbol(",") {
                self.expect_symbol("}", "expected ',' or '}' in object literal")?;
                break;
            }
        }
        Ok(Expr::Object {
            fields,
            span: open.merge(self.previous_span()),
        })
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed.
    fn parse_list(&mut self, close: &str) -> Result<Vec<Expr>, Diagnostic> {
        let mut items = Vec::new();
        loop {
            if self.consume_symbol(close) {
                return Ok(items);
            }
            items.push(self.parse_expr()?);
            if !self.consume_symbol(",") {
                self.expect_symbol(close, &format!("expected ',' or '{close}'"))?;
                return Ok(items);
            }
        }
    }

    fn parse_number(&self, token: &Token) -> Result<f64, Diagnostic> {
        let text = token.text.as_str();
        let radix = text
            .strip_prefix('0')
            .and_then(|rest| rest.bytes().next())
            .and_then(radix_of);
        let parsed = match radix {
            Some(radix) => parse_radix(&text[2..], radix),
            None => text.parse::<f64>().ok(),
        };
        parsed.ok_or_else(|| {
            self.diag(
                "E2105",
                format!("invalid number literal '{text}'"),
                token.span,
            )
        })
    }

    fn compile_regex(&self, token: &Token) -> Result<Arc<RegexValue>, Diagnostic> {
        let literal = token.text.as_str();
        let close = literal.rfind('/').unwrap_or(0);
        let source = literal.get(1..close).unwrap_or_default();
        let flags = &literal[close + 1..];
        let pattern = source.replace("\\/", "/");
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()
            .map_err(|err| {
                self.diag(
                    "E2104",
                    format!("unsupported regular expression: {err}"),
                    token.span,
                )
            })?;
        Ok(Arc::new(RegexValue {
            regex,
            source: source.to_string(),
            flags: flags.to_string(),
        }))
    }

    fn expect_property_name(&mut self) -> Result<Token, Diagnostic> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == TokenKind::Ident => {
                self.pos += 1;
                Ok(token.clone())
            }
            Some(token) => Err(self.diag(
                "E2100",
                format!("expected property name, found '{}'", token.text),
                token.span,
            )),
            None => Err(self.end_of_input()),
        }
    }

    /// Binary operator text at the cursor; `in`/`instanceof` are words.
    fn peek_operator(&self) -> Option<String> {
        let token = self.tokens.get(self.pos)?;
        match token.kind {
            TokenKind::Symbol => Some(token.text.clone()),
            TokenKind::Ident if matches!(token.text.as_str(), "in" | "instanceof") => {
                Some(token.text.clone())
            }
            _ => None,
        }
    }

    fn consume_symbol(&mut self, symbol: &str) -> bool {
        if self.peek_symbol(symbol) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn peek_symbol(&self, symbol: &str) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|token| token.kind == TokenKind::Symbol && token.text == symbol)
    }

    fn expect_symbol(&mut self, symbol: &str, message: &str) -> Result<Span, Diagnostic> {
        if self.consume_symbol(symbol) {
            return Ok(self.previous_span());
        }
        match self.tokens.get(self.pos) {
            Some(token) if is_unsupported_symbol(&token.text) => Err(self.unexpected(token)),
            Some(token) => Err(self.diag("E2100", message, token.span)),
            None => Err(self.end_of_input()),
        }
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|token| token.span)
            .unwrap_or_else(|| Span::new(self.source.len(), self.source.len()))
    }

    fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map(|token| token.span)
            .unwrap_or_else(|| Span::new(0, 0))
    }

    fn unexpected(&self, token: &Token) -> Diagnostic {
        if token.kind == TokenKind::Symbol && is_unsupported_symbol(&token.text) {
            return self.diag(
                "E2102",
                format!("'{}' is not supported in template expressions", token.text),
                token.span,
            );
        }
        self.diag(
            "E2100",
            format!("unexpected token '{}'", token.text),
            token.span,
        )
    }

    fn end_of_input(&self) -> Diagnostic {
        let end = self.source.len();
        self.diag("E2101", "unexpected end of expression", Span::new(end, end))
    }

    fn diag(&self, code: &str, message: impl Into<String>, span: Span) -> Diagnostic {
        Diagnostic::new(code, message, self.source, span)
    }
}

/// Assignment, arrows, spread, update operators and statements.
/// Digits in `radix` folded into a float, so values past `u64` round
/// instead of overflowing.
fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0f64, |acc, ch| {
        ch.to_digit(radix)
            .map(|digit| acc * f64::from(radix) + f64::from(digit))
    })
}

fn is_unsupported_symbol(symbol: &str) -> bool {
    matches!(symbol, "=" | "=>" | "..." | "++" | "--" | ";")
}

fn binary_prec(op: &str) -> Option<u8> {
    let prec = match op {
        "||" | "??" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" | "===" | "!==" => 6,
        "<" | ">" | "<=" | ">=" | "in" | "instanceof" => 7,
        "+" | "-" => 8,
        "*" | "/" | "%" => 9,
        _ => return None,
    };
    Some(prec)
}

fn logical_op(op: &str) -> Option<LogicalOp> {
    match op {
        "&&" => Some(LogicalOp::And),
        "||" => Some(LogicalOp::Or),
        "??" => Some(LogicalOp::Coalesce),
        _ => None,
    }
}

fn binary_op(op: &str) -> Option<BinaryOp> {
    let op = match op {
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "%" => BinaryOp::Rem,
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "<" => BinaryOp::Lt,
        ">" => BinaryOp::Gt,
        "<=" => BinaryOp::Le,
        ">=" => BinaryOp::Ge,
        "in" => BinaryOp::In,
        "==" => BinaryOp::LooseEq,
        "!=" => BinaryOp::LooseNe,
        "===" => BinaryOp::StrictEq,
        "!==" => BinaryOp::StrictNe,
        "&" => BinaryOp::BitAnd,
        "^" => BinaryOp::BitXor,
        "|" => BinaryOp::BitOr,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
mod tests;
