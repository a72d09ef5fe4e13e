//! Template assembly: turns split parts into a renderable [`CompiledTemplate`].
//!
//! A template that is exactly one expression renders in raw mode and keeps the
//! native value type. Anything else renders in text mode, where literal text
//! and expression results are joined into one string.

use crate::brackets::BracketSet;
use crate::diagnostics::{Diagnostic, Span};
use crate::literals::{self, HiddenLiteral};
use crate::parser::{parse_expression, ParsedExpr};
use crate::runtime::{self, EvalError, Globals, Scope, Value};
use crate::splitter::{self, PartKind};
use crate::syntax::LITERAL_MARKER;
use crate::TmplError;

/// One parsed expression fragment.
#[derive(Debug, Clone)]
pub struct CompiledExpr {
    pub parsed: ParsedExpr,
}

impl CompiledExpr {
    /// Evaluates the fragment. A guarded failure goes to `on_error` and
    /// yields `undefined`; an unguarded one is returned.
    fn eval(
        &self,
        scope: &Scope<'_>,
        on_error: &dyn Fn(EvalError),
    ) -> Result<Value, EvalError> {
        match runtime::eval(&self.parsed.expr, scope) {
            Ok(value) => Ok(value),
            Err(err) if self.parsed.guarded => {
                on_error(err);
                Ok(Value::Undefined)
            }
            Err(err) => Err(err),
        }
    }
}

/// `name: expr` entry of a class/attribute shorthand list.
#[derive(Debug, Clone)]
pub struct ShorthandEntry {
    pub name: String,
    pub value: CompiledExpr,
}

#[derive(Debug, Clone)]
pub enum Fragment {
    Plain(CompiledExpr),
    Shorthand(Vec<ShorthandEntry>),
}

impl Fragment {
    fn render(
        &self,
        scope: &Scope<'_>,
        as_text: bool,
        on_error: &dyn Fn(EvalError),
    ) -> Result<Value, EvalError> {
        match self {
            Fragment::Plain(expr) => {
                let value = expr.eval(scope, on_error)?;
                if as_text && !value.is_truthy() && !is_zero(&value) {
                    return Ok(Value::text(""));
                }
                Ok(value)
            }
            Fragment::Shorthand(entries) => {
                let mut names = Vec::with_capacity(entries.len());
                for entry in entries {
                    let on = entry.value.eval(scope, on_error)?.is_truthy();
                    names.push(if on { entry.name.as_str() } else { "" });
                }
                if let [single] = names.as_slice() {
                    return Ok(Value::text(*single));
                }
                Ok(Value::text(names.join(" ").trim()))
            }
        }
    }
}

fn is_zero(value: &Value) -> bool {
    matches!(value, Value::Number(number) if *number == 0.0)
}

#[derive(Debug, Clone)]
pub enum Segment {
    Text(String),
    Expr(Fragment),
}

#[derive(Debug, Clone)]
pub enum Renderer {
    /// The template is a single expression; its value is returned as-is.
    Raw(Fragment),
    Text(Vec<Segment>),
}

#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    template: String,
    renderer: Renderer,
}

impl CompiledTemplate {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn is_raw(&self) -> bool {
        matches!(self.renderer, Renderer::Raw(_))
    }

    pub fn render(
        &self,
        context: &Value,
        globals: &Globals,
        on_error: &dyn Fn(EvalError),
    ) -> Result<Value, EvalError> {
        let scope = Scope::new(context, globals);
        match &self.renderer {
            Renderer::Raw(fragment) => fragment.render(&scope, false, on_error),
            Renderer::Text(segments) => match segments.as_slice() {
                [] => Ok(Value::Undefined),
                [single] => render_segment(single, &scope, on_error),
                _ => {
                    let mut out = String::new();
                    for segment in segments {
                        let value = render_segment(segment, &scope, on_error)?;
                        if !value.is_nullish() {
                            out.push_str(&value.to_string());
                        }
                    }
                    Ok(Value::Text(out))
                }
            },
        }
    }
}

fn render_segment(
    segment: &Segment,
    scope: &Scope<'_>,
    on_error: &dyn Fn(EvalError),
) -> Result<Value, EvalError> {
    match segment {
        Segment::Text(text) => Ok(Value::text(text.clone())),
        Segment::Expr(fragment) => fragment.render(scope, true, on_error),
    }
}

pub fn compile_template(template: &str, brackets: &BracketSet) -> Result<CompiledTemplate, TmplError> {
    let normalized = template.replace(LITERAL_MARKER, "\"");
    let split = splitter::split(&normalized, brackets);
    let compile_err = |diagnostic: Diagnostic| TmplError::Compile {
        template: template.to_string(),
        diagnostic,
    };

    let renderer = match split.sole_expression() {
        Some(expr) if compact(expr).is_empty() => Renderer::Text(Vec::new()),
        Some(expr) => Renderer::Raw(compile_fragment(expr, &split.hidden).map_err(compile_err)?),
        None => {
            let mut segments = Vec::new();
            for part in &split.parts {
                match part.kind {
                    PartKind::Text if !part.raw.is_empty() => {
                        segments.push(Segment::Text(normalize_eols(&part.raw)));
                    }
                    PartKind::Text => {}
                    PartKind::Expression => {
                        if compact(&part.raw).is_empty() {
                            continue;
                        }
                        let fragment =
                            compile_fragment(&part.raw, &split.hidden).map_err(compile_err)?;
                        segments.push(Segment::Expr(fragment));
                    }
                }
            }
            Renderer::Text(segments)
        }
    };

    tracing::debug!(template, raw = matches!(renderer, Renderer::Raw(_)), "compiled template");
    Ok(CompiledTemplate {
        template: template.to_string(),
        renderer,
    })
}

fn normalize_eols(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Collapses whitespace runs to one space and trims.
fn compact(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn compile_fragment(raw: &str, hidden: &[HiddenLiteral]) -> Result<Fragment, Diagnostic> {
    let source = compact(raw);
    if shorthand_name(&source, 0, hidden).is_none() {
        return Ok(Fragment::Plain(compile_expr(&source, hidden)?));
    }

    let mut entries = Vec::new();
    let mut pos = 0usize;
    while pos < source.len() {
        let Some((name, body_start)) = shorthand_name(&source, pos, hidden) else {
            tracing::warn!(
                expression = %source,
                ignored = &source[pos..],
                "ignoring trailing text in shorthand list"
            );
            break;
        };
        let body_end = entry_end(&source, body_start);
        let body = source[body_start..body_end].trim();
        if body.is_empty() {
            return Err(Diagnostic::new(
                "E2200",
                format!("shorthand entry '{name}' has no expression"),
                &source,
                Span::new(pos, body_end),
            ));
        }
        entries.push(ShorthandEntry {
            name,
            value: compile_expr(body, hidden)?,
        });
        pos = (body_end + 1).min(source.len());
        while source[pos..].starts_with(' ') {
            pos += 1;
        }
    }
    Ok(Fragment::Shorthand(entries))
}

fn compile_expr(source: &str, hidden: &[HiddenLiteral]) -> Result<CompiledExpr, Diagnostic> {
    Ok(CompiledExpr {
        parsed: parse_expression(source, hidden)?,
    })
}

/// Matches a shorthand name and its colon at `pos`: an unquoted CSS-style name
/// or a masked quoted string. Returns the name and the offset after the colon.
fn shorthand_name(source: &str, pos: usize, hidden: &[HiddenLiteral]) -> Option<(String, usize)> {
    let rest = &source[pos..];
    let (name, len) = if rest.starts_with(LITERAL_MARKER) {
        let (index, end) = literals::parse_marker(source, pos)?;
        let literal = hidden.get(index)?;
        if literal.is_regex() {
            return None;
        }
        let inner = literal
            .text
            .get(1..literal.text.len().saturating_sub(1))
            .unwrap_or_default();
        (compact(inner), end - pos)
    } else {
        let len = css_name_len(rest)?;
        (rest[..len].to_string(), len)
    };

    let mut after = pos + len;
    if source[after..].starts_with(' ') {
        after += 1;
    }
    source[after..].starts_with(':').then_some((name, after + 1))
}

/// Length of `-?[_A-Za-z\xA0-\xFF][-0-9A-Za-z_\xA0-\xFF]*` at the start of `text`.
fn css_name_len(text: &str) -> Option<usize> {
    let is_latin1_letter = |ch: char| ('\u{A0}'..='\u{FF}').contains(&ch);
    let mut chars = text.char_indices().peekable();
    if let Some((_, '-')) = chars.peek() {
        chars.next();
    }
    let (_, first) = chars.next()?;
    if !(first == '_' || first.is_ascii_alphabetic() || is_latin1_letter(first)) {
        return None;
    }
    let mut end = text.len();
    for (index, ch) in chars {
        if !(ch == '-' || ch == '_' || ch.is_ascii_alphanumeric() || is_latin1_letter(ch)) {
            end = index;
            break;
        }
    }
    Some(end)
}

/// Offset of the comma ending the entry that starts at `start`, or the end
/// of the text. Bracketed blocks are skipped counting only their own type.
fn entry_end(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut index = start;
    while index < bytes.len() {
        match bytes[index] {
            b',' => return index,
            byte => match BracketSet::nest_closer(byte) {
                Some(closer) => {
                    let mut depth = 1usize;
                    index += 1;
                    while index < bytes.len() && depth > 0 {
                        if bytes[index] == byte {
                            depth += 1;
                        } else if bytes[index] == closer {
                            depth -= 1;
                        }
                        index += 1;
                    }
                }
                None => index += 1,
            },
        }
    }
    bytes.len()
}
