//! Bracket template expressions.
//!
//! A template mixes literal text with expressions between a configurable
//! bracket pair (`{ }` by default):
//!
//! ```
//! use serde_json::json;
//! use tmpl::Value;
//!
//! let context = Value::from(json!({"name": "Ada", "done": true}));
//! let text = tmpl::evaluate("Hi {name}! { done: done, open: !done }", &context).unwrap();
//! assert_eq!(text, Value::text("Hi Ada! done"));
//! ```
//!
//! Free variables resolve against the context, then the global scope, and
//! never fail on a missing name. Dereferencing one that turns out missing is
//! reported through the active handler and renders as nothing.

pub mod ast;
pub mod brackets;
pub mod cache;
pub mod compile;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod lexer;
pub mod literals;
pub mod parser;
pub mod report;
pub mod runtime;
pub mod splitter;
pub mod syntax;

use std::sync::Arc;

pub use brackets::{BracketError, BracketSet, LoopSpec, DEFAULT_BRACKETS};
pub use compile::{compile_template, CompiledTemplate};
pub use config::{read_config, TmplConfig};
pub use diagnostics::{render_diagnostic, Diagnostic, Span};
pub use engine::{global, Tmpl};
pub use literals::{mask_literals, restore_literals, HiddenLiteral};
pub use report::{ErrorHandler, TemplateFailure};
pub use runtime::{EvalError, Globals, Value};
pub use splitter::{split, PartKind, SplitTemplate, TemplatePart};

#[derive(Debug, thiserror::Error)]
pub enum TmplError {
    #[error(transparent)]
    Brackets(#[from] BracketError),
    #[error("cannot compile template `{template}`: {diagnostic}")]
    Compile {
        template: String,
        diagnostic: Diagnostic,
    },
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// [`Tmpl::evaluate`] on the default context.
pub fn evaluate(template: &str, context: &Value) -> Result<Value, TmplError> {
    global().evaluate(template, context)
}

pub fn compile(template: &str) -> Result<Arc<CompiledTemplate>, TmplError> {
    global().compile(template)
}

pub fn has_expression(text: &str) -> bool {
    global().has_expression(text)
}

pub fn parse_loop_spec(expr: &str) -> LoopSpec {
    global().parse_loop_spec(expr)
}

pub fn set_brackets(pair: &str) -> Result<(), TmplError> {
    global().set_brackets(pair)
}

pub fn brackets() -> String {
    global().brackets()
}

pub fn clear_cache() {
    global().clear_cache();
}

pub fn cache_len() -> usize {
    global().cache_len()
}

pub fn compile_count() -> usize {
    global().compile_count()
}

pub fn set_error_handler(handler: Option<ErrorHandler>) {
    global().set_error_handler(handler);
}
