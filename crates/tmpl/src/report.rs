//! Runtime failure reporting for guarded expressions.

use std::sync::Arc;

use crate::runtime::{EvalError, Value};

/// Host callback for guarded failures. Receives the annotated failure and the
/// context the template was rendered against.
pub type ErrorHandler = Arc<dyn Fn(&TemplateFailure, &Value) + Send + Sync>;

/// A guarded evaluation failure, annotated with the rendering component.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error} (in template `{template}`)")]
pub struct TemplateFailure {
    pub error: EvalError,
    /// `context.__.tagName`, when present.
    pub tag_name: Option<String>,
    /// `context._riot_id`, when present.
    pub id: Option<String>,
    pub template: String,
}

impl TemplateFailure {
    pub fn new(error: EvalError, template: &str, context: &Value) -> Self {
        let tag_name = context
            .field("__")
            .and_then(|meta| meta.field("tagName"))
            .and_then(present);
        let id = context.field("_riot_id").and_then(present);
        Self {
            error,
            tag_name,
            id,
            template: template.to_string(),
        }
    }
}

fn present(value: &Value) -> Option<String> {
    (!value.is_nullish()).then(|| value.to_string())
}

/// Where guarded failures go when a template is rendered.
#[derive(Clone)]
pub enum Reporter {
    Handler(ErrorHandler),
    Log,
    Silent,
}

impl Reporter {
    pub fn report(&self, failure: &TemplateFailure, context: &Value) {
        match self {
            Reporter::Handler(handler) => handler(failure, context),
            Reporter::Log => log_failure(failure),
            Reporter::Silent => {}
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reporter::Handler(_) => f.write_str("Handler(..)"),
            Reporter::Log => f.write_str("Log"),
            Reporter::Silent => f.write_str("Silent"),
        }
    }
}

/// Default sink: an `error!` event, preceded by a line naming the tag when
/// the context carries one.
pub fn log_failure(failure: &TemplateFailure) {
    if let Some(tag) = &failure.tag_name {
        tracing::error!("template error thrown in the <{tag}> tag");
    }
    tracing::error!(
        tag_name = failure.tag_name.as_deref(),
        id = failure.id.as_deref(),
        template = %failure.template,
        error = %failure.error,
        "template evaluation failed"
    );
}
