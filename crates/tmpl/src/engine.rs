//! The compiler context: active brackets, compiled-template cache, global
//! scope and failure reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::brackets::{BracketSet, LoopSpec};
use crate::cache::TemplateCache;
use crate::compile::{compile_template, CompiledTemplate};
use crate::config::TmplConfig;
use crate::report::{ErrorHandler, Reporter, TemplateFailure};
use crate::runtime::{Globals, Value};
use crate::TmplError;

pub struct Tmpl {
    brackets: RwLock<Arc<BracketSet>>,
    cache: TemplateCache,
    globals: Globals,
    handler: RwLock<Option<ErrorHandler>>,
    report_errors: AtomicBool,
}

impl Default for Tmpl {
    fn default() -> Self {
        Self::with_parts(BracketSet::default(), Globals::standard(), true)
    }
}

impl Tmpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TmplConfig) -> Result<Self, TmplError> {
        let brackets = BracketSet::new(&config.brackets)?;
        let globals = Globals::with_extra(config.global_record());
        Ok(Self::with_parts(brackets, globals, config.report_errors))
    }

    /// A context whose global scope also holds `globals`.
    pub fn with_globals(globals: Globals) -> Self {
        Self::with_parts(BracketSet::default(), globals, true)
    }

    fn with_parts(brackets: BracketSet, globals: Globals, report_errors: bool) -> Self {
        Self {
            brackets: RwLock::new(Arc::new(brackets)),
            cache: TemplateCache::new(),
            globals,
            handler: RwLock::new(None),
            report_errors: AtomicBool::new(report_errors),
        }
    }

    /// Renders `template` against `context`. The empty template is returned
    /// unchanged; a sole expression keeps its native type.
    pub fn evaluate(&self, template: &str, context: &Value) -> Result<Value, TmplError> {
        if template.is_empty() {
            return Ok(Value::text(""));
        }
        let compiled = self.compile(template)?;
        let reporter = self.reporter();
        let on_error = |error| {
            reporter.report(&TemplateFailure::new(error, template, context), context);
        };
        Ok(compiled.render(context, &self.globals, &on_error)?)
    }

    /// Compiled form of `template` under the active brackets, from the cache
    /// when possible.
    pub fn compile(&self, template: &str) -> Result<Arc<CompiledTemplate>, TmplError> {
        // Held for the whole compile so a bracket change cannot interleave.
        let brackets = self.brackets.read().unwrap_or_else(PoisonError::into_inner);
        self.cache
            .get_or_compile(template, |text| compile_template(text, &brackets))
    }

    pub fn has_expression(&self, text: &str) -> bool {
        self.current_brackets().has_expression(text)
    }

    pub fn parse_loop_spec(&self, expr: &str) -> LoopSpec {
        self.current_brackets().parse_loop_spec(expr)
    }

    /// Switches to a new bracket pair and flushes every compiled template.
    pub fn set_brackets(&self, pair: &str) -> Result<(), TmplError> {
        let next = BracketSet::new(pair)?;
        let mut brackets = self.brackets.write().unwrap_or_else(PoisonError::into_inner);
        if brackets.pair() == next.pair() {
            return Ok(());
        }
        tracing::debug!(from = brackets.pair(), to = next.pair(), "brackets changed");
        *brackets = Arc::new(next);
        self.cache.clear();
        Ok(())
    }

    pub fn brackets(&self) -> String {
        self.current_brackets().pair().to_string()
    }

    fn current_brackets(&self) -> Arc<BracketSet> {
        Arc::clone(&self.brackets.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn compile_count(&self) -> usize {
        self.cache.compile_count()
    }

    /// Installs (or with `None` removes) the host failure handler. While a
    /// handler is set the default log sink is bypassed.
    pub fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = handler;
    }

    pub fn set_report_errors(&self, enabled: bool) {
        self.report_errors.store(enabled, Ordering::Relaxed);
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    fn reporter(&self) -> Reporter {
        let handler = self.handler.read().unwrap_or_else(PoisonError::into_inner);
        match handler.as_ref() {
            Some(handler) => Reporter::Handler(Arc::clone(handler)),
            None if self.report_errors.load(Ordering::Relaxed) => Reporter::Log,
            None => Reporter::Silent,
        }
    }
}

/// The process-wide default context used by the crate-level functions.
pub fn global() -> &'static Tmpl {
    static DEFAULT: OnceLock<Tmpl> = OnceLock::new();
    DEFAULT.get_or_init(Tmpl::new)
}
