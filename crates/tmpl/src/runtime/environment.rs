use std::sync::Arc;

use super::builtins::standard_globals;
use super::values::{Record, Value};

/// The global scope: standard builtins overlaid with host-supplied values.
#[derive(Clone)]
pub struct Globals {
    scope: Value,
}

impl Globals {
    pub fn standard() -> Self {
        Self {
            scope: Value::Record(standard_globals()),
        }
    }

    /// Standard builtins plus `extra`; host values shadow builtins of the
    /// same name.
    pub fn with_extra(extra: Record) -> Self {
        if extra.is_empty() {
            return Self::standard();
        }
        let mut fields: Record = standard_globals().as_ref().clone();
        fields.extend(extra);
        Self {
            scope: Value::Record(Arc::new(fields)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scope.field(name)
    }

    /// The record `global` and `window` evaluate to.
    pub fn scope(&self) -> &Value {
        &self.scope
    }
}

impl Default for Globals {
    fn default() -> Self {
        Self::standard()
    }
}

/// Name resolution for one evaluation: the caller's context, then globals.
pub struct Scope<'a> {
    /// What `this` evaluates to: the context, or the global scope when the
    /// context is `null`/`undefined`.
    pub this: &'a Value,
    pub globals: &'a Globals,
}

impl<'a> Scope<'a> {
    pub fn new(context: &'a Value, globals: &'a Globals) -> Self {
        let this = if context.is_nullish() {
            globals.scope()
        } else {
            context
        };
        Self { this, globals }
    }

    /// Free variable lookup. Missing names are `undefined`, never an error.
    pub fn lookup(&self, name: &str) -> Value {
        if let Some(value) = self.this.field(name) {
            return value.clone();
        }
        self.lookup_global(name)
    }

    pub fn lookup_global(&self, name: &str) -> Value {
        self.globals.get(name).cloned().unwrap_or_default()
    }
}
