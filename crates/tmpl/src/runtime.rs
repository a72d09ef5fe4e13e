//! Tree-walking evaluator for compiled expressions.

mod builtins;
pub mod environment;
mod interpreter;
pub mod values;

pub use environment::{Globals, Scope};
pub use interpreter::{call_value, eval, get_property};
pub use values::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("cannot read properties of {base} (reading '{property}')")]
    NullishProperty { base: &'static str, property: String },
    #[error("{callee} is not a function")]
    NotCallable { callee: String },
    #[error("cannot use 'in' operator to search for '{key}' in {target}")]
    InOperand { key: String, target: String },
    #[error("{function}: {message}")]
    Builtin { function: String, message: String },
}

impl EvalError {
    pub(crate) fn builtin(function: &str, message: impl Into<String>) -> Self {
        EvalError::Builtin {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests;
