use std::sync::Arc;

use crate::runtime::values::{BuiltinImpl, Record, Value};
use crate::runtime::EvalError;

pub(super) fn builtin(
    name: &str,
    func: impl Fn(&Value, Vec<Value>) -> Result<Value, EvalError> + Send + Sync + 'static,
) -> Value {
    Value::Builtin(Arc::new(BuiltinImpl {
        name: name.to_string(),
        func: Arc::new(func),
    }))
}

/// Argument `index`, `undefined` when absent.
pub(super) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

/// Integer argument as JavaScript `ToIntegerOrInfinity`, with a default for
/// `undefined`.
pub(super) fn int_arg(args: &[Value], index: usize, default: f64) -> f64 {
    match args.get(index) {
        None | Some(Value::Undefined) => default,
        Some(value) => {
            let number = value.to_number();
            if number.is_nan() {
                0.0
            } else {
                number.trunc()
            }
        }
    }
}

pub(super) fn expect_text<'a>(receiver: &'a Value, ctx: &str) -> Result<&'a str, EvalError> {
    match receiver {
        Value::Text(text) => Ok(text),
        _ => Err(EvalError::builtin(ctx, "receiver is not a string")),
    }
}

pub(super) fn expect_list<'a>(receiver: &'a Value, ctx: &str) -> Result<&'a [Value], EvalError> {
    match receiver {
        Value::List(items) => Ok(items),
        _ => Err(EvalError::builtin(ctx, "receiver is not an array")),
    }
}

/// Resolves a relative `start`/`end` pair against `len` the way
/// `slice` does.
pub(super) fn relative_range(args: &[Value], len: usize) -> (usize, usize) {
    let len_f = len as f64;
    let clamp = |value: f64| -> usize {
        if value < 0.0 {
            (len_f + value).max(0.0) as usize
        } else {
            value.min(len_f) as usize
        }
    };
    let start = clamp(int_arg(args, 0, 0.0));
    let end = clamp(int_arg(args, 1, len_f));
    (start, end.max(start))
}

pub(super) fn record(entries: Vec<(&str, Value)>) -> Record {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
