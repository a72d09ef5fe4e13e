mod core;
mod json;
mod list;
mod math;
mod number;
mod regex;
mod text;
mod util;

use std::sync::{Arc, OnceLock};

use super::values::{Record, Value};

/// The standard global scope, built once per process.
pub(crate) fn standard_globals() -> Arc<Record> {
    static GLOBALS: OnceLock<Arc<Record>> = OnceLock::new();
    GLOBALS
        .get_or_init(|| {
            let mut fields = core::build_core_globals();
            fields.insert("Math".to_string(), math::build_math_record());
            fields.insert("JSON".to_string(), json::build_json_record());
            Arc::new(fields)
        })
        .clone()
}

/// Prototype method `name` for a primitive, list or regex receiver.
pub(crate) fn method_for(receiver: &Value, name: &str) -> Option<Value> {
    let methods = match receiver {
        Value::Text(_) => text::methods(),
        Value::List(_) => list::methods(),
        Value::Number(_) => number::methods(),
        Value::Regex(_) => regex::methods(),
        _ => return None,
    };
    methods.get(name).cloned()
}
