use std::sync::Arc;

use super::util::{arg, builtin, record};
use crate::runtime::values::Value;
use crate::runtime::EvalError;

pub(super) fn build_json_record() -> Value {
    Value::Record(Arc::new(record(vec![
        (
            "stringify",
            builtin("stringify", |_, args| {
                let Some(json) = arg(&args, 0).to_json() else {
                    return Ok(Value::Undefined);
                };
                let pretty = arg(&args, 2).to_number() > 0.0;
                let text = if pretty {
                    serde_json::to_string_pretty(&json)
                } else {
                    serde_json::to_string(&json)
                };
                text.map(Value::Text)
                    .map_err(|err| EvalError::builtin("JSON.stringify", err.to_string()))
            }),
        ),
        (
            "parse",
            builtin("parse", |_, args| {
                let text = arg(&args, 0).to_string();
                serde_json::from_str::<serde_json::Value>(&text)
                    .map(Value::from)
                    .map_err(|err| EvalError::builtin("JSON.parse", err.to_string()))
            }),
        ),
    ])))
}
