use std::collections::HashMap;
use std::sync::OnceLock;

use super::util::{arg, builtin};
use crate::runtime::values::Value;
use crate::runtime::EvalError;

pub(super) fn methods() -> &'static HashMap<&'static str, Value> {
    static METHODS: OnceLock<HashMap<&'static str, Value>> = OnceLock::new();
    METHODS.get_or_init(|| {
        let mut methods = HashMap::new();
        methods.insert(
            "test",
            builtin("test", |this, args| match this {
                Value::Regex(regex) => Ok(Value::Bool(
                    regex.regex.is_match(&arg(&args, 0).to_string()),
                )),
                _ => Err(EvalError::builtin("test", "receiver is not a regular expression")),
            }),
        );
        methods
    })
}
