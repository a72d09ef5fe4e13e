use std::collections::HashMap;
use std::sync::OnceLock;

use super::util::{arg, builtin, expect_list, int_arg, relative_range};
use crate::runtime::values::Value;

pub(super) fn methods() -> &'static HashMap<&'static str, Value> {
    static METHODS: OnceLock<HashMap<&'static str, Value>> = OnceLock::new();
    METHODS.get_or_init(build_list_methods)
}

fn start_index(args: &[Value], len: usize) -> usize {
    let from = int_arg(args, 1, 0.0);
    if from < 0.0 {
        (len as f64 + from).max(0.0) as usize
    } else {
        from.min(len as f64) as usize
    }
}

fn build_list_methods() -> HashMap<&'static str, Value> {
    let mut methods = HashMap::new();
    methods.insert(
        "join",
        builtin("join", |this, args| {
            let items = expect_list(this, "join")?;
            let separator = match args.first() {
                None | Some(Value::Undefined) => ",".to_string(),
                Some(value) => value.to_string(),
            };
            let parts: Vec<String> = items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_string()
                    }
                })
                .collect();
            Ok(Value::Text(parts.join(&separator)))
        }),
    );
    methods.insert(
        "indexOf",
        builtin("indexOf", |this, args| {
            let items = expect_list(this, "indexOf")?;
            let needle = arg(&args, 0);
            let from = start_index(&args, items.len());
            let found = items[from..]
                .iter()
                .position(|item| item.strict_equals(&needle))
                .map_or(-1.0, |offset| (offset + from) as f64);
            Ok(Value::Number(found))
        }),
    );
    methods.insert(
        "includes",
        builtin("includes", |this, args| {
            let items = expect_list(this, "includes")?;
            let needle = arg(&args, 0);
            let from = start_index(&args, items.len());
            Ok(Value::Bool(
                items[from..].iter().any(|item| item.same_value_zero(&needle)),
            ))
        }),
    );
    methods.insert(
        "slice",
        builtin("slice", |this, args| {
            let items = expect_list(this, "slice")?;
            let (start, end) = relative_range(&args, items.len());
            Ok(Value::list(items[start..end].to_vec()))
        }),
    );
    methods.insert(
        "concat",
        builtin("concat", |this, args| {
            let mut out = expect_list(this, "concat")?.to_vec();
            for value in args {
                match value {
                    Value::List(items) => out.extend(items.iter().cloned()),
                    other => out.push(other),
                }
            }
            Ok(Value::list(out))
        }),
    );
    methods
}
