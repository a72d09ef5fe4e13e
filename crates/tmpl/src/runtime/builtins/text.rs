use std::collections::HashMap;
use std::sync::OnceLock;

use super::util::{arg, builtin, expect_text, int_arg, relative_range};
use crate::runtime::values::Value;
use crate::runtime::EvalError;

/// String methods. Positions count UTF-16 code units.
pub(super) fn methods() -> &'static HashMap<&'static str, Value> {
    static METHODS: OnceLock<HashMap<&'static str, Value>> = OnceLock::new();
    METHODS.get_or_init(build_text_methods)
}

fn units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

fn from_units(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return needle.is_empty().then_some(haystack.len());
    }
    if needle.is_empty() {
        return Some(from);
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| offset + from)
}

fn position(args: &[Value], index: usize, default: usize, len: usize) -> usize {
    int_arg(args, index, default as f64).clamp(0.0, len as f64) as usize
}

fn build_text_methods() -> HashMap<&'static str, Value> {
    let mut methods = HashMap::new();
    methods.insert(
        "toUpperCase",
        builtin("toUpperCase", |this, _| {
            Ok(Value::Text(expect_text(this, "toUpperCase")?.to_uppercase()))
        }),
    );
    methods.insert(
        "toLowerCase",
        builtin("toLowerCase", |this, _| {
            Ok(Value::Text(expect_text(this, "toLowerCase")?.to_lowercase()))
        }),
    );
    methods.insert(
        "trim",
        builtin("trim", |this, _| {
            Ok(Value::text(expect_text(this, "trim")?.trim()))
        }),
    );
    methods.insert(
        "indexOf",
        builtin("indexOf", |this, args| {
            let text = units(expect_text(this, "indexOf")?);
            let needle = units(&arg(&args, 0).to_string());
            let from = position(&args, 1, 0, text.len());
            Ok(Value::Number(
                find_units(&text, &needle, from).map_or(-1.0, |index| index as f64),
            ))
        }),
    );
    methods.insert(
        "includes",
        builtin("includes", |this, args| {
            let text = units(expect_text(this, "includes")?);
            if matches!(args.first(), Some(Value::Regex(_))) {
                return Err(EvalError::builtin(
                    "includes",
                    "first argument must not be a regular expression",
                ));
            }
            let needle = units(&arg(&args, 0).to_string());
            let from = position(&args, 1, 0, text.len());
            Ok(Value::Bool(find_units(&text, &needle, from).is_some()))
        }),
    );
    methods.insert(
        "startsWith",
        builtin("startsWith", |this, args| {
            let text = units(expect_text(this, "startsWith")?);
            let needle = units(&arg(&args, 0).to_string());
            let start = position(&args, 1, 0, text.len());
            Ok(Value::Bool(text[start..].starts_with(&needle)))
        }),
    );
    methods.insert(
        "endsWith",
        builtin("endsWith", |this, args| {
            let text = units(expect_text(this, "endsWith")?);
            let needle = units(&arg(&args, 0).to_string());
            let end = position(&args, 1, text.len(), text.len());
            Ok(Value::Bool(text[..end].ends_with(&needle)))
        }),
    );
    methods.insert(
        "slice",
        builtin("slice", |this, args| {
            let text = units(expect_text(this, "slice")?);
            let (start, end) = relative_range(&args, text.len());
            Ok(Value::Text(from_units(&text[start..end])))
        }),
    );
    methods.insert(
        "charAt",
        builtin("charAt", |this, args| {
            let text = units(expect_text(this, "charAt")?);
            let index = int_arg(&args, 0, 0.0);
            let ch = if index >= 0.0 && index < text.len() as f64 {
                from_units(&text[index as usize..index as usize + 1])
            } else {
                String::new()
            };
            Ok(Value::Text(ch))
        }),
    );
    methods.insert(
        "concat",
        builtin("concat", |this, args| {
            let mut out = expect_text(this, "concat")?.to_string();
            for value in &args {
                out.push_str(&value.to_string());
            }
            Ok(Value::Text(out))
        }),
    );
    methods.insert(
        "split",
        builtin("split", |this, args| {
            let text = expect_text(this, "split")?;
            let limit = match args.get(1) {
                None | Some(Value::Undefined) => usize::MAX,
                Some(value) => value.to_number().max(0.0) as usize,
            };
            let pieces: Vec<String> = match args.first() {
                None | Some(Value::Undefined) => vec![text.to_string()],
                Some(Value::Regex(regex)) => {
                    if text.is_empty() {
                        if regex.regex.is_match(text) {
                            Vec::new()
                        } else {
                            vec![String::new()]
                        }
                    } else {
                        regex.regex.split(text).map(str::to_string).collect()
                    }
                }
                Some(separator) => {
                    let separator = separator.to_string();
                    if separator.is_empty() {
                        text.chars().map(String::from).collect()
                    } else {
                        text.split(separator.as_str()).map(str::to_string).collect()
                    }
                }
            };
            Ok(Value::list(
                pieces.into_iter().take(limit).map(Value::Text).collect(),
            ))
        }),
    );
    methods.insert(
        "replace",
        builtin("replace", |this, args| {
            let text = expect_text(this, "replace")?;
            let replacement = arg(&args, 1).to_string();
            match args.first() {
                Some(Value::Regex(regex)) => {
                    let expanded = replacement.replace("$&", "${0}");
                    let replaced = if regex.is_global() {
                        regex.regex.replace_all(text, expanded.as_str())
                    } else {
                        regex.regex.replace(text, expanded.as_str())
                    };
                    Ok(Value::Text(replaced.into_owned()))
                }
                other => {
                    let pattern = other.cloned().unwrap_or_default().to_string();
                    let Some(index) = text.find(&pattern) else {
                        return Ok(Value::text(text));
                    };
                    let replacement = replacement.replace("$&", &pattern);
                    let mut out = String::with_capacity(text.len() + replacement.len());
                    out.push_str(&text[..index]);
                    out.push_str(&replacement);
                    out.push_str(&text[index + pattern.len()..]);
                    Ok(Value::Text(out))
                }
            }
        }),
    );
    methods
}
