use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::EvalError;

/// Native callable. Receives the method receiver (`Undefined` for plain calls)
/// and the evaluated arguments.
pub type BuiltinFunc = dyn Fn(&Value, Vec<Value>) -> Result<Value, EvalError> + Send + Sync;

pub type Record = BTreeMap<String, Value>;

/// A loosely-typed runtime value with JavaScript-like coercions.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Arc<Vec<Value>>),
    Record(Arc<Record>),
    Regex(Arc<RegexValue>),
    Builtin(Arc<BuiltinImpl>),
}

pub struct RegexValue {
    pub regex: Regex,
    pub source: String,
    pub flags: String,
}

impl RegexValue {
    pub fn is_global(&self) -> bool {
        self.flags.contains('g')
    }
}

pub struct BuiltinImpl {
    pub name: String,
    pub func: Arc<BuiltinFunc>,
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }

    pub fn record(fields: Record) -> Self {
        Value::Record(Arc::new(fields))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(value) => *value,
            Value::Number(value) => *value != 0.0 && !value.is_nan(),
            Value::Text(value) => !value.is_empty(),
            Value::List(_) | Value::Record(_) | Value::Regex(_) | Value::Builtin(_) => true,
        }
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Builtin(_) => "function",
            Value::List(_) | Value::Record(_) | Value::Regex(_) => "object",
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Own property of a record value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_record().and_then(|fields| fields.get(name))
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(value) => f64::from(u8::from(*value)),
            Value::Number(value) => *value,
            Value::Text(text) => text_to_number(text),
            Value::List(_) => text_to_number(&self.to_string()),
            Value::Record(_) | Value::Regex(_) | Value::Builtin(_) => f64::NAN,
        }
    }

    pub fn to_int32(&self) -> i32 {
        number_to_int32(self.to_number())
    }

    /// Lossy conversion for `JSON.stringify`; `None` for values JSON omits.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Undefined | Value::Builtin(_) => None,
            Value::Null => Some(serde_json::Value::Null),
            Value::Bool(value) => Some(serde_json::Value::Bool(*value)),
            Value::Number(value) => Some(
                serde_json::Number::from_f64(*value)
                    .map(|number| {
                        if value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15 {
                            serde_json::Value::from(*value as i64)
                        } else {
                            serde_json::Value::Number(number)
                        }
                    })
                    .unwrap_or(serde_json::Value::Null),
            ),
            Value::Text(text) => Some(serde_json::Value::String(text.clone())),
            Value::List(items) => Some(serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json().unwrap_or(serde_json::Value::Null))
                    .collect(),
            )),
            Value::Record(fields) => Some(serde_json::Value::Object(
                fields
                    .iter()
                    .filter_map(|(key, value)| value.to_json().map(|json| (key.clone(), json)))
                    .collect(),
            )),
            Value::Regex(_) => Some(serde_json::Value::Object(serde_json::Map::new())),
        }
    }

    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b),
            (Value::Regex(a), Value::Regex(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `==` with the abstract-equality coercions.
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (Value::Number(_), Value::Text(_)) | (Value::Text(_), Value::Number(_)) => {
                self.to_number() == other.to_number()
            }
            (Value::Bool(_), _) => Value::Number(self.to_number()).loose_equals(other),
            (_, Value::Bool(_)) => self.loose_equals(&Value::Number(other.to_number())),
            (a, b) if a.is_object() && !b.is_object() => {
                Value::Text(a.to_string()).loose_equals(b)
            }
            (a, b) if !a.is_object() && b.is_object() => {
                a.loose_equals(&Value::Text(b.to_string()))
            }
            _ => self.strict_equals(other),
        }
    }

    /// Equality used by `includes`: like `===` but `NaN` equals `NaN`.
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_equals(other),
        }
    }

    fn is_object(&self) -> bool {
        matches!(
            self,
            Value::List(_) | Value::Record(_) | Value::Regex(_) | Value::Builtin(_)
        )
    }
}

/// `ToNumber` for text: whitespace-trimmed decimal, `0x` hex or `Infinity`.
pub fn text_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .map(|value| value as f64)
            .unwrap_or(f64::NAN);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let plain = trimmed
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-'));
    if !plain {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

pub fn number_to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let wrapped = value.trunc().rem_euclid(4_294_967_296.0);
    wrapped as u32 as i32
}

/// JavaScript `Number.prototype.toString()` for radix 10.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let abs = value.abs();
    if (1e-6..1e21).contains(&abs) {
        return value.to_string();
    }
    let formatted = format!("{value:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

impl fmt::Display for Value {
    /// JavaScript `ToString`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Number(value) => f.write_str(&format_number(*value)),
            Value::Text(text) => f.write_str(text),
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_nullish() {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Value::Record(_) => f.write_str("[object Object]"),
            Value::Regex(regex) => write!(f, "/{}/{}", regex.source, regex.flags),
            Value::Builtin(builtin) => {
                write!(f, "function {}() {{ [native code] }}", builtin.name)
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(value) => write!(f, "Bool({value})"),
            Value::Number(value) => write!(f, "Number({value})"),
            Value::Text(text) => write!(f, "Text({text:?})"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Record(fields) => f.debug_map().entries(fields.iter()).finish(),
            Value::Regex(regex) => write!(f, "Regex(/{}/{})", regex.source, regex.flags),
            Value::Builtin(builtin) => write!(f, "Builtin({})", builtin.name),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality; lists and records compare by contents.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a.source == b.source && a.flags == b.flags,
            _ => self.strict_equals(other),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(value),
            serde_json::Value::Number(number) => Value::Number(number.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(text) => Value::Text(text),
            serde_json::Value::Array(items) => {
                Value::list(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::record(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}
