use std::cmp::Ordering;

use crate::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};

use super::builtins::method_for;
use super::environment::Scope;
use super::values::Value;
use super::EvalError;

pub fn eval(expr: &Expr, scope: &Scope<'_>) -> Result<Value, EvalError> {
    Ok(eval_chain(expr, scope)?.unwrap_or_default())
}

/// Evaluates a member/call chain; `None` means an optional link short-circuited
/// the rest of the chain.
fn eval_chain(expr: &Expr, scope: &Scope<'_>) -> Result<Option<Value>, EvalError> {
    match expr {
        Expr::Member {
            base,
            name,
            optional,
            ..
        } => {
            let Some(target) = eval_chain(base, scope)? else {
                return Ok(None);
            };
            if *optional && target.is_nullish() {
                return Ok(None);
            }
            get_property(&target, name).map(Some)
        }
        Expr::Index {
            base,
            index,
            optional,
            ..
        } => {
            let Some(target) = eval_chain(base, scope)? else {
                return Ok(None);
            };
            if *optional && target.is_nullish() {
                return Ok(None);
            }
            let key = eval(index, scope)?;
            get_property(&target, &key.to_string()).map(Some)
        }
        Expr::Call { callee, args, .. } => {
            let (receiver, func) = match callee.as_ref() {
                Expr::Member {
                    base,
                    name,
                    optional,
                    ..
                } => {
                    let Some(receiver) = eval_chain(base, scope)? else {
                        return Ok(None);
                    };
                    if *optional && receiver.is_nullish() {
                        return Ok(None);
                    }
                    let func = get_property(&receiver, name)?;
                    (receiver, func)
                }
                Expr::Index {
                    base,
                    index,
                    optional,
                    ..
                } => {
                    let Some(receiver) = eval_chain(base, scope)? else {
                        return Ok(None);
                    };
                    if *optional && receiver.is_nullish() {
                        return Ok(None);
                    }
                    let key = eval(index, scope)?;
                    let func = get_property(&receiver, &key.to_string())?;
                    (receiver, func)
                }
                other => {
                    let Some(func) = eval_chain(other, scope)? else {
                        return Ok(None);
                    };
                    (Value::Undefined, func)
                }
            };
            let args = args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            call_value(&func, &receiver, args)
                .map_err(|err| match err {
                    EvalError::NotCallable { .. } => EvalError::NotCallable {
                        callee: describe(callee),
                    },
                    other => other,
                })
                .map(Some)
        }
        other => eval_plain(other, scope).map(Some),
    }
}

fn eval_plain(expr: &Expr, scope: &Scope<'_>) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal { value, .. } => Ok(value.clone()),
        Expr::Ident { name, .. } => Ok(scope.lookup(name)),
        Expr::Global { name, .. } => Ok(scope.lookup_global(name)),
        Expr::This { .. } => Ok(scope.this.clone()),
        Expr::GlobalScope { .. } => Ok(scope.globals.scope().clone()),
        Expr::Array { items, .. } => items
            .iter()
            .map(|item| eval(item, scope))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::list),
        Expr::Object { fields, .. } => fields
            .iter()
            .map(|(key, value)| Ok((key.clone(), eval(value, scope)?)))
            .collect::<Result<_, EvalError>>()
            .map(Value::record),
        Expr::Unary { op, expr, .. } => {
            let value = eval(expr, scope)?;
            Ok(apply_unary(*op, &value))
        }
        Expr::Binary {
            op, left, right, ..
        } => {
            let left = eval(left, scope)?;
            let right = eval(right, scope)?;
            apply_binary(*op, &left, &right)
        }
        Expr::Logical {
            op, left, right, ..
        } => {
            let left = eval(left, scope)?;
            let short_circuits = match op {
                LogicalOp::And => !left.is_truthy(),
                LogicalOp::Or => left.is_truthy(),
                LogicalOp::Coalesce => !left.is_nullish(),
            };
            if short_circuits {
                Ok(left)
            } else {
                eval(right, scope)
            }
        }
        Expr::Conditional {
            test,
            then,
            otherwise,
            ..
        } => {
            if eval(test, scope)?.is_truthy() {
                eval(then, scope)
            } else {
                eval(otherwise, scope)
            }
        }
        Expr::Member { .. } | Expr::Index { .. } | Expr::Call { .. } => eval(expr, scope),
    }
}

/// Property read with JavaScript semantics for every value kind.
pub fn get_property(target: &Value, key: &str) -> Result<Value, EvalError> {
    match target {
        Value::Undefined | Value::Null => Err(EvalError::NullishProperty {
            base: if matches!(target, Value::Null) {
                "null"
            } else {
                "undefined"
            },
            property: key.to_string(),
        }),
        Value::Record(fields) => Ok(fields.get(key).cloned().unwrap_or_default()),
        Value::Text(text) => {
            if key == "length" {
                return Ok(Value::Number(text.encode_utf16().count() as f64));
            }
            if let Some(index) = array_index(key) {
                let units: Vec<u16> = text.encode_utf16().collect();
                return Ok(units
                    .get(index)
                    .map(|unit| Value::Text(String::from_utf16_lossy(&[*unit])))
                    .unwrap_or_default());
            }
            Ok(method_for(target, key).unwrap_or_default())
        }
        Value::List(items) => {
            if key == "length" {
                return Ok(Value::Number(items.len() as f64));
            }
            if let Some(index) = array_index(key) {
                return Ok(items.get(index).cloned().unwrap_or_default());
            }
            Ok(method_for(target, key).unwrap_or_default())
        }
        Value::Regex(regex) => match key {
            "source" => Ok(Value::text(regex.source.clone())),
            "flags" => Ok(Value::text(regex.flags.clone())),
            "global" => Ok(Value::Bool(regex.is_global())),
            _ => Ok(method_for(target, key).unwrap_or_default()),
        },
        Value::Builtin(builtin) => match key {
            "name" => Ok(Value::text(builtin.name.clone())),
            _ => Ok(Value::Undefined),
        },
        Value::Number(_) | Value::Bool(_) => Ok(method_for(target, key).unwrap_or_default()),
    }
}

pub fn call_value(func: &Value, receiver: &Value, args: Vec<Value>) -> Result<Value, EvalError> {
    match func {
        Value::Builtin(builtin) => (builtin.func)(receiver, args),
        other => Err(EvalError::NotCallable {
            callee: other.type_of().to_string(),
        }),
    }
}

fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Dotted source form of a callee for error messages.
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Ident { name, .. } | Expr::Global { name, .. } => name.clone(),
        Expr::This { .. } => "this".to_string(),
        Expr::GlobalScope { .. } => "global".to_string(),
        Expr::Member { base, name, .. } => format!("{}.{name}", describe(base)),
        Expr::Index { base, .. } => format!("{}[...]", describe(base)),
        Expr::Call { callee, .. } => format!("{}(...)", describe(callee)),
        _ => "expression".to_string(),
    }
}

fn apply_unary(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::Not => Value::Bool(!value.is_truthy()),
        UnaryOp::Neg => Value::Number(-value.to_number()),
        UnaryOp::Plus => Value::Number(value.to_number()),
        UnaryOp::BitNot => Value::Number(f64::from(!value.to_int32())),
        UnaryOp::TypeOf => Value::text(value.type_of()),
        UnaryOp::Void => Value::Undefined,
    }
}

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let number = |f: fn(f64, f64) -> f64| Value::Number(f(left.to_number(), right.to_number()));
    let int32 =
        |f: fn(i32, i32) -> i32| Value::Number(f64::from(f(left.to_int32(), right.to_int32())));
    Ok(match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => number(|a, b| a - b),
        BinaryOp::Mul => number(|a, b| a * b),
        BinaryOp::Div => number(|a, b| a / b),
        BinaryOp::Rem => number(|a, b| a % b),
        BinaryOp::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::Le => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Ge => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::LooseEq => Value::Bool(left.loose_equals(right)),
        BinaryOp::LooseNe => Value::Bool(!left.loose_equals(right)),
        BinaryOp::StrictEq => Value::Bool(left.strict_equals(right)),
        BinaryOp::StrictNe => Value::Bool(!left.strict_equals(right)),
        BinaryOp::BitAnd => int32(|a, b| a & b),
        BinaryOp::BitXor => int32(|a, b| a ^ b),
        BinaryOp::BitOr => int32(|a, b| a | b),
        BinaryOp::In => Value::Bool(has_property(left, right)?),
    })
}

fn add(left: &Value, right: &Value) -> Value {
    let left = to_primitive(left);
    let right = to_primitive(right);
    if matches!(left, Value::Text(_)) || matches!(right, Value::Text(_)) {
        Value::Text(format!("{left}{right}"))
    } else {
        Value::Number(left.to_number() + right.to_number())
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let left = to_primitive(left);
    let right = to_primitive(right);
    if let (Value::Text(a), Value::Text(b)) = (&left, &right) {
        return Some(a.encode_utf16().cmp(b.encode_utf16()));
    }
    left.to_number().partial_cmp(&right.to_number())
}

fn to_primitive(value: &Value) -> Value {
    match value {
        Value::List(_) | Value::Record(_) | Value::Regex(_) | Value::Builtin(_) => {
            Value::Text(value.to_string())
        }
        other => other.clone(),
    }
}

fn has_property(key: &Value, target: &Value) -> Result<bool, EvalError> {
    let name = key.to_string();
    match target {
        Value::Record(fields) => Ok(fields.contains_key(&name)),
        Value::List(items) => Ok(name == "length"
            || array_index(&name).is_some_and(|index| index < items.len())),
        Value::Regex(_) => Ok(matches!(name.as_str(), "source" | "flags" | "global")),
        Value::Builtin(_) => Ok(name == "name"),
        other => Err(EvalError::InOperand {
            key: name,
            target: other.to_string(),
        }),
    }
}
