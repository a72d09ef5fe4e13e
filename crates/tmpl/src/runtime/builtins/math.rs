use std::sync::Arc;

use super::util::{arg, builtin};
use crate::runtime::values::{Record, Value};

fn unary(name: &'static str, op: fn(f64) -> f64) -> Value {
    builtin(name, move |_, args| {
        Ok(Value::Number(op(arg(&args, 0).to_number())))
    })
}

pub(super) fn build_math_record() -> Value {
    let mut fields = Record::new();
    fields.insert("PI".to_string(), Value::Number(std::f64::consts::PI));
    fields.insert("E".to_string(), Value::Number(std::f64::consts::E));
    fields.insert("abs".to_string(), unary("abs", f64::abs));
    fields.insert("ceil".to_string(), unary("ceil", f64::ceil));
    fields.insert("floor".to_string(), unary("floor", f64::floor));
    fields.insert("round".to_string(), unary("round", js_round));
    fields.insert("trunc".to_string(), unary("trunc", f64::trunc));
    fields.insert("sign".to_string(), unary("sign", js_sign));
    fields.insert("sqrt".to_string(), unary("sqrt", f64::sqrt));
    fields.insert("log".to_string(), unary("log", f64::ln));
    fields.insert("exp".to_string(), unary("exp", f64::exp));
    fields.insert(
        "pow".to_string(),
        builtin("pow", |_, args| {
            let base = arg(&args, 0).to_number();
            let exponent = arg(&args, 1).to_number();
            Ok(Value::Number(js_pow(base, exponent)))
        }),
    );
    fields.insert(
        "max".to_string(),
        builtin("max", |_, args| {
            Ok(Value::Number(fold_extreme(&args, f64::NEG_INFINITY, f64::max)))
        }),
    );
    fields.insert(
        "min".to_string(),
        builtin("min", |_, args| {
            Ok(Value::Number(fold_extreme(&args, f64::INFINITY, f64::min)))
        }),
    );
    Value::Record(Arc::new(fields))
}

/// `Math.round` rounds halves towards positive infinity.
fn js_round(value: f64) -> f64 {
    if !value.is_finite() || value.fract() == 0.0 {
        return value;
    }
    (value + 0.5).floor()
}

fn js_sign(value: f64) -> f64 {
    if value.is_nan() || value == 0.0 {
        value
    } else {
        value.signum()
    }
}

fn js_pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

/// `Math.max`/`Math.min`: any `NaN` argument poisons the result.
fn fold_extreme(args: &[Value], empty: f64, pick: fn(f64, f64) -> f64) -> f64 {
    let mut result = empty;
    for value in args {
        let number = value.to_number();
        if number.is_nan() {
            return f64::NAN;
        }
        result = pick(result, number);
    }
    result
}
