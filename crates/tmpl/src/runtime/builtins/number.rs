use std::collections::HashMap;
use std::sync::OnceLock;

use super::util::{builtin, int_arg};
use crate::runtime::values::{format_number, Value};
use crate::runtime::EvalError;

pub(super) fn methods() -> &'static HashMap<&'static str, Value> {
    static METHODS: OnceLock<HashMap<&'static str, Value>> = OnceLock::new();
    METHODS.get_or_init(build_number_methods)
}

fn expect_number(receiver: &Value, ctx: &str) -> Result<f64, EvalError> {
    match receiver {
        Value::Number(value) => Ok(*value),
        _ => Err(EvalError::builtin(ctx, "receiver is not a number")),
    }
}

fn build_number_methods() -> HashMap<&'static str, Value> {
    let mut methods = HashMap::new();
    methods.insert(
        "toFixed",
        builtin("toFixed", |this, args| {
            let value = expect_number(this, "toFixed")?;
            let digits = int_arg(&args, 0, 0.0);
            if !(0.0..=100.0).contains(&digits) {
                return Err(EvalError::builtin(
                    "toFixed",
                    "digits argument must be between 0 and 100",
                ));
            }
            if !value.is_finite() || value.abs() >= 1e21 {
                return Ok(Value::Text(format_number(value)));
            }
            let formatted = format!("{:.*}", digits as usize, value);
            // Negative zero formats without a sign.
            let formatted = if value == 0.0 {
                formatted.trim_start_matches('-').to_string()
            } else {
                formatted
            };
            Ok(Value::Text(formatted))
        }),
    );
    methods.insert(
        "toString",
        builtin("toString", |this, args| {
            let value = expect_number(this, "toString")?;
            let radix = int_arg(&args, 0, 10.0);
            if !(2.0..=36.0).contains(&radix) {
                return Err(EvalError::builtin(
                    "toString",
                    "radix must be between 2 and 36",
                ));
            }
            Ok(Value::Text(to_radix_string(value, radix as u32)))
        }),
    );
    methods
}

/// `Number.prototype.toString(radix)`; fractions in non-decimal radixes are
/// cut off after 20 digits.
fn to_radix_string(value: f64, radix: u32) -> String {
    if radix == 10 || !value.is_finite() {
        return format_number(value);
    }
    let negative = value < 0.0;
    let abs = value.abs();
    let mut integer = abs.trunc();
    let mut fraction = abs - integer;

    let mut digits = Vec::new();
    if integer == 0.0 {
        digits.push('0');
    }
    while integer >= 1.0 {
        let digit = (integer % f64::from(radix)) as u32;
        digits.push(std::char::from_digit(digit, radix).unwrap_or('0'));
        integer = (integer / f64::from(radix)).trunc();
    }
    digits.reverse();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.extend(digits);
    if fraction > 0.0 {
        out.push('.');
        for _ in 0..20 {
            fraction *= f64::from(radix);
            let digit = fraction.trunc() as u32;
            out.push(std::char::from_digit(digit, radix).unwrap_or('0'));
            fraction -= fraction.trunc();
            if fraction == 0.0 {
                break;
            }
        }
    }
    out
}
