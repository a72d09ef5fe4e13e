use super::util::{arg, builtin};
use crate::runtime::values::{Record, Value};

pub(super) fn build_core_globals() -> Record {
    let mut fields = Record::new();
    fields.insert("NaN".to_string(), Value::Number(f64::NAN));
    fields.insert("Infinity".to_string(), Value::Number(f64::INFINITY));
    fields.insert("undefined".to_string(), Value::Undefined);
    fields.insert(
        "isNaN".to_string(),
        builtin("isNaN", |_, args| {
            Ok(Value::Bool(arg(&args, 0).to_number().is_nan()))
        }),
    );
    fields.insert(
        "isFinite".to_string(),
        builtin("isFinite", |_, args| {
            Ok(Value::Bool(arg(&args, 0).to_number().is_finite()))
        }),
    );
    fields.insert(
        "parseInt".to_string(),
        builtin("parseInt", |_, args| {
            let text = arg(&args, 0).to_string();
            let radix = arg(&args, 1).to_int32();
            Ok(Value::Number(parse_int(&text, radix)))
        }),
    );
    fields.insert(
        "parseFloat".to_string(),
        builtin("parseFloat", |_, args| {
            Ok(Value::Number(parse_float(&arg(&args, 0).to_string())))
        }),
    );
    fields.insert(
        "String".to_string(),
        builtin("String", |_, args| {
            Ok(match args.first() {
                None => Value::text(""),
                Some(value) => Value::Text(value.to_string()),
            })
        }),
    );
    fields.insert(
        "Number".to_string(),
        builtin("Number", |_, args| {
            Ok(Value::Number(args.first().map_or(0.0, Value::to_number)))
        }),
    );
    fields.insert(
        "Boolean".to_string(),
        builtin("Boolean", |_, args| {
            Ok(Value::Bool(arg(&args, 0).is_truthy()))
        }),
    );
    fields
}

/// `parseInt`: optional sign, optional `0x` prefix, then the longest run of
/// digits valid in `radix`.
pub(super) fn parse_int(text: &str, radix: i32) -> f64 {
    let mut rest = text.trim_start();
    let mut sign = 1.0;
    if let Some(stripped) = rest.strip_prefix('-') {
        sign = -1.0;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    let mut radix = radix;
    if radix != 0 && !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    if radix == 0 || radix == 16 {
        if let Some(stripped) = rest
            .strip_prefix("0x")
            .or_else(|| rest.strip_prefix("0X"))
        {
            rest = stripped;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }

    let mut value = 0.0f64;
    let mut digits = 0usize;
    for ch in rest.chars() {
        let Some(digit) = ch.to_digit(radix as u32) else {
            break;
        };
        value = value * f64::from(radix) + f64::from(digit);
        digits += 1;
    }
    if digits == 0 {
        return f64::NAN;
    }
    sign * value
}

/// `parseFloat`: the longest prefix that reads as a decimal literal.
pub(super) fn parse_float(text: &str) -> f64 {
    let rest = text.trim_start();
    for (prefix, value) in [
        ("Infinity", f64::INFINITY),
        ("+Infinity", f64::INFINITY),
        ("-Infinity", f64::NEG_INFINITY),
    ] {
        if rest.starts_with(prefix) {
            return value;
        }
    }

    let bytes = rest.as_bytes();
    let mut end = 0usize;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits_start = exp;
        while bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            exp += 1;
        }
        if exp > exp_digits_start {
            end = exp;
        }
    }
    rest[..end].parse().unwrap_or(f64::NAN)
}
