use serde_json::json;

use super::*;
use crate::parser::parse_expression;

fn eval_in(source: &str, context: serde_json::Value) -> Result<Value, EvalError> {
    let parsed = parse_expression(source, &[]).unwrap_or_else(|diag| panic!("{diag}"));
    let context = Value::from(context);
    let globals = Globals::standard();
    eval(&parsed.expr, &Scope::new(&context, &globals))
}

fn eval_ok(source: &str) -> Value {
    eval_in(source, json!({})).unwrap_or_else(|err| panic!("{source}: {err}"))
}

fn text(source: &str) -> String {
    eval_ok(source).to_string()
}

#[test]
fn free_identifiers_fall_back_to_globals_then_undefined() {
    let context = json!({"Infinity": "shadowed", "x": 1});
    assert_eq!(eval_in("x", context.clone()), Ok(Value::Number(1.0)));
    assert_eq!(eval_in("Infinity", context.clone()), Ok(Value::text("shadowed")));
    assert_eq!(eval_in("parseInt('7')", context.clone()), Ok(Value::Number(7.0)));
    assert_eq!(eval_in("nope", context), Ok(Value::Undefined));
}

#[test]
fn reserved_names_ignore_the_context() {
    let context = json!({"Math": {"PI": 3}, "NaN": 1});
    assert_eq!(
        eval_in("Math.PI", context.clone()),
        Ok(Value::Number(std::f64::consts::PI))
    );
    assert!(matches!(eval_in("NaN", context), Ok(Value::Number(n)) if n.is_nan()));
}

#[test]
fn this_and_global_scope() {
    let context = json!({"title": "T"});
    assert_eq!(eval_in("this.title", context.clone()), Ok(Value::text("T")));
    assert_eq!(eval_in("typeof window.isNaN", context), Ok(Value::text("function")));
}

#[test]
fn nullish_context_makes_this_the_global_scope() {
    assert_eq!(eval_in("this.name", json!(null)), Ok(Value::Undefined));
    assert_eq!(eval_in("typeof this.isNaN", json!(null)), Ok(Value::text("function")));
    assert_eq!(eval_in("parseInt('4')", json!(null)), Ok(Value::Number(4.0)));
}

#[test]
fn arithmetic_follows_number_semantics() {
    assert_eq!(text("1 + 2 * 3 - 4 / 2"), "5");
    assert_eq!(text("7 % 3"), "1");
    assert_eq!(text("1 / 0"), "Infinity");
    assert_eq!(text("0.1 + 0.2"), "0.30000000000000004");
    assert_eq!(text("-'3' + +'2'"), "-1");
    assert_eq!(text("2e21"), "2e+21");
    assert_eq!(text("1e-7"), "1e-7");
    assert_eq!(text("-0"), "0");
}

#[test]
fn plus_concatenates_when_either_side_is_text() {
    assert_eq!(text("'a' + 1"), "a1");
    assert_eq!(text("1 + 2 + 'x'"), "3x");
    assert_eq!(text("[1, 2] + ''"), "1,2");
    assert_eq!(text("{} + ''"), "[object Object]");
    assert_eq!(text("null + 1"), "1");
    assert_eq!(text("undefined + 1"), "NaN");
}

#[test]
fn bitwise_operators_use_int32() {
    assert_eq!(text("5 & 3"), "1");
    assert_eq!(text("5 | 3"), "7");
    assert_eq!(text("5 ^ 3"), "6");
    assert_eq!(text("~5"), "-6");
    assert_eq!(text("4294967297 | 0"), "1");
}

#[test]
fn equality_and_comparison() {
    assert_eq!(eval_ok("1 == '1'"), Value::Bool(true));
    assert_eq!(eval_ok("1 === '1'"), Value::Bool(false));
    assert_eq!(eval_ok("null == undefined"), Value::Bool(true));
    assert_eq!(eval_ok("null === undefined"), Value::Bool(false));
    assert_eq!(eval_ok("true == 1"), Value::Bool(true));
    assert_eq!(eval_ok("NaN == NaN"), Value::Bool(false));
    assert_eq!(eval_ok("'b' > 'a'"), Value::Bool(true));
    assert_eq!(eval_ok("'10' < '9'"), Value::Bool(true));
    assert_eq!(eval_ok("'10' < 9"), Value::Bool(false));
    assert_eq!(eval_ok("undefined < 1"), Value::Bool(false));
    assert_eq!(eval_ok("[2] == 2"), Value::Bool(true));
}

#[test]
fn logical_operators_return_operands() {
    assert_eq!(eval_ok("0 || 'x'"), Value::text("x"));
    assert_eq!(eval_ok("'' && 'x'"), Value::text(""));
    assert_eq!(eval_ok("0 ?? 'x'"), Value::Number(0.0));
    assert_eq!(eval_ok("null ?? 'x'"), Value::text("x"));
    assert_eq!(eval_ok("1 ? 'a' : 'b'"), Value::text("a"));
}

#[test]
fn logical_operators_short_circuit() {
    assert_eq!(eval_in("false && missing.x", json!({})), Ok(Value::Bool(false)));
    assert_eq!(eval_in("1 || missing.x", json!({})), Ok(Value::Number(1.0)));
}

#[test]
fn typeof_and_void() {
    assert_eq!(text("typeof 1"), "number");
    assert_eq!(text("typeof 'a'"), "string");
    assert_eq!(text("typeof null"), "object");
    assert_eq!(text("typeof missing"), "undefined");
    assert_eq!(text("typeof [1]"), "object");
    assert_eq!(eval_ok("void 1"), Value::Undefined);
}

#[test]
fn in_operator_checks_keys() {
    let context = json!({"obj": {"a": 1}, "list": [1, 2]});
    assert_eq!(eval_in("'a' in obj", context.clone()), Ok(Value::Bool(true)));
    assert_eq!(eval_in("'b' in obj", context.clone()), Ok(Value::Bool(false)));
    assert_eq!(eval_in("1 in list", context.clone()), Ok(Value::Bool(true)));
    assert_eq!(eval_in("'length' in list", context.clone()), Ok(Value::Bool(true)));
    assert!(matches!(
        eval_in("'a' in 'abc'", context),
        Err(EvalError::InOperand { .. })
    ));
}

#[test]
fn property_access_on_nullish_fails() {
    let err = eval_in("missing.field", json!({})).expect_err("undefined base");
    assert_eq!(
        err,
        EvalError::NullishProperty {
            base: "undefined",
            property: "field".to_string()
        }
    );
    assert_eq!(
        err.to_string(),
        "cannot read properties of undefined (reading 'field')"
    );
    let err = eval_in("x[0]", json!({"x": null})).expect_err("null base");
    assert!(matches!(err, EvalError::NullishProperty { base: "null", .. }));
}

#[test]
fn optional_chaining_short_circuits_the_chain() {
    assert_eq!(eval_in("a?.b.c.d", json!({})), Ok(Value::Undefined));
    assert_eq!(eval_in("a?.[0]", json!({"a": null})), Ok(Value::Undefined));
    assert_eq!(eval_in("a?.b", json!({"a": {"b": 2}})), Ok(Value::Number(2.0)));
    assert_eq!(eval_in("a?.trim()", json!({})), Ok(Value::Undefined));
}

#[test]
fn calling_a_non_function_fails() {
    let err = eval_in("user.name()", json!({"user": {"name": "x"}})).expect_err("not callable");
    assert_eq!(
        err,
        EvalError::NotCallable {
            callee: "user.name".to_string()
        }
    );
}

#[test]
fn index_access_on_lists_records_and_text() {
    let context = json!({"list": ["a", "b"], "rec": {"k": 1, "0": "zero"}, "s": "hey"});
    assert_eq!(eval_in("list[1]", context.clone()), Ok(Value::text("b")));
    assert_eq!(eval_in("list[5]", context.clone()), Ok(Value::Undefined));
    assert_eq!(eval_in("rec['k']", context.clone()), Ok(Value::Number(1.0)));
    assert_eq!(eval_in("rec[0]", context.clone()), Ok(Value::text("zero")));
    assert_eq!(eval_in("s[0] + s.length", context), Ok(Value::text("h3")));
}

#[test]
fn object_and_array_literals_evaluate() {
    assert_eq!(
        eval_in("{a: x, b: [x, 2]}", json!({"x": 1})),
        Ok(Value::from(json!({"a": 1, "b": [1, 2]})))
    );
}

#[test]
fn math_builtins() {
    assert_eq!(text("Math.abs(-2)"), "2");
    assert_eq!(text("Math.max(1, 5, 3)"), "5");
    assert_eq!(text("Math.min()"), "Infinity");
    assert_eq!(text("Math.max(1, 'x')"), "NaN");
    assert_eq!(text("Math.round(2.5)"), "3");
    assert_eq!(text("Math.round(-2.5)"), "-2");
    assert_eq!(text("Math.floor(-1.5)"), "-2");
    assert_eq!(text("Math.trunc(-1.5)"), "-1");
    assert_eq!(text("Math.sign(-3)"), "-1");
    assert_eq!(text("Math.pow(2, 10)"), "1024");
    assert_eq!(text("Math.sqrt(9)"), "3");
    assert_eq!(text("Math.ceil(Math.exp(0) / 2)"), "1");
}

#[test]
fn conversion_builtins() {
    assert_eq!(text("parseInt('  42px')"), "42");
    assert_eq!(text("parseInt('0x1f')"), "31");
    assert_eq!(text("parseInt('ff', 16)"), "255");
    assert_eq!(text("parseInt('px')"), "NaN");
    assert_eq!(text("parseFloat('3.5e1 apples')"), "35");
    assert_eq!(text("parseFloat('.5')"), "0.5");
    assert_eq!(eval_ok("isNaN('abc')"), Value::Bool(true));
    assert_eq!(eval_ok("isFinite('12')"), Value::Bool(true));
    assert_eq!(eval_ok("String(12)"), Value::text("12"));
    assert_eq!(eval_ok("Number('0x10')"), Value::Number(16.0));
    assert_eq!(eval_ok("Number('')"), Value::Number(0.0));
    assert_eq!(eval_ok("Boolean('')"), Value::Bool(false));
}

#[test]
fn json_builtins() {
    assert_eq!(
        eval_in("JSON.stringify(data)", json!({"data": {"b": [1, null], "a": "x"}})),
        Ok(Value::text(r#"{"a":"x","b":[1,null]}"#))
    );
    assert_eq!(eval_ok("JSON.stringify(undefined)"), Value::Undefined);
    assert_eq!(eval_ok("JSON.parse('[1, 2]').length"), Value::Number(2.0));
    assert!(matches!(
        eval_in("JSON.parse('{')", json!({})),
        Err(EvalError::Builtin { .. })
    ));
}

#[test]
fn text_methods() {
    assert_eq!(text("'Hi'.toUpperCase() + 'Hi'.toLowerCase()"), "HIhi");
    assert_eq!(text("'  x '.trim()"), "x");
    assert_eq!(text("'banana'.indexOf('an')"), "1");
    assert_eq!(text("'banana'.indexOf('an', 2)"), "3");
    assert_eq!(text("'banana'.indexOf('x')"), "-1");
    assert_eq!(eval_ok("'banana'.includes('nan')"), Value::Bool(true));
    assert_eq!(eval_ok("'banana'.startsWith('ban')"), Value::Bool(true));
    assert_eq!(eval_ok("'banana'.endsWith('nan', 5)"), Value::Bool(true));
    assert_eq!(text("'banana'.slice(1, -2)"), "ana");
    assert_eq!(text("'banana'.slice(-3)"), "ana");
    assert_eq!(text("'a,b,,c'.split(',')"), "a,b,,c");
    assert_eq!(eval_ok("'a,b,,c'.split(',').length"), Value::Number(4.0));
    assert_eq!(eval_ok("'abc'.split('').length"), Value::Number(3.0));
    assert_eq!(eval_ok("'a-b-c'.split('-', 2).length"), Value::Number(2.0));
    assert_eq!(text("'abc'.charAt(1) + 'abc'.charAt(9)"), "b");
    assert_eq!(text("'aXbX'.replace('X', '_')"), "a_bX");
    assert_eq!(text("'a'.concat(1, null)"), "a1null");
}

#[test]
fn list_methods() {
    let context = json!({"xs": [1, 2, 3, null]});
    assert_eq!(eval_in("xs.join('-')", context.clone()), Ok(Value::text("1-2-3-")));
    assert_eq!(eval_in("xs.indexOf(2)", context.clone()), Ok(Value::Number(1.0)));
    assert_eq!(eval_in("xs.indexOf('2')", context.clone()), Ok(Value::Number(-1.0)));
    assert_eq!(eval_in("xs.includes(3)", context.clone()), Ok(Value::Bool(true)));
    assert_eq!(eval_in("[NaN].includes(NaN)", context.clone()), Ok(Value::Bool(true)));
    assert_eq!(eval_in("xs.slice(1, 3).join()", context.clone()), Ok(Value::text("2,3")));
    assert_eq!(
        eval_in("xs.concat([4], 5).length", context),
        Ok(Value::Number(6.0))
    );
}

#[test]
fn number_methods() {
    assert_eq!(text("(3.14159).toFixed(2)"), "3.14");
    assert_eq!(text("(2).toFixed()"), "2");
    assert_eq!(text("(255).toString(16)"), "ff");
    assert_eq!(text("(-5).toString(2)"), "-101");
    assert_eq!(text("(0.5).toString(2)"), "0.1");
    assert_eq!(text("(12).toString()"), "12");
    assert!(matches!(
        eval_in("(1).toFixed(101)", json!({})),
        Err(EvalError::Builtin { .. })
    ));
}

#[test]
fn builtin_names_are_readable() {
    assert_eq!(text("Math.max.name"), "max");
    assert_eq!(text("'' + isNaN"), "function isNaN() { [native code] }");
}

#[test]
fn detached_method_without_receiver_fails() {
    assert!(matches!(
        eval_in("f()", json!({})).map(|_| ()),
        Err(EvalError::NotCallable { .. })
    ));
    let trim = get_property(&Value::text("x"), "trim").expect("method");
    let err = call_value(&trim, &Value::Undefined, Vec::new()).expect_err("no receiver");
    assert!(matches!(err, EvalError::Builtin { .. }));
}

#[test]
fn host_globals_shadow_builtins() {
    let mut extra = values::Record::new();
    extra.insert("site".to_string(), Value::text("docs"));
    extra.insert("isNaN".to_string(), Value::Bool(false));
    let globals = Globals::with_extra(extra);
    let context = Value::from(json!({}));
    let scope = Scope::new(&context, &globals);
    assert_eq!(scope.lookup("site"), Value::text("docs"));
    assert_eq!(scope.lookup("isNaN"), Value::Bool(false));
    assert!(matches!(scope.lookup("parseInt"), Value::Builtin(_)));
}
