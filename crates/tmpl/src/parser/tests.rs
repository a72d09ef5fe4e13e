use super::*;

fn parse(source: &str) -> ParsedExpr {
    parse_expression(source, &[]).unwrap_or_else(|diag| panic!("{diag}"))
}

fn parse_err(source: &str) -> Diagnostic {
    match parse_expression(source, &[]) {
        Ok(parsed) => panic!("expected diagnostic for {source:?}, got {:?}", parsed.expr),
        Err(diag) => diag,
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let parsed = parse("1 + 2 * 3");
    let Expr::Binary { op, right, .. } = parsed.expr else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(
        *right,
        Expr::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn logical_operators_build_logical_nodes() {
    let parsed = parse("a && b || c ?? d");
    let Expr::Logical { op, left, .. } = parsed.expr else {
        panic!("expected logical");
    };
    assert_eq!(op, LogicalOp::Coalesce);
    assert!(matches!(
        *left,
        Expr::Logical {
            op: LogicalOp::Or,
            ..
        }
    ));
}

#[test]
fn conditional_is_right_associative() {
    let parsed = parse("a ? 1 : b ? 2 : 3");
    let Expr::Conditional { otherwise, .. } = parsed.expr else {
        panic!("expected conditional");
    };
    assert!(matches!(*otherwise, Expr::Conditional { .. }));
}

#[test]
fn plain_free_identifier_is_not_guarded() {
    assert!(!parse("name").guarded);
    assert!(!parse("a + b * 2").guarded);
    assert!(!parse("{ key: 1 }.key").guarded);
}

#[test]
fn dereferenced_free_identifier_is_guarded() {
    assert!(parse("user.name").guarded);
    assert!(parse("items[0]").guarded);
    assert!(parse("format(x)").guarded);
    assert!(parse("a?.b").guarded);
}

#[test]
fn property_names_are_not_free_identifiers() {
    let parsed = parse("Math.max(1, 2)");
    assert!(!parsed.guarded);
    let Expr::Call { callee, .. } = parsed.expr else {
        panic!("expected call");
    };
    let Expr::Member { base, name, .. } = *callee else {
        panic!("expected member callee");
    };
    assert_eq!(name, "max");
    assert!(matches!(*base, Expr::Global { .. }));
}

#[test]
fn special_names_allow_one_plain_property() {
    assert!(!parse("this.title").guarded);
    assert!(!parse("window.title + 1").guarded);
    assert!(parse("this.user.name").guarded);
    assert!(parse("this.items[0]").guarded);
    assert!(parse("this.format(x)").guarded);
    assert!(parse("this").guarded);
}

#[test]
fn reserved_names_read_globals() {
    assert!(matches!(parse("NaN").expr, Expr::Global { .. }));
    assert!(matches!(
        parse("undefined").expr,
        Expr::Literal {
            value: Value::Undefined,
            ..
        }
    ));
    assert!(matches!(parse("this").expr, Expr::This { .. }));
    assert!(matches!(parse("global").expr, Expr::GlobalScope { .. }));
}

#[test]
fn typeof_and_void_are_unary() {
    assert!(matches!(
        parse("typeof x").expr,
        Expr::Unary {
            op: UnaryOp::TypeOf,
            ..
        }
    ));
    assert!(matches!(
        parse("void 0").expr,
        Expr::Unary {
            op: UnaryOp::Void,
            ..
        }
    ));
}

#[test]
fn in_is_a_relational_operator() {
    assert!(matches!(
        parse("'a' in obj").expr,
        Expr::Binary {
            op: BinaryOp::In,
            ..
        }
    ));
}

#[test]
fn object_literals_accept_quoted_numeric_and_shorthand_keys() {
    let Expr::Object { fields, .. } = parse("{a: 1, 'b c': 2, 3: x, d,}").expr else {
        panic!("expected object");
    };
    let keys: Vec<&str> = fields.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b c", "3", "d"]);
}

#[test]
fn array_literals_allow_trailing_comma() {
    let Expr::Array { items, .. } = parse("[1, [2], 'x',]").expr else {
        panic!("expected array");
    };
    assert_eq!(items.len(), 3);
}

#[test]
fn numbers_parse_hex_and_exponents() {
    for (source, expected) in [("0x1F", 31.0), ("1.5e3", 1500.0), (".5", 0.5)] {
        let Expr::Literal {
            value: Value::Number(value),
            ..
        } = parse(source).expr
        else {
            panic!("expected number for {source}");
        };
        assert_eq!(value, expected);
    }
    assert_eq!(parse_err("0x").code, "E2105");
}

#[test]
fn radix_prefixes_and_wide_hex() {
    for (source, expected) in [
        ("0b101", 5.0),
        ("0O17", 15.0),
        ("0xff", 255.0),
        ("0xFFFFFFFFFFFFFFFFFF", 4_722_366_482_869_645_213_696.0),
    ] {
        let Expr::Literal {
            value: Value::Number(value),
            ..
        } = parse(source).expr
        else {
            panic!("expected number for {source}");
        };
        assert_eq!(value, expected, "{source}");
    }
    assert_eq!(parse_err("0b").code, "E2105");
}

#[test]
fn regex_literals_compile_with_flags() {
    let hidden = vec![HiddenLiteral {
        text: "/^ab\\/c$/i".to_string(),
    }];
    let parsed = parse_expression("\u{2057}0~", &hidden).expect("parse");
    let Expr::Literal {
        value: Value::Regex(regex),
        ..
    } = parsed.expr
    else {
        panic!("expected regex literal");
    };
    assert_eq!(regex.source, "^ab\\/c$");
    assert_eq!(regex.flags, "i");
    assert!(regex.regex.is_match("AB/C"));
}

#[test]
fn unsupported_regex_is_a_diagnostic() {
    let hidden = vec![HiddenLiteral {
        text: "/a(?=b)/".to_string(),
    }];
    let err = parse_expression("\u{2057}0~", &hidden).expect_err("lookahead");
    assert_eq!(err.code, "E2104");
}

#[test]
fn unsupported_constructs_are_rejected() {
    assert_eq!(parse_err("new Date()").code, "E2102");
    assert_eq!(parse_err("a instanceof b").code, "E2102");
    assert_eq!(parse_err("a = 1").code, "E2102");
    assert_eq!(parse_err("x => x").code, "E2102");
    assert_eq!(parse_err("a++").code, "E2102");
    assert_eq!(parse_err("[...a]").code, "E2102");
}

#[test]
fn malformed_expressions_are_rejected() {
    assert_eq!(parse_err("").code, "E2101");
    assert_eq!(parse_err("a +").code, "E2101");
    assert_eq!(parse_err("a b").code, "E2100");
    assert_eq!(parse_err("(a").code, "E2101");
    assert_eq!(parse_err("a ? b").code, "E2101");
    assert_eq!(parse_err("a.1").code, "E2100");
}

#[test]
fn diagnostics_point_at_the_offending_token() {
    let err = parse_err("a + b c");
    assert_eq!(err.span, Span::new(6, 7));
    assert_eq!(err.source, "a + b c");
}

#[test]
fn nesting_is_bounded() {
    let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    assert_eq!(parse_err(&deep).code, "E2103");

    let long_chain = format!("a{}", ".b".repeat(300));
    assert_eq!(parse_err(&long_chain).code, "E2103");

    let long_sum = vec!["1"; 300].join(" + ");
    assert_eq!(parse_err(&long_sum).code, "E2103");

    let shallow = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    parse(&shallow);
}
