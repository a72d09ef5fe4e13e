use super::*;

fn text(raw: &str) -> TemplatePart {
    TemplatePart {
        kind: PartKind::Text,
        raw: raw.to_string(),
    }
}

fn expr(raw: &str) -> TemplatePart {
    TemplatePart {
        kind: PartKind::Expression,
        raw: raw.to_string(),
    }
}

fn parts(template: &str) -> Vec<TemplatePart> {
    split(template, &BracketSet::default()).parts
}

#[test]
fn empty_template_has_no_parts() {
    assert!(parts("").is_empty());
}

#[test]
fn plain_text_is_one_part() {
    assert_eq!(parts("hello world"), vec![text("hello world")]);
}

#[test]
fn parts_alternate_in_source_order() {
    assert_eq!(
        parts("a {x} b {y}"),
        vec![text("a "), expr("x"), text(" b "), expr("y")]
    );
    assert_eq!(parts("{x}"), vec![expr("x")]);
    assert_eq!(parts("{x} tail"), vec![expr("x"), text(" tail")]);
}

#[test]
fn adjacent_expressions_keep_an_empty_text_between() {
    assert_eq!(parts("{x}{y}"), vec![expr("x"), text(""), expr("y")]);
}

#[test]
fn nested_braces_do_not_close_the_expression() {
    assert_eq!(
        parts("{ {a: {b: 1}}.a.b } end"),
        vec![expr(" {a: {b: 1}}.a.b "), text(" end")]
    );
    assert_eq!(parts("{ f(g(1), [2, [3]]) }"), vec![expr(" f(g(1), [2, [3]]) ")]);
}

#[test]
fn close_bracket_inside_literals_is_ignored() {
    let split = split("{ s === '}' || /}/.test(t) }!", &BracketSet::default());
    assert_eq!(
        split.parts,
        vec![expr(" s === \u{2057}0~ || \u{2057}1~.test(t) "), text("!")]
    );
    assert_eq!(split.hidden[0].text, "'}'");
    assert_eq!(split.hidden[1].text, "/}/");
}

#[test]
fn short_literals_are_not_masked() {
    let split = split("{ a || '' }", &BracketSet::default());
    assert_eq!(split.parts, vec![expr(" a || '' ")]);
    assert!(split.hidden.is_empty());
}

#[test]
fn literals_inside_nested_blocks_are_masked() {
    let split = split("{ f('(') }", &BracketSet::default());
    assert_eq!(split.parts, vec![expr(" f(\u{2057}0~) ")]);
    assert_eq!(split.hidden[0].text, "'('");
}

#[test]
fn division_does_not_start_a_literal() {
    let split = split("{ a / b } / {c}", &BracketSet::default());
    assert_eq!(split.parts, vec![expr(" a / b "), text(" / "), expr("c")]);
    assert!(split.hidden.is_empty());
}

#[test]
fn escaped_brackets_are_literal_and_unescaped() {
    assert_eq!(parts("\\{x\\}"), vec![text("{x}")]);
    assert_eq!(parts("a \\{ {y}"), vec![text("a { "), expr("y")]);
    assert_eq!(parts("{ '\\}' }"), vec![expr(" \u{2057}0~ ")]);
    assert_eq!(parts("{ a \\} b }"), vec![expr(" a } b ")]);
}

#[test]
fn text_quotes_are_not_literals() {
    assert_eq!(
        parts("it's {name}'s"),
        vec![text("it's "), expr("name"), text("'s")]
    );
}

#[test]
fn unterminated_expression_swallows_the_rest() {
    assert_eq!(parts("a {x + 1"), vec![text("a "), expr("x + 1")]);
    assert_eq!(parts("a { f(x } b"), vec![text("a "), expr(" f(x } b")]);
}

#[test]
fn unterminated_expression_keeps_trailing_literal() {
    let split = split("{ x + 'abc'", &BracketSet::default());
    assert_eq!(split.parts, vec![expr(" x + \u{2057}0~")]);
    assert_eq!(split.hidden[0].text, "'abc'");
}

#[test]
fn custom_brackets_split_on_their_tokens() {
    let brackets = BracketSet::new("[[ ]]").expect("valid pair");
    let split = split("{x} [[ a[0] ]] [[b]]", &brackets);
    assert_eq!(
        split.parts,
        vec![text("{x} "), expr(" a[0] "), text(" "), expr("b")]
    );
}

#[test]
fn sole_expression_detects_raw_templates() {
    let brackets = BracketSet::default();
    assert_eq!(split("{x}", &brackets).sole_expression(), Some("x"));
    assert_eq!(split("{x} ", &brackets).sole_expression(), None);
    assert_eq!(split("x", &brackets).sole_expression(), None);
}

#[test]
fn restoring_markers_reconstructs_expression_text() {
    let source = "{ a ? \"{}\" : /[}]/ }";
    let split = split(source, &BracketSet::default());
    let restored = crate::literals::restore_literals(&split.parts[0].raw, &split.hidden);
    assert_eq!(restored, " a ? \"{}\" : /[}]/ ");
}

#[test]
fn expression_masking_matches_mask_literals() {
    let inner = r#" s === '}}' ? "x" : t + 'a' "#;
    let split = split(&format!("<{{{inner}}}>"), &BracketSet::default());
    let (masked, hidden) = crate::literals::mask_literals(inner);
    assert_eq!(split.parts[1], expr(&masked));
    assert_eq!(split.hidden, hidden);
    assert_eq!(hidden.len(), 3);
}
