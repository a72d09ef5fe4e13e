use super::*;

#[test]
fn display_includes_code_and_range() {
    let diag = Diagnostic::new("E2100", "unexpected token 'c'", "a + b c", Span::new(6, 7));
    assert_eq!(
        diag.to_string(),
        "error[E2100] unexpected token 'c' at 6..7 in `a + b c`"
    );
}

#[test]
fn render_underlines_the_span() {
    let diag = Diagnostic::new("E2100", "unexpected token 'c'", "a + b c", Span::new(6, 7));
    assert_eq!(
        render_diagnostic(&diag),
        "error[E2100] unexpected token 'c'\n  | a + b c\n  |       ^"
    );
}

#[test]
fn empty_span_still_gets_a_caret() {
    let diag = Diagnostic::new("E2101", "unexpected end of expression", "a +", Span::new(3, 3));
    assert!(render_diagnostic(&diag).ends_with("  |    ^"));
}

#[test]
fn merge_covers_both_spans() {
    assert_eq!(Span::new(4, 6).merge(Span::new(1, 3)), Span::new(1, 6));
}
