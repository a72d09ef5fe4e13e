use serde_json::json;
use tmpl::{TmplError, Value};

// One test: the default instance is process-wide and this binary owns it.
#[test]
fn crate_functions_share_the_default_instance() {
    let context = Value::from(json!({"user": {"name": "Ada"}, "tags": ["a", "b"]}));

    assert_eq!(tmpl::brackets(), "{ }");
    assert_eq!(
        tmpl::evaluate("{ user.name } ({ tags.join(', ') })", &context).expect("evaluate"),
        Value::text("Ada (a, b)")
    );
    assert_eq!(tmpl::cache_len(), 1);
    let before = tmpl::compile_count();
    tmpl::evaluate("{ user.name } ({ tags.join(', ') })", &context).expect("evaluate");
    assert_eq!(tmpl::compile_count(), before);

    assert!(tmpl::has_expression("x {y}"));
    assert_eq!(tmpl::parse_loop_spec("row in rows").val, "rows");

    tmpl::set_error_handler(None);
    assert!(matches!(
        tmpl::set_brackets("{}"),
        Err(TmplError::Brackets(_))
    ));
    tmpl::set_brackets("<< >>").expect_err("angle brackets are rejected");
    tmpl::set_brackets("${ }").expect("brackets");
    assert_eq!(tmpl::cache_len(), 0);
    assert_eq!(
        tmpl::evaluate("${ tags.length }", &context).expect("evaluate"),
        Value::Number(2.0)
    );

    tmpl::clear_cache();
    assert_eq!(tmpl::cache_len(), 0);
    let compiled = tmpl::compile("${ 1 + 1 } and { 2 }").expect("compile");
    assert!(!compiled.is_raw());
    assert_eq!(tmpl::cache_len(), 1);
}
