use std::fs;

use serde_json::json;
use tmpl::{read_config, Tmpl, Value};

#[test]
fn context_built_from_a_config_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tmpl.toml");
    fs::write(
        &path,
        r#"
brackets = "{{ }}"
report_errors = false

[globals]
currency = "EUR"
rates = { eur = 1.0, usd = 1.5 }
"#,
    )
    .expect("write config");

    let config = read_config(&path).expect("read config");
    let tmpl = Tmpl::from_config(&config).expect("build");
    let context = Value::from(json!({"price": 10}));

    assert_eq!(
        tmpl.evaluate("{{ price * rates.usd }} {{ currency }}", &context)
            .expect("evaluate"),
        Value::text("15 EUR")
    );
    assert_eq!(
        tmpl.evaluate("{{ missing.deep }}", &context).expect("evaluate"),
        Value::Undefined
    );
    assert!(!tmpl.has_expression("{ price }"));
}
