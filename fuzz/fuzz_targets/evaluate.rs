#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::json;
use tmpl::{Tmpl, Value};

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let src = String::from_utf8_lossy(data);
    let tmpl = Tmpl::new();
    tmpl.set_report_errors(false);
    let context = Value::from(json!({
        "a": 1,
        "s": "text",
        "list": [1, "two", null],
        "obj": {"k": {"v": true}},
    }));
    // Compile diagnostics and unguarded runtime errors are fine; panics are not.
    let _ = tmpl.evaluate(&src, &context);
});
