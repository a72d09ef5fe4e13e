#![no_main]

use libfuzzer_sys::fuzz_target;
use tmpl::{restore_literals, split, BracketSet, PartKind};

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let src = String::from_utf8_lossy(data);
    let brackets = BracketSet::default();
    let split = split(&src, &brackets);
    for pair in split.parts.windows(2) {
        assert_ne!(pair[0].kind, pair[1].kind, "parts must alternate");
    }
    for part in &split.parts {
        if part.kind == PartKind::Expression {
            let _ = restore_literals(&part.raw, &split.hidden);
        }
    }
    let _ = tmpl::mask_literals(&src);
});
