#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = c4_parser::parse(input);
    let line_count = input.lines().count();
    for error in &parsed.errors {
        if let Some(line) = error.line() {
            assert!(line >= 1 && line <= line_count);
        }
    }

    let encoded = serde_json::to_string(&parsed).expect("parse result serializes");
    let decoded: c4_parser::ParseResult =
        serde_json::from_str(&encoded).expect("parse result deserializes");
    assert_eq!(decoded, parsed);
});
