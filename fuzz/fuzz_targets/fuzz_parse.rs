#![no_main]

use jsonsift::{ParserOptions, parse, parse_with};
use libfuzzer_sys::fuzz_target;

const WHITESPACE: &[u8] = b" \t\r\n";

fn trim(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|b| !WHITESPACE.contains(b)).unwrap_or(data.len());
    let end = data.iter().rposition(|b| !WHITESPACE.contains(b)).map_or(start, |i| i + 1);
    &data[start..end]
}

fn check(data: &[u8]) {
    let strict = serde_json::from_slice::<serde_json::Value>(data).is_ok();
    let doc = match parse(data) {
        Ok(doc) => doc,
        Err(err) => {
            // the accepted grammar is a superset of standard JSON
            assert!(!strict, "rejected valid JSON: {err}");
            assert!(err.position() <= data.len());
            return;
        }
    };
    let root = doc.root();
    assert_eq!(root.source(), trim(data));

    // every subtree re-parses to the same text
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let copy = parse(node.source()).expect("subtree re-parses");
        assert_eq!(copy.root().source(), node.source());
        assert_eq!(copy.root().kind(), node.kind());
        stack.extend(node.children());
    }

    // decoding may fail on quirky numbers and bad escapes, but never panics
    let _ = root.value();

    let limited = parse_with(data, ParserOptions { max_depth: Some(4) });
    if let Ok(limited) = limited {
        assert_eq!(limited.root().source(), root.source());
    }
}

fuzz_target!(|data: &[u8]| check(data));
