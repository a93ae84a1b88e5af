#![no_main]

use arbitrary::Arbitrary;
use jsonsift::{compile, parse};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    query: &'a str,
    document: &'a [u8],
}

fuzz_target!(|input: Input<'_>| {
    let Ok(query) = compile(input.query) else {
        return;
    };
    // the rendered token tree is stable
    assert_eq!(compile(input.query).map(|q| q.to_string()).ok(), Some(query.to_string()));

    let Ok(doc) = parse(input.document) else {
        return;
    };
    if let Ok(items) = query.evaluate(doc.root()) {
        for item in &items {
            let _ = item.value();
            let _ = item.node().path();
        }
    }
});
