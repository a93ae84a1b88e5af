#![allow(missing_docs)]

use jsonsift::{Map, Node, Value, parse};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

#[derive(Debug, Clone)]
struct Json(Value);

impl Arbitrary for Json {
    fn arbitrary(g: &mut Gen) -> Self {
        fn number(g: &mut Gen) -> f64 {
            let mut value = f64::arbitrary(g);
            while !value.is_finite() {
                value = f64::arbitrary(g);
            }
            value
        }

        fn gen_val(g: &mut Gen, depth: usize) -> Value {
            let choices = if depth == 0 { 4 } else { 6 };
            match usize::arbitrary(g) % choices {
                0 => Value::Null,
                1 => Value::Boolean(bool::arbitrary(g)),
                2 => Value::Number(number(g)),
                3 => Value::String(String::arbitrary(g)),
                4 => {
                    let len = usize::arbitrary(g) % 4;
                    Value::Array((0..len).map(|_| gen_val(g, depth - 1)).collect())
                }
                _ => {
                    let len = usize::arbitrary(g) % 4;
                    let mut map = Map::new();
                    for _ in 0..len {
                        map.insert(String::arbitrary(g), gen_val(g, depth - 1));
                    }
                    Value::Object(map)
                }
            }
        }

        let depth = usize::arbitrary(g) % 3;
        Self(gen_val(g, depth))
    }
}

/// Every node's raw text re-parses to a node of the same kind, size and text.
fn same_shape(node: Node<'_>) -> bool {
    let Ok(copy) = parse(node.source()) else {
        return false;
    };
    let copy = copy.root();
    copy.kind() == node.kind()
        && copy.size() == node.size()
        && copy.source() == node.source()
        && node.children().all(same_shape)
}

#[quickcheck]
fn rendered_values_parse_back(json: Json) -> bool {
    let text = json.0.to_string();
    let Ok(doc) = parse(text.as_bytes()) else {
        return false;
    };
    doc.root().source() == text.as_str() && doc.root().value() == Ok(&json.0)
}

#[quickcheck]
fn unmutated_subtrees_reparse_identically(json: Json) -> bool {
    let text = json.0.to_string();
    parse(text.as_bytes()).is_ok_and(|doc| same_shape(doc.root()))
}

#[quickcheck]
fn surrounding_whitespace_is_trimmed(json: Json, pad: (u8, u8)) -> bool {
    let ws = |n: u8| " \t\r\n".repeat(usize::from(n % 3));
    let text = json.0.to_string();
    let padded = format!("{}{text}{}", ws(pad.0), ws(pad.1));
    parse(padded.as_bytes()).is_ok_and(|doc| doc.root().source() == text.as_str())
}
