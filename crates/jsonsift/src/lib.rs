//! JSON documents as lazily-typed node trees, queried with compiled
//! JSONPath-style expressions.
//!
//! Parsing only validates the input and records where every value starts
//! and ends; scalars are decoded the first time they are read. The tree can
//! be navigated and edited in place, and re-rendering happens on demand.
//!
//! ```
//! let doc = jsonsift::parse(br#"{"a": [1, 2, {"b": true}]}"#).unwrap();
//! let b = doc.root().get("a").and_then(|a| a.at(2)).and_then(|n| n.get("b"));
//! assert_eq!(b.map(|n| n.path()).as_deref(), Some("$['a'][2]['b']"));
//!
//! let query = jsonsift::compile("$.a[?(@ > 1)]").unwrap();
//! let found = jsonsift::evaluate(&query, doc.root()).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].node().source(), "2");
//! ```

mod buffer;
mod builder;
mod error;
mod node;
mod options;
mod query;
mod value;

pub use error::{Error, NodeError, ParseError, QueryError};
pub use node::{Document, Link, Node, NodeId, NodeKind, NodeMut};
pub use options::ParserOptions;
pub use query::{
    CompiledQuery, Item, compile, evaluate,
    functions::{self, Arity, FunctionDef, register_function},
    token,
};
pub use value::{Array, Map, Value};

/// Parses `data` in place: the returned document borrows it.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed input.
pub fn parse(data: &[u8]) -> Result<Document<'_>, ParseError> {
    Document::parse_with(data, ParserOptions::default())
}

/// Parses `data` in place with the given options.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed input or when the options' limits
/// are exceeded.
pub fn parse_with(data: &[u8], options: ParserOptions) -> Result<Document<'_>, ParseError> {
    Document::parse_with(data, options)
}

/// Parses a private copy of `data`; the caller keeps ownership of its buffer.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed input.
pub fn parse_safe(data: &[u8]) -> Result<Document<'static>, ParseError> {
    Document::parse_safe_with(data, ParserOptions::default())
}

/// Parses a private copy of `data` with the given options.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed input or when the options' limits
/// are exceeded.
pub fn parse_safe_with(data: &[u8], options: ParserOptions) -> Result<Document<'static>, ParseError> {
    Document::parse_safe_with(data, options)
}

/// Parses `data`, runs `expression` against its root and decodes every
/// result.
///
/// # Errors
///
/// Any parse, compile, evaluation or decoding failure.
///
/// # Examples
///
/// ```
/// use jsonsift::{Value, jsonpath};
///
/// let data = br#"{"prices": [8.95, 12.99, 8.99]}"#;
/// assert_eq!(jsonpath(data, "$.prices[-1]").unwrap(), [Value::from(8.99)]);
/// assert_eq!(jsonpath(data, "max($.prices)").unwrap(), [Value::from(12.99)]);
/// ```
pub fn jsonpath(data: &[u8], expression: &str) -> Result<Vec<Value>, Error> {
    let doc = parse(data)?;
    let query = compile(expression)?;
    let items = query.evaluate(doc.root())?;
    Ok(items.iter().map(Item::value).collect::<Result<_, _>>()?)
}
