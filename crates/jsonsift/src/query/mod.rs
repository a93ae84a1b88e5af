//! JSONPath-style queries.
//!
//! A query is compiled once into a [`Token`] tree; function names are bound
//! to registry entries at that point, so an unknown function is a compile
//! error. The compiled form is immutable and can be evaluated any number of
//! times, from any thread.

mod eval;
pub mod functions;
mod parser;
pub mod token;

use std::{fmt, str::FromStr};

use log::{debug, trace};

pub use eval::Item;
use token::Token;
use crate::{error::QueryError, node::Node};

/// A compiled query.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    expression: String,
    token: Token,
}

impl CompiledQuery {
    /// The text the query was compiled from.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Root of the compiled token tree.
    #[must_use]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Shorthand for [`evaluate`].
    ///
    /// # Errors
    ///
    /// See [`evaluate`].
    pub fn evaluate<'d>(&self, context: Node<'d>) -> Result<Vec<Item<'d>>, QueryError> {
        evaluate(self, context)
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.token, f)
    }
}

impl FromStr for CompiledQuery {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}

/// Compiles `expression`.
///
/// # Errors
///
/// [`QueryError::Syntax`] with the byte offset of the problem, or
/// [`QueryError::UnknownFunction`].
///
/// # Examples
///
/// ```
/// let query = jsonsift::compile("$.store.book[?(@.price < 10)].title").unwrap();
/// assert_eq!(
///     query.to_string(),
///     "Path($, ['store']['book'][?(Operator(<, Path(@, ['price']), Literal(10)))]['title'])",
/// );
/// ```
pub fn compile(expression: &str) -> Result<CompiledQuery, QueryError> {
    match parser::Parser::new(expression).parse() {
        Ok(token) => Ok(CompiledQuery {
            expression: expression.to_owned(),
            token,
        }),
        Err(err) => {
            debug!("failed to compile {expression:?}: {err}");
            Err(err)
        }
    }
}

/// Evaluates `query` with `$` bound to `context`.
///
/// A path query yields the matched nodes of `context`'s document, in
/// selection order. Any other query yields at most one detached value.
///
/// # Errors
///
/// Function failures, operator type errors and undecodable node text.
pub fn evaluate<'d>(query: &CompiledQuery, context: Node<'d>) -> Result<Vec<Item<'d>>, QueryError> {
    trace!("evaluate {} at {}", query.expression, context.path());
    eval::evaluate(&query.token, context)
}
