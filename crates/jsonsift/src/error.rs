use std::fmt;

use thiserror::Error;

use crate::node::NodeKind;

/// A failure while scanning or building a document.
///
/// Positions are byte offsets into the input. A failed parse never returns a
/// partial tree.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// A byte that cannot appear here.
    #[error("unexpected symbol {} at position {position}", escaped(.symbol))]
    UnexpectedSymbol {
        /// The offending byte.
        symbol: u8,
        /// Its offset.
        position: usize,
    },
    /// The input ended inside a value.
    #[error("unexpected end of input at position {position}")]
    UnexpectedEnd {
        /// Length of the input.
        position: usize,
    },
    /// A container opened beyond [`ParserOptions::max_depth`](crate::ParserOptions::max_depth).
    #[error("nesting depth {depth} exceeded at position {position}")]
    DepthLimitExceeded {
        /// Nesting depth already reached.
        depth: usize,
        /// Offset of the opening bracket.
        position: usize,
    },
}

impl ParseError {
    /// Byte offset the error refers to.
    #[must_use]
    pub fn position(&self) -> usize {
        match *self {
            Self::UnexpectedSymbol { position, .. }
            | Self::UnexpectedEnd { position }
            | Self::DepthLimitExceeded { position, .. } => position,
        }
    }
}

struct Symbol(u8);

fn escaped(byte: &u8) -> Symbol {
    Symbol(*byte)
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.0.escape_ascii())
    }
}

/// A failure reading or mutating a node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A typed accessor or mutation met a node of another kind.
    #[error("expected {expected} node, found {found}")]
    TypeMismatch {
        /// Kind the operation needs.
        expected: NodeKind,
        /// Kind of the node.
        found: NodeKind,
    },
    /// Numeric text that does not decode to a number.
    #[error("invalid numeric literal {0:?}")]
    InvalidNumber(String),
    /// Bad escape or invalid UTF-8 in a string.
    #[error("invalid string literal: {0}")]
    InvalidString(&'static str),
    /// A container operation on a scalar node.
    #[error("{0} node is not a container")]
    NotContainer(NodeKind),
    /// No member with this key.
    #[error("key {0:?} not found")]
    KeyNotFound(String),
    /// No element at this index.
    #[error("index {index} out of bounds for array of size {size}")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of elements.
        size: usize,
    },
    /// The root, or a node already removed from its parent.
    #[error("node has no parent")]
    Detached,
}

/// A failure compiling or evaluating a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Malformed query text.
    #[error("syntax error at position {position}: {message}")]
    Syntax {
        /// What was wrong.
        message: String,
        /// Byte offset into the query.
        position: usize,
    },
    /// A call to a name missing from the registry.
    #[error("function {name:?} not found")]
    UnknownFunction {
        /// Lowercased function name.
        name: String,
    },
    /// Wrong number of arguments.
    #[error("function {function:?} expects {expected} arguments, got {found}")]
    Arity {
        /// Function name.
        function: String,
        /// Accepted count, rendered.
        expected: String,
        /// Count passed.
        found: usize,
    },
    /// An argument of the wrong kind.
    #[error("function {function:?} argument {position}: expected {expected}, found {found}")]
    ArgumentType {
        /// Function name.
        function: String,
        /// Zero-based argument position.
        position: usize,
        /// Kind the function wants.
        expected: &'static str,
        /// Kind it got.
        found: NodeKind,
    },
    /// An aggregate called without any values.
    #[error("function {function:?} called on empty input")]
    EmptyInput {
        /// Function name.
        function: String,
    },
    /// `/` or `%` by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// An operator applied to unsupported kinds.
    #[error("operator {operator} cannot be applied to {left} and {right}")]
    Operand {
        /// Operator symbol.
        operator: &'static str,
        /// Kind of the left operand.
        left: NodeKind,
        /// Kind of the right operand, or the operand again for unary operators.
        right: NodeKind,
    },
    /// A node could not be decoded.
    #[error(transparent)]
    Node(#[from] NodeError),
    /// A registered function failed to parse JSON.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl QueryError {
    pub(crate) fn syntax(message: impl Into<String>, position: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
        }
    }
}

/// Any failure raised by the one-shot [`crate::jsonpath`] entry point.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The document did not parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// The query did not compile or evaluate.
    #[error("query error: {0}")]
    Query(#[from] QueryError),
    /// A result did not decode.
    #[error("node error: {0}")]
    Node(#[from] NodeError),
}
