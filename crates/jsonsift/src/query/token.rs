//! The compiled form of a query.
//!
//! Every token renders as `Kind(field, field, ...)`. An absent token renders
//! as `Kind(<nil>, ...)` through [`render`], so partially built trees can
//! always be printed.

use std::{fmt, sync::Arc};

use super::functions::{self, FunctionDef};
use crate::{
    error::QueryError,
    node::Document,
    value::{Value, write_escaped_string},
};

/// One node of a compiled query.
#[derive(Debug, Clone)]
pub enum Token {
    /// A function call.
    Function(Function),
    /// A bare argument list.
    Arguments(Arguments),
    /// A constant.
    Literal(Literal),
    /// A unary or binary operation.
    Operator(Operator),
    /// A `$` or `@` path.
    Path(Path),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(t) => fmt::Display::fmt(t, f),
            Self::Arguments(t) => fmt::Display::fmt(t, f),
            Self::Literal(t) => fmt::Display::fmt(t, f),
            Self::Operator(t) => fmt::Display::fmt(t, f),
            Self::Path(t) => fmt::Display::fmt(t, f),
        }
    }
}

/// Static description of a token type.
pub trait TokenKind {
    /// Name used in the rendered form.
    const KIND: &'static str;
    /// Number of fields in the rendered form.
    const FIELDS: usize;
}

/// Renders `token`, or `Kind(<nil>, ...)` when it is absent.
///
/// ```
/// use jsonsift::token::{Function, render};
///
/// assert_eq!(render::<Function>(None).to_string(), "Function(<nil>, <nil>)");
/// ```
pub fn render<T: TokenKind + fmt::Display>(token: Option<&T>) -> impl fmt::Display + '_ {
    Nullable(token)
}

struct Nullable<'a, T>(Option<&'a T>);

impl<T: TokenKind + fmt::Display> fmt::Display for Nullable<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(token) => fmt::Display::fmt(token, f),
            None => {
                f.write_str(T::KIND)?;
                f.write_str("(")?;
                for i in 0..T::FIELDS {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("<nil>")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A call to a registered function, bound when the query is compiled.
#[derive(Clone)]
pub struct Function {
    alias: String,
    def: Arc<FunctionDef>,
    arguments: Arguments,
}

impl Function {
    /// Resolves `alias` (case-insensitively) against the registry.
    ///
    /// # Errors
    ///
    /// [`QueryError::UnknownFunction`] when no such function is registered.
    pub fn new(alias: &str, arguments: Arguments) -> Result<Self, QueryError> {
        let alias = alias.to_lowercase();
        let def = functions::lookup(&alias).ok_or_else(|| QueryError::UnknownFunction {
            name: alias.clone(),
        })?;
        Ok(Self {
            alias,
            def,
            arguments,
        })
    }

    /// Lowercased name the call was written with.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Argument expressions.
    #[must_use]
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// The bound definition, or `None` when there is no token.
    #[must_use]
    pub fn resolve(token: Option<&Self>) -> Option<&FunctionDef> {
        token.map(|t| &*t.def)
    }
}

impl TokenKind for Function {
    const KIND: &'static str = "Function";
    const FIELDS: usize = 2;
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({}, {})", self.alias, self.arguments)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Ordered call arguments.
#[derive(Debug, Clone, Default)]
pub struct Arguments(pub Vec<Token>);

impl TokenKind for Arguments {
    const KIND: &'static str = "Arguments";
    const FIELDS: usize = 1;
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Arguments(")?;
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(token, f)?;
        }
        f.write_str(")")
    }
}

/// A constant. Its detached node is built once at compile time.
#[derive(Clone)]
pub struct Literal {
    value: Value,
    node: Arc<Document<'static>>,
}

impl Literal {
    /// Wraps `value`.
    #[must_use]
    pub fn new(value: Value) -> Self {
        let node = Arc::new(Document::from_value(&value));
        Self { value, node }
    }

    /// The constant.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn document(&self) -> &Arc<Document<'static>> {
        &self.node
    }
}

impl TokenKind for Literal {
    const KIND: &'static str = "Literal";
    const FIELDS: usize = 1;
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Literal({})", self.value)
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Operators, loosest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `+`, also string concatenation.
    Add,
    /// Binary `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// Unary `-`
    Neg,
    /// Unary `!`
    Not,
}

impl Op {
    /// Source spelling.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Add => "+",
            Self::Sub | Self::Neg => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Not => "!",
        }
    }
}

/// A unary or binary operation. Unary operations have no right operand.
#[derive(Debug, Clone)]
pub struct Operator {
    /// The operation.
    pub op: Op,
    /// Left operand, or the only one.
    pub left: Box<Token>,
    /// Right operand of a binary operation.
    pub right: Option<Box<Token>>,
}

impl TokenKind for Operator {
    const KIND: &'static str = "Operator";
    const FIELDS: usize = 3;
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operator({}, {}, ", self.op.symbol(), self.left)?;
        match &self.right {
            Some(right) => write!(f, "{right})"),
            None => f.write_str("<nil>)"),
        }
    }
}

/// Where a path starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    /// `$`: the node the query is evaluated against.
    Document,
    /// `@`: the node under test inside a filter or script.
    Current,
}

/// A path selector sequence.
#[derive(Debug, Clone)]
pub struct Path {
    /// Starting node.
    pub root: Root,
    /// Steps applied in order.
    pub segments: Vec<Segment>,
}

impl Path {
    /// A definite path selects at most one node: only names and indexes, no
    /// descendants.
    #[must_use]
    pub fn is_definite(&self) -> bool {
        self.segments.iter().all(|segment| {
            !segment.descendant
                && matches!(
                    segment.selectors.as_slice(),
                    [Selector::Name(_) | Selector::Index(_)]
                )
        })
    }
}

impl TokenKind for Path {
    const KIND: &'static str = "Path";
    const FIELDS: usize = 2;
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = match self.root {
            Root::Document => '$',
            Root::Current => '@',
        };
        write!(f, "Path({root}, ")?;
        for segment in &self.segments {
            fmt::Display::fmt(segment, f)?;
        }
        f.write_str(")")
    }
}

/// One step of a path: child selection, or descendant selection after `..`.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Union of selectors; results follow selector order.
    pub selectors: Vec<Selector>,
    /// Applies the selectors to the node and all its descendants.
    pub descendant: bool,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descendant {
            f.write_str("..")?;
        }
        f.write_str("[")?;
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            fmt::Display::fmt(selector, f)?;
        }
        f.write_str("]")
    }
}

/// One entry of a bracket union.
#[derive(Debug, Clone)]
pub enum Selector {
    /// Object member by name.
    Name(String),
    /// Every child.
    Wildcard,
    /// Array element; negative counts from the end.
    Index(i64),
    /// `start:end:step`, with Python slice semantics.
    Slice {
        /// First index, inclusive.
        start: Option<i64>,
        /// Last index, exclusive.
        end: Option<i64>,
        /// Stride; defaults to 1.
        step: Option<i64>,
    },
    /// `?(expr)`: children for which `expr` is truthy with `@` bound to them.
    Filter(Box<Token>),
    /// `(expr)`: the child at the computed index or key.
    Script(Box<Token>),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => {
                f.write_str("'")?;
                write_escaped_string(name, f)?;
                f.write_str("'")
            }
            Self::Wildcard => f.write_str("*"),
            Self::Index(i) => write!(f, "{i}"),
            Self::Slice { start, end, step } => {
                if let Some(start) = start {
                    write!(f, "{start}")?;
                }
                f.write_str(":")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                if let Some(step) = step {
                    write!(f, ":{step}")?;
                }
                Ok(())
            }
            Self::Filter(expr) => write!(f, "?({expr})"),
            Self::Script(expr) => write!(f, "({expr})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_tokens_render() {
        assert_eq!(render::<Function>(None).to_string(), "Function(<nil>, <nil>)");
        assert_eq!(render::<Arguments>(None).to_string(), "Arguments(<nil>)");
        assert_eq!(render::<Literal>(None).to_string(), "Literal(<nil>)");
        assert_eq!(
            render::<Operator>(None).to_string(),
            "Operator(<nil>, <nil>, <nil>)"
        );
        assert_eq!(render::<Path>(None).to_string(), "Path(<nil>, <nil>)");
    }

    #[test]
    fn absent_function_resolves_to_none() {
        assert!(Function::resolve(None).is_none());
        let present = Function::new("ABS", Arguments::default()).unwrap();
        assert_eq!(Function::resolve(Some(&present)).map(FunctionDef::name), Some("abs"));
        assert_eq!(render(Some(&present)).to_string(), "Function(abs, Arguments())");
    }

    #[test]
    fn unknown_function_fails_on_construction() {
        assert_eq!(
            Function::new("Nope", Arguments::default()).err(),
            Some(QueryError::UnknownFunction {
                name: "nope".into()
            })
        );
    }

    #[test]
    fn definite_paths() {
        let name = |n: &str| Segment {
            selectors: vec![Selector::Name(n.into())],
            descendant: false,
        };
        let mut path = Path {
            root: Root::Document,
            segments: vec![name("a"), name("b")],
        };
        assert!(path.is_definite());
        path.segments[1].descendant = true;
        assert!(!path.is_definite());
        assert_eq!(path.to_string(), "Path($, ['a']..['b'])");
    }
}
