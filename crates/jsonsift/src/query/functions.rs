//! The process-wide function registry.
//!
//! Names are case-insensitive; they are stored lowercased. The built-ins are
//! installed the first time the registry is touched. Compiled queries hold an
//! `Arc` to the definition they were compiled against, so re-registering a
//! name affects only queries compiled afterwards.

use std::{collections::HashMap, fmt, sync::Arc, sync::OnceLock};

use log::trace;
use parking_lot::RwLock;

use crate::{
    error::QueryError,
    node::{Node, NodeKind},
    value::Value,
};

/// Signature of a query function: the context node (`@` at the call site)
/// and the evaluated arguments. Functions return a fresh value and never
/// mutate their arguments.
pub type FunctionImpl =
    dyn for<'a> Fn(Node<'a>, &[Node<'a>]) -> Result<Value, QueryError> + Send + Sync;

/// How many arguments a function takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many.
    Exactly(usize),
    /// This many or more.
    AtLeast(usize),
    /// Between the two bounds, inclusive.
    Between(usize, usize),
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Self::Exactly(k) => n == k,
            Self::AtLeast(min) => n >= min,
            Self::Between(min, max) => (min..=max).contains(&n),
        }
    }

    pub(crate) fn check(self, function: &str, found: usize) -> Result<(), QueryError> {
        if self.accepts(found) {
            Ok(())
        } else {
            Err(QueryError::Arity {
                function: function.to_owned(),
                expected: self.to_string(),
                found,
            })
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "{n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
            Self::Between(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

/// A registered function.
pub struct FunctionDef {
    name: String,
    arity: Arity,
    eval: Arc<FunctionImpl>,
}

impl FunctionDef {
    /// Lowercased registry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accepted argument counts.
    #[must_use]
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Checks the argument count, then runs the function body.
    ///
    /// # Errors
    ///
    /// [`QueryError::Arity`] on a wrong argument count, or whatever the body
    /// reports.
    pub fn call<'a>(&self, context: Node<'a>, args: &[Node<'a>]) -> Result<Value, QueryError> {
        self.arity.check(&self.name, args.len())?;
        (self.eval)(context, args)
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

type Registry = RwLock<HashMap<String, Arc<FunctionDef>>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| RwLock::new(builtins()))
}

/// Registers `f` under `name`, replacing any previous function of that name.
///
/// # Examples
///
/// ```
/// use jsonsift::{Arity, Value, jsonpath, register_function};
///
/// register_function("double", Arity::Exactly(1), |_, args| {
///     Ok(Value::from(args[0].as_numeric()? * 2.0))
/// });
/// assert_eq!(jsonpath(b"[21]", "DOUBLE($[0])").unwrap(), [Value::from(42)]);
/// ```
pub fn register_function<F>(name: &str, arity: Arity, f: F)
where
    F: for<'a> Fn(Node<'a>, &[Node<'a>]) -> Result<Value, QueryError> + Send + Sync + 'static,
{
    let name = name.to_lowercase();
    trace!("register function {name} ({arity} arguments)");
    let def = FunctionDef {
        name: name.clone(),
        arity,
        eval: Arc::new(f),
    };
    registry().write().insert(name, Arc::new(def));
}

/// Case-insensitive lookup.
#[must_use]
pub fn lookup(name: &str) -> Option<Arc<FunctionDef>> {
    registry().read().get(&name.to_lowercase()).cloned()
}

fn def<F>(name: &str, arity: Arity, f: F) -> (String, Arc<FunctionDef>)
where
    F: for<'a> Fn(Node<'a>, &[Node<'a>]) -> Result<Value, QueryError> + Send + Sync + 'static,
{
    let def = FunctionDef {
        name: name.to_owned(),
        arity,
        eval: Arc::new(f),
    };
    (name.to_owned(), Arc::new(def))
}

fn builtins() -> HashMap<String, Arc<FunctionDef>> {
    use Arity::{AtLeast, Exactly};

    [
        def("abs", Exactly(1), |_, a| unary("abs", a, f64::abs)),
        def("ceil", Exactly(1), |_, a| unary("ceil", a, f64::ceil)),
        def("floor", Exactly(1), |_, a| unary("floor", a, f64::floor)),
        def("round", Exactly(1), |_, a| unary("round", a, f64::round)),
        def("sqrt", Exactly(1), |_, a| unary("sqrt", a, f64::sqrt)),
        def("pow", Exactly(2), |_, a| {
            Ok(number("pow", 0, a[0])?.powf(number("pow", 1, a[1])?).into())
        }),
        def("not", Exactly(1), |_, a| Ok((!a[0].value()?.truthy()).into())),
        def("length", Exactly(1), |_, a| length("length", a[0])),
        def("size", Exactly(1), |_, a| length("size", a[0])),
        def("sum", AtLeast(1), |_, a| Ok(numbers("sum", a)?.iter().sum::<f64>().into())),
        def("avg", AtLeast(1), |_, a| {
            let ns = non_empty("avg", numbers("avg", a)?)?;
            #[allow(clippy::cast_precision_loss)]
            let len = ns.len() as f64;
            Ok((ns.iter().sum::<f64>() / len).into())
        }),
        def("min", AtLeast(1), |_, a| {
            let ns = non_empty("min", numbers("min", a)?)?;
            Ok(ns.into_iter().fold(f64::INFINITY, f64::min).into())
        }),
        def("max", AtLeast(1), |_, a| {
            let ns = non_empty("max", numbers("max", a)?)?;
            Ok(ns.into_iter().fold(f64::NEG_INFINITY, f64::max).into())
        }),
        def("first", Exactly(1), |_, a| edge("first", a[0], false)),
        def("last", Exactly(1), |_, a| edge("last", a[0], true)),
        def("upper", Exactly(1), |_, a| Ok(string("upper", 0, a[0])?.to_uppercase().into())),
        def("lower", Exactly(1), |_, a| Ok(string("lower", 0, a[0])?.to_lowercase().into())),
        def("trim", Exactly(1), |_, a| Ok(string("trim", 0, a[0])?.trim().into())),
        def("concat", AtLeast(1), |_, a| concat(a)),
        def("reverse", Exactly(1), |_, a| reverse(a[0])),
        def("keys", Exactly(1), |_, a| {
            expect("keys", 0, a[0], NodeKind::Object, "object")?;
            Ok(Value::Array(a[0].keys().map(Value::from).collect()))
        }),
    ]
    .into_iter()
    .collect()
}

fn expect(
    function: &str,
    position: usize,
    node: Node<'_>,
    kind: NodeKind,
    expected: &'static str,
) -> Result<(), QueryError> {
    if node.kind() == kind {
        Ok(())
    } else {
        Err(QueryError::ArgumentType {
            function: function.to_owned(),
            position,
            expected,
            found: node.kind(),
        })
    }
}

fn number(function: &str, position: usize, node: Node<'_>) -> Result<f64, QueryError> {
    expect(function, position, node, NodeKind::Numeric, "numeric")?;
    Ok(node.as_numeric()?)
}

fn string<'a>(function: &str, position: usize, node: Node<'a>) -> Result<&'a str, QueryError> {
    expect(function, position, node, NodeKind::String, "string")?;
    Ok(node.as_string()?)
}

fn unary(function: &str, args: &[Node<'_>], f: fn(f64) -> f64) -> Result<Value, QueryError> {
    Ok(f(number(function, 0, args[0])?).into())
}

/// Numeric arguments with arrays flattened one level.
fn numbers(function: &str, args: &[Node<'_>]) -> Result<Vec<f64>, QueryError> {
    let mut out = Vec::new();
    for (position, &arg) in args.iter().enumerate() {
        if arg.is_array() {
            for item in arg.children() {
                out.push(number(function, position, item)?);
            }
        } else {
            out.push(number(function, position, arg)?);
        }
    }
    Ok(out)
}

fn non_empty(function: &str, ns: Vec<f64>) -> Result<Vec<f64>, QueryError> {
    if ns.is_empty() {
        Err(QueryError::EmptyInput {
            function: function.to_owned(),
        })
    } else {
        Ok(ns)
    }
}

fn length(function: &str, node: Node<'_>) -> Result<Value, QueryError> {
    #[allow(clippy::cast_precision_loss)]
    let n = match node.kind() {
        NodeKind::Array | NodeKind::Object => node.size() as f64,
        NodeKind::String => node.as_string()?.chars().count() as f64,
        found => {
            return Err(QueryError::ArgumentType {
                function: function.to_owned(),
                position: 0,
                expected: "array, object or string",
                found,
            });
        }
    };
    Ok(n.into())
}

/// First or last element of an array argument.
fn edge(function: &str, node: Node<'_>, last: bool) -> Result<Value, QueryError> {
    expect(function, 0, node, NodeKind::Array, "array")?;
    let item = if last {
        node.children().last()
    } else {
        node.children().next()
    };
    let item = item.ok_or_else(|| QueryError::EmptyInput {
        function: function.to_owned(),
    })?;
    Ok(item.value()?.clone())
}

fn concat(args: &[Node<'_>]) -> Result<Value, QueryError> {
    if args[0].is_array() {
        let mut out = Vec::new();
        for (position, &arg) in args.iter().enumerate() {
            expect("concat", position, arg, NodeKind::Array, "array")?;
            for item in arg.children() {
                out.push(item.value()?.clone());
            }
        }
        return Ok(Value::Array(out));
    }
    let mut out = String::new();
    for (position, &arg) in args.iter().enumerate() {
        out.push_str(string("concat", position, arg)?);
    }
    Ok(out.into())
}

fn reverse(node: Node<'_>) -> Result<Value, QueryError> {
    match node.kind() {
        NodeKind::Array => {
            let mut items = node
                .children()
                .map(|item| item.value().cloned())
                .collect::<Result<Vec<_>, _>>()?;
            items.reverse();
            Ok(Value::Array(items))
        }
        NodeKind::String => Ok(node.as_string()?.chars().rev().collect::<String>().into()),
        found => Err(QueryError::ArgumentType {
            function: "reverse".to_owned(),
            position: 0,
            expected: "array or string",
            found,
        }),
    }
}
