//! Query evaluation over a document.
//!
//! Paths select nodes of the document being queried. Everything else
//! (literals, function results, arithmetic) produces values, which are
//! returned as detached single-value documents.

use std::{cmp::Ordering, sync::Arc};

use super::token::{Function, Op, Operator, Path, Root, Selector, Token};
use crate::{
    error::{NodeError, QueryError},
    node::{Document, Node, NodeKind},
    value::Value,
};

/// One query result.
#[derive(Debug, Clone)]
pub enum Item<'d> {
    /// A node of the queried document.
    Node(Node<'d>),
    /// A value computed by the query.
    Detached(Arc<Document<'static>>),
}

impl Item<'_> {
    /// Read view of the result.
    #[must_use]
    pub fn node(&self) -> Node<'_> {
        match self {
            Self::Node(node) => *node,
            Self::Detached(doc) => doc.root(),
        }
    }

    /// Decoded copy of the result.
    ///
    /// # Errors
    ///
    /// Fails when the selected text cannot be decoded.
    pub fn value(&self) -> Result<Value, NodeError> {
        self.node().value().cloned()
    }
}

/// Intermediate result of an expression.
enum Operand<'d> {
    Nodes { nodes: Vec<Node<'d>>, definite: bool },
    Value(Value),
}

impl<'d> Operand<'d> {
    /// Filter truthiness: a path is true when it selected anything.
    fn truthy(&self) -> bool {
        match self {
            Self::Nodes { nodes, .. } => !nodes.is_empty(),
            Self::Value(value) => value.truthy(),
        }
    }

    /// The value of the operand; `None` when a definite path selected nothing.
    fn into_value(self) -> Result<Option<Value>, QueryError> {
        match self {
            Self::Nodes {
                nodes,
                definite: true,
            } => Ok(match nodes.first() {
                Some(node) => Some(node.value()?.clone()),
                None => None,
            }),
            Self::Nodes { nodes, .. } => Ok(Some(Value::Array(
                nodes
                    .iter()
                    .map(|node| node.value().cloned())
                    .collect::<Result<_, _>>()?,
            ))),
            Self::Value(value) => Ok(Some(value)),
        }
    }

    /// Function argument form: a definite path passes its node, anything else
    /// a detached document.
    fn into_argument(self) -> Item<'d> {
        match self {
            Self::Nodes {
                nodes,
                definite: true,
            } if nodes.len() == 1 => Item::Node(nodes[0]),
            Self::Nodes { nodes, .. } => Item::Detached(Arc::new(Document::collect(nodes))),
            Self::Value(value) => Item::Detached(Arc::new(Document::from_value(&value))),
        }
    }
}

pub(super) fn evaluate<'d>(token: &Token, context: Node<'d>) -> Result<Vec<Item<'d>>, QueryError> {
    let evaluator = Evaluator { root: context };
    match token {
        Token::Path(path) => Ok(evaluator
            .path(path, context)?
            .into_iter()
            .map(Item::Node)
            .collect()),
        Token::Literal(literal) => Ok(vec![Item::Detached(Arc::clone(literal.document()))]),
        other => Ok(evaluator
            .operand(other, context)?
            .into_value()?
            .map(|value| Item::Detached(Arc::new(Document::from_value(&value))))
            .into_iter()
            .collect()),
    }
}

struct Evaluator<'d> {
    /// Target of `$`.
    root: Node<'d>,
}

impl<'d> Evaluator<'d> {
    fn path(&self, path: &Path, current: Node<'d>) -> Result<Vec<Node<'d>>, QueryError> {
        let start = match path.root {
            Root::Document => self.root,
            Root::Current => current,
        };
        let mut nodes = vec![start];
        for segment in &path.segments {
            let mut next = Vec::new();
            for node in nodes {
                if segment.descendant {
                    for node in descendants(node) {
                        self.select(node, &segment.selectors, &mut next)?;
                    }
                } else {
                    self.select(node, &segment.selectors, &mut next)?;
                }
            }
            nodes = next;
        }
        Ok(nodes)
    }

    fn select(
        &self,
        node: Node<'d>,
        selectors: &[Selector],
        out: &mut Vec<Node<'d>>,
    ) -> Result<(), QueryError> {
        for selector in selectors {
            match selector {
                Selector::Name(name) => out.extend(node.get(name)),
                Selector::Wildcard => out.extend(node.children()),
                Selector::Index(index) => out.extend(at(node, *index)),
                Selector::Slice { start, end, step } => slice(node, *start, *end, *step, out),
                Selector::Filter(expr) => {
                    for child in node.children() {
                        if self.operand(expr, child)?.truthy() {
                            out.push(child);
                        }
                    }
                }
                Selector::Script(expr) => match self.operand(expr, node)?.into_value()? {
                    #[allow(clippy::cast_possible_truncation)]
                    Some(Value::Number(n)) => out.extend(at(node, n as i64)),
                    Some(Value::String(key)) => out.extend(node.get(&key)),
                    _ => {}
                },
            }
        }
        Ok(())
    }

    fn operand(&self, token: &Token, current: Node<'d>) -> Result<Operand<'d>, QueryError> {
        Ok(match token {
            Token::Path(path) => Operand::Nodes {
                nodes: self.path(path, current)?,
                definite: path.is_definite(),
            },
            Token::Literal(literal) => Operand::Value(literal.value().clone()),
            Token::Function(function) => Operand::Value(self.call(function, current)?),
            Token::Operator(operator) => Operand::Value(self.operator(operator, current)?),
            Token::Arguments(arguments) => Operand::Value(Value::Array(
                arguments
                    .0
                    .iter()
                    .map(|token| Ok(self.value(token, current)?.unwrap_or_default()))
                    .collect::<Result<_, QueryError>>()?,
            )),
        })
    }

    fn value(&self, token: &Token, current: Node<'d>) -> Result<Option<Value>, QueryError> {
        self.operand(token, current)?.into_value()
    }

    fn call(&self, function: &Function, current: Node<'d>) -> Result<Value, QueryError> {
        let Some(def) = Function::resolve(Some(function)) else {
            return Ok(Value::Null);
        };
        let items = function
            .arguments()
            .0
            .iter()
            .map(|token| match token {
                Token::Literal(literal) => Ok(Item::Detached(Arc::clone(literal.document()))),
                token => Ok(self.operand(token, current)?.into_argument()),
            })
            .collect::<Result<Vec<_>, QueryError>>()?;
        let args: Vec<Node<'_>> = items.iter().map(Item::node).collect();
        def.call(current, &args)
    }

    fn operator(&self, operator: &Operator, current: Node<'d>) -> Result<Value, QueryError> {
        let Operator { op, left, right } = operator;
        let right = || match right {
            Some(token) => self.operand(token, current),
            None => Ok(Operand::Value(Value::Null)),
        };
        match op {
            Op::And => Ok(Value::Boolean(
                self.operand(left, current)?.truthy() && right()?.truthy(),
            )),
            Op::Or => Ok(Value::Boolean(
                self.operand(left, current)?.truthy() || right()?.truthy(),
            )),
            Op::Not => Ok(Value::Boolean(!self.operand(left, current)?.truthy())),
            Op::Neg => match self.value(left, current)? {
                Some(Value::Number(n)) => Ok(Value::Number(-n)),
                other => {
                    let kind = kind(other.as_ref());
                    Err(QueryError::Operand {
                        operator: op.symbol(),
                        left: kind,
                        right: kind,
                    })
                }
            },
            _ => binary(*op, self.value(left, current)?, right()?.into_value()?),
        }
    }
}

fn kind(value: Option<&Value>) -> NodeKind {
    value.map_or(NodeKind::Null, Value::kind)
}

fn binary(op: Op, left: Option<Value>, right: Option<Value>) -> Result<Value, QueryError> {
    let mismatch = QueryError::Operand {
        operator: op.symbol(),
        left: kind(left.as_ref()),
        right: kind(right.as_ref()),
    };
    let equal = left.is_some() && left == right;
    let (left, right) = match (left, right) {
        (Some(l), Some(r)) => (l, r),
        _ => {
            return match op {
                Op::Eq | Op::Lt | Op::Le | Op::Gt | Op::Ge => Ok(Value::Boolean(false)),
                Op::Ne => Ok(Value::Boolean(true)),
                _ => Err(mismatch),
            };
        }
    };
    Ok(match op {
        Op::Eq => Value::Boolean(equal),
        Op::Ne => Value::Boolean(!equal),
        Op::Lt | Op::Le | Op::Gt | Op::Ge => {
            let ordering = compare(&left, &right);
            Value::Boolean(ordering.is_some_and(|o| match op {
                Op::Lt => o.is_lt(),
                Op::Le => o.is_le(),
                Op::Gt => o.is_gt(),
                _ => o.is_ge(),
            }))
        }
        Op::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::String(a), Value::String(b)) => Value::String(a + &b),
            _ => return Err(mismatch),
        },
        _ => {
            let (Value::Number(a), Value::Number(b)) = (left, right) else {
                return Err(mismatch);
            };
            match op {
                Op::Sub => Value::Number(a - b),
                Op::Mul => Value::Number(a * b),
                Op::Div | Op::Rem if b == 0.0 => return Err(QueryError::DivisionByZero),
                Op::Div => Value::Number(a / b),
                _ => Value::Number(a % b),
            }
        }
    })
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// `node` and all of its descendants, in document order.
fn descendants(node: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        out.push(node);
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev());
    }
    out
}

fn len(node: Node<'_>) -> i64 {
    i64::try_from(node.size()).unwrap_or(i64::MAX)
}

/// Array element by index; negative indexes count from the end.
fn at(node: Node<'_>, index: i64) -> Option<Node<'_>> {
    if !node.is_array() {
        return None;
    }
    let index = if index < 0 { len(node) + index } else { index };
    node.at(usize::try_from(index).ok()?)
}

fn slice<'d>(
    node: Node<'d>,
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
    out: &mut Vec<Node<'d>>,
) {
    let step = step.unwrap_or(1);
    if !node.is_array() || step == 0 {
        return;
    }
    let len = len(node);
    let normalize = |i: i64| if i < 0 { len + i } else { i };
    let mut push = |i: i64| out.extend(usize::try_from(i).ok().and_then(|i| node.at(i)));
    if step > 0 {
        let lower = start.map_or(0, |i| normalize(i).clamp(0, len));
        let upper = end.map_or(len, |i| normalize(i).clamp(0, len));
        let mut i = lower;
        while i < upper {
            push(i);
            let Some(next) = i.checked_add(step) else { break };
            i = next;
        }
    } else {
        let upper = start.map_or(len - 1, |i| normalize(i).clamp(-1, len - 1));
        let lower = end.map_or(-1, |i| normalize(i).clamp(-1, len - 1));
        let mut i = upper;
        while i > lower {
            push(i);
            let Some(next) = i.checked_add(step) else { break };
            i = next;
        }
    }
}
