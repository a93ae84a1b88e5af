//! The document tree.
//!
//! A [`Document`] is an arena: it owns the backing bytes and one slot per
//! node. Slots refer to each other by [`NodeId`]; the parent link is a plain
//! id, so the tree has no ownership cycles. Scalars parsed from the input
//! keep only the `[start, end)` borders of their text and are decoded on
//! first access.
//!
//! Reading goes through the copyable [`Node`] handle, writing through
//! [`NodeMut`]. A document is `Send + Sync`; writes need `&mut Document`, so
//! concurrent readers can never observe a mutation in progress.

pub(crate) mod decode;
mod mutate;
mod render;

use std::{borrow::Cow, fmt, sync::OnceLock};

use bstr::{BStr, ByteSlice};
use indexmap::IndexMap;

pub use mutate::NodeMut;

use crate::{
    builder::Builder,
    error::{NodeError, ParseError},
    options::ParserOptions,
    value::{Map, Value},
};

/// Handle to a node inside one [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// The JSON type of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `null` in any letter case.
    Null,
    /// `true` or `false` in any letter case.
    Bool,
    /// A number, kept as raw text until decoded.
    Numeric,
    /// A quoted string.
    String,
    /// `[...]`
    Array,
    /// `{...}`
    Object,
}

impl NodeKind {
    /// Arrays and objects.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a node hangs off its parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Link {
    /// The node has no parent.
    Root,
    /// Value of an object member.
    Key(String),
    /// Element of an array.
    Index(usize),
}

#[derive(Debug)]
pub(crate) enum Text {
    /// Half-open byte range into the document source.
    Span(usize, usize),
    /// Raw text of a scalar that did not come from the source.
    Owned(Box<[u8]>),
    /// A container built in memory; its text is always rendered.
    None,
}

#[derive(Debug)]
pub(crate) enum Children {
    Leaf,
    Array(Vec<NodeId>),
    Object(IndexMap<String, NodeId>),
}

#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) kind: NodeKind,
    pub(crate) text: Text,
    pub(crate) link: Link,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Children,
    /// Set when this subtree no longer matches its source span.
    pub(crate) dirty: bool,
    pub(crate) value: OnceLock<Value>,
    pub(crate) rendered: OnceLock<Vec<u8>>,
}

impl Slot {
    pub(crate) fn new(kind: NodeKind, text: Text, link: Link, parent: Option<NodeId>) -> Self {
        let children = match kind {
            NodeKind::Array => Children::Array(Vec::new()),
            NodeKind::Object => Children::Object(IndexMap::new()),
            _ => Children::Leaf,
        };
        let dirty = matches!(text, Text::None);
        Self {
            kind,
            text,
            link,
            parent,
            children,
            dirty,
            value: OnceLock::new(),
            rendered: OnceLock::new(),
        }
    }

    pub(crate) fn invalidate(&mut self) {
        self.dirty = true;
        self.value = OnceLock::new();
        self.rendered = OnceLock::new();
    }
}

/// A parsed (or built) JSON document.
///
/// `'src` is the lifetime of the input for documents produced by
/// [`parse`](crate::parse), which scans the caller's buffer in place.
/// [`parse_safe`](crate::parse_safe) copies the input first and yields a
/// `Document<'static>`.
pub struct Document<'src> {
    pub(crate) source: Cow<'src, [u8]>,
    pub(crate) slots: Vec<Slot>,
    pub(crate) root: NodeId,
}

impl<'src> Document<'src> {
    /// Parses `data` in place with the given options.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for any malformed input; no partial tree is
    /// produced.
    pub fn parse_with(data: &'src [u8], options: ParserOptions) -> Result<Self, ParseError> {
        let (slots, root) = Builder::new(data, options).build()?;
        Ok(Self {
            source: Cow::Borrowed(data),
            slots,
            root,
        })
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node {
            doc: self.reborrow(),
            id: self.root,
        }
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.slots.len()).then(|| Node {
            doc: self.reborrow(),
            id,
        })
    }

    /// Opens a node for mutation.
    pub fn node_mut(&mut self, id: NodeId) -> Option<NodeMut<'_, 'src>> {
        (id.0 < self.slots.len()).then(|| NodeMut::new(self, id))
    }

    /// Opens the root for mutation.
    pub fn root_mut(&mut self) -> NodeMut<'_, 'src> {
        let id = self.root;
        NodeMut::new(self, id)
    }

    /// The complete input the document was parsed from.
    #[must_use]
    pub fn input(&self) -> &BStr {
        self.source.as_bstr()
    }

    /// Detaches the document from the caller's buffer.
    #[must_use]
    pub fn into_owned(self) -> Document<'static> {
        Document {
            source: Cow::Owned(self.source.into_owned()),
            slots: self.slots,
            root: self.root,
        }
    }

    fn reborrow(&self) -> &Document<'_> {
        self
    }

    pub(crate) fn slot(&self, id: NodeId) -> &Slot {
        &self.slots[id.0]
    }

    pub(crate) fn push(&mut self, slot: Slot) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(slot);
        id
    }

    /// Builds slots for `value` under `parent`, returning the new node.
    pub(crate) fn attach(&mut self, parent: Option<NodeId>, link: Link, value: &Value) -> NodeId {
        let (kind, text) = render::content(value);
        let id = self.push(Slot::new(kind, text, link, parent));
        self.attach_children(id, value);
        id
    }

    /// Fills an empty container slot with the members of `value`.
    pub(crate) fn attach_children(&mut self, id: NodeId, value: &Value) {
        match value {
            Value::Array(items) => {
                let ids = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.attach(Some(id), Link::Index(i), item))
                    .collect();
                self.slots[id.0].children = Children::Array(ids);
            }
            Value::Object(map) => {
                let ids = map
                    .iter()
                    .map(|(k, v)| (k.clone(), self.attach(Some(id), Link::Key(k.clone()), v)))
                    .collect();
                self.slots[id.0].children = Children::Object(ids);
            }
            _ => {}
        }
    }

    /// Copies the subtree at `from` (of any document) under `parent`.
    fn graft(&mut self, parent: Option<NodeId>, link: Link, from: Node<'_>) -> NodeId {
        let kind = from.kind();
        let text = if kind.is_container() {
            Text::None
        } else {
            Text::Owned(from.source().to_vec().into_boxed_slice())
        };
        let id = self.push(Slot::new(kind, text, link, parent));
        match kind {
            NodeKind::Array => {
                let ids = from
                    .children()
                    .enumerate()
                    .map(|(i, child)| self.graft(Some(id), Link::Index(i), child))
                    .collect();
                self.slots[id.0].children = Children::Array(ids);
            }
            NodeKind::Object => {
                let ids = from
                    .entries()
                    .map(|(k, child)| (k.to_owned(), self.graft(Some(id), Link::Key(k.to_owned()), child)))
                    .collect();
                self.slots[id.0].children = Children::Object(ids);
            }
            _ => {}
        }
        id
    }
}

impl Document<'static> {
    /// Parses a private copy of `data` with the given options.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for any malformed input.
    pub fn parse_safe_with(data: &[u8], options: ParserOptions) -> Result<Self, ParseError> {
        let owned = data.to_vec();
        let (slots, root) = Builder::new(&owned, options).build()?;
        Ok(Self {
            source: Cow::Owned(owned),
            slots,
            root,
        })
    }

    /// Builds a detached document holding `value`.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut doc = Self::empty();
        doc.root = doc.attach(None, Link::Root, value);
        doc
    }

    /// Builds a detached array holding copies of `nodes`, raw text included.
    #[must_use]
    pub fn collect<'a, I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = Node<'a>>,
    {
        let mut doc = Self::empty();
        let root = doc.push(Slot::new(NodeKind::Array, Text::None, Link::Root, None));
        let ids = nodes
            .into_iter()
            .enumerate()
            .map(|(i, node)| doc.graft(Some(root), Link::Index(i), node))
            .collect();
        doc.slots[root.0].children = Children::Array(ids);
        doc.root = root;
        doc
    }

    fn empty() -> Self {
        Self {
            source: Cow::Borrowed(&[]),
            slots: Vec::new(),
            root: NodeId(0),
        }
    }
}

impl fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root())
            .field("nodes", &self.slots.len())
            .finish()
    }
}

/// Read handle to a node.
///
/// `Node` is `Copy`; every accessor borrows from the owning document.
#[derive(Clone, Copy)]
pub struct Node<'d> {
    doc: &'d Document<'d>,
    id: NodeId,
}

impl<'d> Node<'d> {
    fn slot(&self) -> &'d Slot {
        self.doc.slot(self.id)
    }

    fn at_id(&self, id: NodeId) -> Node<'d> {
        Node { doc: self.doc, id }
    }

    /// Stable id of this node within its document.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The owning document.
    #[must_use]
    pub fn document(&self) -> &'d Document<'d> {
        self.doc
    }

    /// JSON type of the node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.slot().kind
    }

    /// Returns `true` for [`NodeKind::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.kind() == NodeKind::Null
    }

    /// Returns `true` for [`NodeKind::Bool`].
    #[must_use]
    pub fn is_bool(&self) -> bool {
        self.kind() == NodeKind::Bool
    }

    /// Returns `true` for [`NodeKind::Numeric`].
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.kind() == NodeKind::Numeric
    }

    /// Returns `true` for [`NodeKind::String`].
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.kind() == NodeKind::String
    }

    /// Returns `true` for [`NodeKind::Array`].
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.kind() == NodeKind::Array
    }

    /// Returns `true` for [`NodeKind::Object`].
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.kind() == NodeKind::Object
    }

    /// How this node hangs off its parent.
    #[must_use]
    pub fn link(&self) -> &'d Link {
        &self.slot().link
    }

    /// Member name, for values inside an object.
    #[must_use]
    pub fn key(&self) -> Option<&'d str> {
        match &self.slot().link {
            Link::Key(k) => Some(k),
            _ => None,
        }
    }

    /// Position, for elements inside an array.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self.slot().link {
            Link::Index(i) => Some(i),
            _ => None,
        }
    }

    /// The containing node, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Node<'d>> {
        self.slot().parent.map(|id| self.at_id(id))
    }

    /// The top-most ancestor (the node itself if it has no parent).
    #[must_use]
    pub fn root(&self) -> Node<'d> {
        let mut node = *self;
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Byte range of the node's text in the original input. `None` for nodes
    /// that were not parsed from it.
    #[must_use]
    pub fn borders(&self) -> Option<(usize, usize)> {
        match self.slot().text {
            Text::Span(start, end) => Some((start, end)),
            _ => None,
        }
    }

    /// Raw JSON text of the node.
    ///
    /// For a node untouched since parsing this is exactly the input range it
    /// was parsed from. Mutated subtrees are re-rendered on first access.
    #[must_use]
    pub fn source(&self) -> &'d BStr {
        let slot = self.slot();
        match &slot.text {
            Text::Span(start, end) if !slot.dirty => self.doc.source[*start..*end].as_bstr(),
            Text::Owned(text) => text.as_bstr(),
            _ => slot
                .rendered
                .get_or_init(|| render::render(*self))
                .as_bstr(),
        }
    }

    /// Number of children; zero for scalars.
    #[must_use]
    pub fn size(&self) -> usize {
        match &self.slot().children {
            Children::Leaf => 0,
            Children::Array(items) => items.len(),
            Children::Object(members) => members.len(),
        }
    }

    /// Returns `true` for scalars and empty containers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Children in document order: array elements, or object member values.
    pub fn children(self) -> impl Iterator<Item = Node<'d>> + 'd {
        let doc = self.doc;
        let ids: &'d [NodeId] = match &self.slot().children {
            Children::Array(items) => items,
            _ => &[],
        };
        let members = match &self.slot().children {
            Children::Object(members) => Some(members.values()),
            _ => None,
        };
        ids.iter()
            .chain(members.into_iter().flatten())
            .map(move |&id| Node { doc, id })
    }

    /// Object members in source order. Empty for non-objects.
    pub fn entries(self) -> impl Iterator<Item = (&'d str, Node<'d>)> + 'd {
        let doc = self.doc;
        let members = match &self.slot().children {
            Children::Object(members) => Some(members.iter()),
            _ => None,
        };
        members
            .into_iter()
            .flatten()
            .map(move |(k, &id)| (k.as_str(), Node { doc, id }))
    }

    /// Object keys in source order. Empty for non-objects.
    pub fn keys(self) -> impl Iterator<Item = &'d str> + 'd {
        self.entries().map(|(k, _)| k)
    }

    /// Returns `true` if the object has member `key`.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Object member by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Node<'d>> {
        match &self.slot().children {
            Children::Object(members) => members.get(key).map(|&id| self.at_id(id)),
            _ => None,
        }
    }

    /// Array element by position.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<Node<'d>> {
        match &self.slot().children {
            Children::Array(items) => items.get(index).map(|&id| self.at_id(id)),
            _ => None,
        }
    }

    /// Fully decoded value of the subtree. Decoded once and cached until the
    /// subtree is mutated.
    ///
    /// # Errors
    ///
    /// Fails when a string or number in the subtree cannot be decoded.
    pub fn value(&self) -> Result<&'d Value, NodeError> {
        let slot = self.slot();
        if let Some(value) = slot.value.get() {
            return Ok(value);
        }
        let value = self.decode()?;
        Ok(slot.value.get_or_init(|| value))
    }

    fn decode(&self) -> Result<Value, NodeError> {
        Ok(match self.kind() {
            NodeKind::Null => Value::Null,
            NodeKind::Bool => Value::Boolean(decode::boolean(self.source())),
            NodeKind::Numeric => Value::Number(decode::numeric(self.source())?),
            NodeKind::String => Value::String(decode::string(self.source())?),
            NodeKind::Array => Value::Array(
                self.children()
                    .map(|child| child.value().cloned())
                    .collect::<Result<_, _>>()?,
            ),
            NodeKind::Object => Value::Object(
                self.entries()
                    .map(|(k, child)| Ok((k.to_owned(), child.value()?.clone())))
                    .collect::<Result<Map, NodeError>>()?,
            ),
        })
    }

    fn expect(&self, expected: NodeKind) -> Result<(), NodeError> {
        let found = self.kind();
        if found == expected {
            Ok(())
        } else {
            Err(NodeError::TypeMismatch { expected, found })
        }
    }

    /// Decoded boolean.
    ///
    /// # Errors
    ///
    /// Fails unless the node is a bool.
    pub fn as_bool(&self) -> Result<bool, NodeError> {
        self.expect(NodeKind::Bool)?;
        Ok(matches!(self.value()?, Value::Boolean(true)))
    }

    /// Decoded number.
    ///
    /// # Errors
    ///
    /// Fails unless the node is numeric and its text is a valid number.
    pub fn as_numeric(&self) -> Result<f64, NodeError> {
        self.expect(NodeKind::Numeric)?;
        match self.value()? {
            Value::Number(n) => Ok(*n),
            _ => unreachable!("numeric node decoded to a non-number"),
        }
    }

    /// Decoded string contents, escapes resolved.
    ///
    /// # Errors
    ///
    /// Fails unless the node is a string with valid escapes and UTF-8.
    pub fn as_string(&self) -> Result<&'d str, NodeError> {
        self.expect(NodeKind::String)?;
        match self.value()? {
            Value::String(s) => Ok(s),
            _ => unreachable!("string node decoded to a non-string"),
        }
    }

    /// Elements in order.
    ///
    /// # Errors
    ///
    /// Fails unless the node is an array.
    pub fn as_array(&self) -> Result<Vec<Node<'d>>, NodeError> {
        self.expect(NodeKind::Array)?;
        Ok(self.children().collect())
    }

    /// Members in source order.
    ///
    /// # Errors
    ///
    /// Fails unless the node is an object.
    pub fn as_object(&self) -> Result<IndexMap<&'d str, Node<'d>>, NodeError> {
        self.expect(NodeKind::Object)?;
        Ok(self.entries().collect())
    }

    /// Like [`as_bool`](Self::as_bool), for callers that know the type.
    ///
    /// # Panics
    ///
    /// Panics if [`as_bool`](Self::as_bool) fails.
    #[must_use]
    pub fn must_bool(&self) -> bool {
        self.as_bool().unwrap_or_else(|err| panic!("{err}"))
    }

    /// Like [`as_numeric`](Self::as_numeric), panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if [`as_numeric`](Self::as_numeric) fails.
    #[must_use]
    pub fn must_numeric(&self) -> f64 {
        self.as_numeric().unwrap_or_else(|err| panic!("{err}"))
    }

    /// Like [`as_string`](Self::as_string), panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if [`as_string`](Self::as_string) fails.
    #[must_use]
    pub fn must_string(&self) -> &'d str {
        self.as_string().unwrap_or_else(|err| panic!("{err}"))
    }

    /// Like [`as_array`](Self::as_array), panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the node is not an array.
    #[must_use]
    pub fn must_array(&self) -> Vec<Node<'d>> {
        self.as_array().unwrap_or_else(|err| panic!("{err}"))
    }

    /// Like [`as_object`](Self::as_object), panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the node is not an object.
    #[must_use]
    pub fn must_object(&self) -> IndexMap<&'d str, Node<'d>> {
        self.as_object().unwrap_or_else(|err| panic!("{err}"))
    }

    /// Normalized path from the root, e.g. `$['store']['book'][0]`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut links = Vec::new();
        let mut node = *self;
        while let Some(parent) = node.parent() {
            links.push(node.link());
            node = parent;
        }
        let mut out = String::from("$");
        for link in links.into_iter().rev() {
            render::push_path_link(&mut out, link);
        }
        out
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind(), self.source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, parse_safe};

    #[test]
    fn document_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Document<'static>>();
        assert_send_sync::<Node<'static>>();
    }

    #[test]
    fn navigation_and_links() {
        let doc = parse(br#"{"a":[1,{"b":null}]}"#).unwrap();
        let root = doc.root();
        assert_eq!(root.link(), &Link::Root);
        let a = root.get("a").unwrap();
        assert_eq!(a.key(), Some("a"));
        assert_eq!(a.index(), None);
        let b_obj = a.at(1).unwrap();
        assert_eq!(b_obj.index(), Some(1));
        let b = b_obj.get("b").unwrap();
        assert!(b.is_null());
        assert_eq!(b.parent(), Some(b_obj));
        assert_eq!(b.root(), root);
        assert_eq!(b.path(), "$['a'][1]['b']");
        assert_eq!(doc.node(b.id()), Some(b));
    }

    #[test]
    fn borders_nest() {
        let input = br#" [1, "two", [3]] "#;
        let doc = parse(input).unwrap();
        let root = doc.root();
        let (start, end) = root.borders().unwrap();
        assert_eq!((start, end), (1, 16));
        for child in root.children() {
            let (s, e) = child.borders().unwrap();
            assert!(start <= s && e <= end);
            assert_eq!(&input[s..e], child.source().as_bytes());
        }
    }

    #[test]
    fn typed_accessors() {
        let doc = parse(r#"{"s":"aé\n","n":-1.5e2,"t":TRUE,"f":false}"#.as_bytes()).unwrap();
        let root = doc.root();
        assert_eq!(root.get("s").unwrap().as_string(), Ok("a\u{e9}\n"));
        assert_eq!(root.get("n").unwrap().as_numeric(), Ok(-150.0));
        assert_eq!(root.get("t").unwrap().as_bool(), Ok(true));
        assert_eq!(root.get("f").unwrap().as_bool(), Ok(false));
        assert_eq!(
            root.get("s").unwrap().as_numeric(),
            Err(NodeError::TypeMismatch {
                expected: NodeKind::Numeric,
                found: NodeKind::String
            })
        );
        assert_eq!(root.keys().collect::<Vec<_>>(), ["s", "n", "t", "f"]);
    }

    #[test]
    fn quirky_number_has_text_but_no_value() {
        let doc = parse(b"1.123e3.456").unwrap();
        assert!(doc.root().is_numeric());
        assert!(matches!(
            doc.root().as_numeric(),
            Err(NodeError::InvalidNumber(_))
        ));
    }

    #[test]
    #[should_panic(expected = "expected object node, found array")]
    fn must_panics_on_mismatch() {
        let doc = parse(b"[]").unwrap();
        let _ = doc.root().must_object();
    }

    #[test]
    fn safe_parse_is_independent_of_input() {
        let mut input = br#"{"k":"v"}"#.to_vec();
        let doc = parse_safe(&input).unwrap();
        input.fill(b' ');
        assert_eq!(doc.root().source(), r#"{"k":"v"}"#);
        assert_eq!(doc.root().get("k").unwrap().must_string(), "v");
    }

    #[test]
    fn value_of_container() {
        let doc = parse(br#"{"b":[1,true],"a":null}"#).unwrap();
        let value = doc.root().value().unwrap();
        assert_eq!(value.to_string(), r#"{"b":[1,true],"a":null}"#);
    }

    #[test]
    fn collect_preserves_raw_text() {
        let doc = parse(br#"[1.0, "x", {"y": NULL}]"#).unwrap();
        let copy = Document::collect(doc.root().children());
        assert_eq!(copy.root().source(), r#"[1.0,"x",{"y":NULL}]"#);
        assert_eq!(copy.root().at(2).unwrap().path(), "$[2]");
    }

    #[test]
    fn from_value_renders() {
        let value = Value::Array(vec![Value::from("q\""), Value::from(2), Value::Number(f64::NAN)]);
        let doc = Document::from_value(&value);
        assert_eq!(doc.root().source(), r#"["q\"",2,null]"#);
        assert!(doc.root().at(2).unwrap().is_null());
        assert_eq!(doc.root().borders(), None);
    }
}
