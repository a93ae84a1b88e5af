//! Single-pass tree construction over a [`Buffer`].
//!
//! The builder keeps a cursor on the innermost open container. Values are
//! linked under it as they are scanned; a closing bracket records the
//! container's end border and moves the cursor back to its parent.

use log::{debug, trace};

use crate::{
    buffer::{BRACES_L, BRACES_R, BRACKET_L, BRACKET_R, Buffer, COLON, COMMA, QUOTES},
    error::ParseError,
    node::{Children, Link, NodeId, NodeKind, Slot, Text, decode},
    options::ParserOptions,
};

/// What the builder expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Value,
    ArrayValueOrClose,
    KeyOrClose,
    Key,
    Colon,
    CommaOrClose,
    End,
}

pub(crate) struct Builder<'a> {
    buf: Buffer<'a>,
    data: &'a [u8],
    options: ParserOptions,
    slots: Vec<Slot>,
    current: Option<NodeId>,
    root: Option<NodeId>,
    key: Option<String>,
    depth: usize,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(data: &'a [u8], options: ParserOptions) -> Self {
        Self {
            buf: Buffer::new(data),
            data,
            options,
            slots: Vec::new(),
            current: None,
            root: None,
            key: None,
            depth: 0,
        }
    }

    /// Builds the whole tree. On failure nothing is returned.
    pub(crate) fn build(mut self) -> Result<(Vec<Slot>, NodeId), ParseError> {
        match self.run() {
            Ok(root) => Ok((self.slots, root)),
            Err(err) => {
                debug!("parse failed: {err}");
                Err(err)
            }
        }
    }

    fn run(&mut self) -> Result<NodeId, ParseError> {
        let mut state = State::Value;
        loop {
            let c = match self.buf.first() {
                Ok(c) => c,
                Err(err) if state == State::End => {
                    return self.root.ok_or(err);
                }
                Err(err) => return Err(err),
            };
            state = match state {
                State::Value => self.value(c)?,
                State::ArrayValueOrClose if c == BRACKET_R => self.close()?,
                State::ArrayValueOrClose => self.value(c)?,
                State::KeyOrClose if c == BRACES_R => self.close()?,
                State::KeyOrClose | State::Key => self.key(c)?,
                State::Colon if c == COLON => {
                    self.buf.step()?;
                    State::Value
                }
                State::CommaOrClose => self.comma_or_close(c)?,
                State::Colon | State::End => return Err(self.buf.symbol(c)),
            };
        }
    }

    /// Scans the value starting with `c` and links it under the cursor.
    fn value(&mut self, c: u8) -> Result<State, ParseError> {
        let start = self.buf.index;
        let kind = match c {
            QUOTES => {
                self.buf.string()?;
                NodeKind::String
            }
            BRACKET_L | BRACES_L => return self.open(c),
            b'0'..=b'9' | b'.' | b'+' | b'-' | b'e' | b'E' => {
                self.buf.numeric()?;
                NodeKind::Numeric
            }
            b'n' | b'N' => {
                self.buf.null()?;
                NodeKind::Null
            }
            b't' | b'T' => {
                self.buf.true_()?;
                NodeKind::Bool
            }
            b'f' | b'F' => {
                self.buf.false_()?;
                NodeKind::Bool
            }
            _ => return Err(self.buf.symbol(c)),
        };
        self.link(kind, Text::Span(start, self.buf.index));
        Ok(self.after_value())
    }

    fn open(&mut self, c: u8) -> Result<State, ParseError> {
        if self.options.max_depth.is_some_and(|max| self.depth >= max) {
            return Err(ParseError::DepthLimitExceeded {
                depth: self.depth,
                position: self.buf.index,
            });
        }
        let start = self.buf.index;
        self.buf.step()?;
        let (kind, next) = if c == BRACKET_L {
            (NodeKind::Array, State::ArrayValueOrClose)
        } else {
            (NodeKind::Object, State::KeyOrClose)
        };
        let id = self.link(kind, Text::Span(start, start));
        self.current = Some(id);
        self.depth += 1;
        trace!("open {kind} at {start}, depth {}", self.depth);
        Ok(next)
    }

    fn close(&mut self) -> Result<State, ParseError> {
        let Some(id) = self.current else {
            return Err(self.buf.symbol(self.data[self.buf.index]));
        };
        self.buf.step()?;
        let slot = &mut self.slots[id.0];
        if let Text::Span(_, end) = &mut slot.text {
            *end = self.buf.index;
        }
        self.current = slot.parent;
        trace!("close {} at {}, depth {}", slot.kind, self.buf.index, self.depth);
        self.depth -= 1;
        Ok(self.after_value())
    }

    fn key(&mut self, c: u8) -> Result<State, ParseError> {
        if c != QUOTES {
            return Err(self.buf.symbol(c));
        }
        let start = self.buf.index;
        self.buf.string()?;
        let raw = &self.data[start..self.buf.index];
        let key = decode::string(raw.into()).map_err(|_| ParseError::UnexpectedSymbol {
            symbol: QUOTES,
            position: start,
        })?;
        self.key = Some(key);
        Ok(State::Colon)
    }

    fn comma_or_close(&mut self, c: u8) -> Result<State, ParseError> {
        let kind = self.current.map(|id| self.slots[id.0].kind);
        match (c, kind) {
            (COMMA, Some(NodeKind::Array)) => {
                self.buf.step()?;
                Ok(State::Value)
            }
            (COMMA, Some(NodeKind::Object)) => {
                self.buf.step()?;
                Ok(State::Key)
            }
            (BRACKET_R, Some(NodeKind::Array)) | (BRACES_R, Some(NodeKind::Object)) => self.close(),
            _ => Err(self.buf.symbol(c)),
        }
    }

    fn after_value(&self) -> State {
        if self.current.is_some() {
            State::CommaOrClose
        } else {
            State::End
        }
    }

    /// Pushes a new slot and links it under the current container.
    fn link(&mut self, kind: NodeKind, text: Text) -> NodeId {
        let id = NodeId(self.slots.len());
        let Some(parent) = self.current else {
            self.slots.push(Slot::new(kind, text, Link::Root, None));
            self.root = Some(id);
            return id;
        };
        let link = match &self.slots[parent.0].children {
            Children::Array(items) => Link::Index(items.len()),
            _ => Link::Key(self.key.take().unwrap_or_default()),
        };
        self.slots.push(Slot::new(kind, text, link.clone(), Some(parent)));
        let replaced = match (&mut self.slots[parent.0].children, link) {
            (Children::Array(items), _) => {
                items.push(id);
                None
            }
            (Children::Object(members), Link::Key(key)) => members.insert(key, id),
            _ => None,
        };
        // a repeated key keeps its first position and the last value
        if let Some(old) = replaced {
            let old = &mut self.slots[old.0];
            old.parent = None;
            old.link = Link::Root;
        }
        id
    }
}
