#![forbid(unsafe_code)]

//! In-memory document tree with listener dispatch.
//!
//! A [`Document`] is a minimal element/text tree rooted at a `body` element.
//! It is the reference render target for widgets that mount DOM-shaped
//! content, and it mirrors the parts of browser DOM semantics widgets rely
//! on: node creation, insertion, removal, attribute queries, and click /
//! keydown listeners.
//!
//! # Architecture
//!
//! `Document` is a cheap handle over `Rc<RefCell<..>>`; clones share the same
//! tree (single-threaded, like the UI event loop it models). Listener
//! callbacks are cloned out of the tree before they run, so a callback may
//! freely mutate the document, including removing the node it is attached to.
//!
//! # Invariants
//!
//! 1. `body()` always exists and is never removed.
//! 2. A node has at most one parent; appending a node moves it.
//! 3. Removing a node drops its whole subtree and every listener attached
//!    inside it.
//! 4. Click events bubble from the target to `body`.
//! 5. Key events target the top layer (the last element child of `body`)
//!    and bubble to `body`. Layers underneath never see them.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown node | Stale `NodeId` | Queries return `None`/empty, mutations return `false` |
//! | Remove body | Caller error | Returns `false`, tree untouched |
//! | Append creating a cycle | Ancestor appended to descendant | Returns `false` |

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

use crate::event::KeyEvent;

/// Identifier of a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Kinds of events a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Primary activation (mouse click, Enter/Space on a button).
    Click,
    /// Key press routed to the top layer of the document.
    KeyDown,
}

/// Event payload delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    /// A click on the target node or one of its descendants.
    Click { target: NodeId },
    /// A key press.
    Key(KeyEvent),
}

impl DocumentEvent {
    /// The listener kind this event is delivered to.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Click { .. } => EventKind::Click,
            Self::Key(_) => EventKind::KeyDown,
        }
    }
}

/// Listener callback.
pub type Listener = Rc<dyn Fn(&DocumentEvent)>;

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct RegisteredListener {
    kind: EventKind,
    callback: Listener,
}

struct DocumentInner {
    nodes: AHashMap<NodeId, NodeData>,
    listeners: AHashMap<NodeId, Vec<RegisteredListener>>,
    body: NodeId,
    next_id: u32,
}

impl DocumentInner {
    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeData {
                kind,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(&node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node) && self.is_ancestor_or_self(self.body, node)
    }

    fn top_layer(&self) -> NodeId {
        self.nodes
            .get(&self.body)
            .and_then(|body| {
                body.children.iter().rev().copied().find(|child| {
                    matches!(
                        self.nodes.get(child).map(|n| &n.kind),
                        Some(NodeKind::Element { .. })
                    )
                })
            })
            .unwrap_or(self.body)
    }

    /// Listeners of `kind` on the path from `target` up to `body`.
    fn bubble_path(&self, target: NodeId, kind: EventKind) -> Vec<Listener> {
        let mut callbacks = Vec::new();
        let mut cursor = Some(target);
        while let Some(id) = cursor {
            if let Some(list) = self.listeners.get(&id) {
                callbacks.extend(
                    list.iter()
                        .filter(|l| l.kind == kind)
                        .map(|l| Rc::clone(&l.callback)),
                );
            }
            cursor = self.nodes.get(&id).and_then(|n| n.parent);
        }
        callbacks
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get_mut(&node).and_then(|n| n.parent.take());
        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(&parent)
        {
            p.children.retain(|&c| c != node);
        }
    }

    /// Remove `node` and its descendants, handing back their listeners so
    /// the caller can drop them outside the borrow.
    fn drop_subtree(&mut self, node: NodeId) -> (usize, Vec<RegisteredListener>) {
        let mut stack = vec![node];
        let mut dropped = 0;
        let mut released = Vec::new();
        while let Some(id) = stack.pop() {
            if let Some(data) = self.nodes.remove(&id) {
                stack.extend(data.children);
                dropped += 1;
            }
            if let Some(list) = self.listeners.remove(&id) {
                released.extend(list);
            }
        }
        (dropped, released)
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for &child in &data.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(&node) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => escape_into(text, out),
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, out);
                    out.push('"');
                }
                out.push('>');
                for &child in &data.children {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

/// Shared handle to an in-memory document tree.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("nodes", &inner.nodes.len())
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document containing only `body`.
    #[must_use]
    pub fn new() -> Self {
        let mut inner = DocumentInner {
            nodes: AHashMap::new(),
            listeners: AHashMap::new(),
            body: NodeId(0),
            next_id: 0,
        };
        inner.body = inner.alloc(NodeKind::Element {
            tag: "body".to_owned(),
            attributes: Vec::new(),
        });
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// The root `body` element.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    // --- Construction ---

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.inner.borrow_mut().alloc(NodeKind::Element {
            tag: tag.to_owned(),
            attributes: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        self.inner
            .borrow_mut()
            .alloc(NodeKind::Text(text.to_owned()))
    }

    /// Set (or replace) an attribute on an element.
    ///
    /// Returns `false` if the node is unknown or is a text node.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(NodeData {
            kind: NodeKind::Element { attributes, .. },
            ..
        }) = inner.nodes.get_mut(&node)
        else {
            return false;
        };
        match attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_owned(),
            None => attributes.push((name.to_owned(), value.to_owned())),
        }
        true
    }

    /// Append `child` as the last child of `parent`, moving it if needed.
    ///
    /// Returns `false` (and leaves the tree untouched) if either node is
    /// unknown, `parent` is a text node, `child` is `body`, or `child` is an
    /// ancestor of `parent`.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let parent_is_element = matches!(
            inner.nodes.get(&parent).map(|n| &n.kind),
            Some(NodeKind::Element { .. })
        );
        if !parent_is_element
            || !inner.nodes.contains_key(&child)
            || child == inner.body
            || inner.is_ancestor_or_self(child, parent)
        {
            return false;
        }
        inner.detach(child);
        if let Some(c) = inner.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
        if let Some(p) = inner.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        true
    }

    /// Remove a node and its subtree from the document.
    ///
    /// Listeners registered inside the subtree are dropped. Returns `false`
    /// if the node is unknown (already removed) or is `body`.
    pub fn remove(&self, node: NodeId) -> bool {
        let mut inner = self.inner.borrow_mut();
        if node == inner.body || !inner.nodes.contains_key(&node) {
            tracing::trace!(node = node.id(), "remove of unknown node ignored");
            return false;
        }
        inner.detach(node);
        let (dropped, released) = inner.drop_subtree(node);
        drop(inner);
        // Listener captures may own state that touches this document on drop.
        drop(released);
        tracing::trace!(node = node.id(), dropped, "subtree removed");
        true
    }

    // --- Queries ---

    /// Whether the node exists (attached or not).
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.borrow().nodes.contains_key(&node)
    }

    /// Whether the node is reachable from `body`.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.inner.borrow().is_attached(node)
    }

    /// Number of live nodes, including `body`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    /// Element tag name, or `None` for text/unknown nodes.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<String> {
        match &self.inner.borrow().nodes.get(&node)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    /// Attribute value on an element.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.inner.borrow().nodes.get(&node)?.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone()),
            NodeKind::Text(_) => None,
        }
    }

    /// Parent of a node.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().nodes.get(&node)?.parent
    }

    /// Children of a node in document order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .borrow()
            .nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Concatenated text of a node and its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.inner.borrow().collect_text(node, &mut out);
        out
    }

    /// Attached elements whose `class` attribute contains `class`,
    /// in document order.
    #[must_use]
    pub fn query_class(&self, class: &str) -> Vec<NodeId> {
        let inner = self.inner.borrow();
        let mut found = Vec::new();
        let mut stack = vec![inner.body];
        while let Some(id) = stack.pop() {
            let Some(data) = inner.nodes.get(&id) else {
                continue;
            };
            if let NodeKind::Element { attributes, .. } = &data.kind
                && attributes
                    .iter()
                    .any(|(n, v)| n == "class" && v.split_whitespace().any(|c| c == class))
            {
                found.push(id);
            }
            stack.extend(data.children.iter().rev());
        }
        found
    }

    /// Serialize a node as HTML.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.inner.borrow().write_html(node, &mut out);
        out
    }

    // --- Events ---

    /// Register a listener on a node.
    ///
    /// Returns `false` if the node is unknown.
    pub fn add_listener(&self, node: NodeId, kind: EventKind, callback: Listener) -> bool {
        let mut inner = self.inner.borrow_mut();
        if !inner.nodes.contains_key(&node) {
            return false;
        }
        inner
            .listeners
            .entry(node)
            .or_default()
            .push(RegisteredListener { kind, callback });
        true
    }

    /// Number of listeners currently registered in the document.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.values().map(Vec::len).sum()
    }

    /// Dispatch a click on `target`, bubbling to `body`.
    ///
    /// Detached targets receive nothing. Returns `true` if any listener ran.
    pub fn click(&self, target: NodeId) -> bool {
        let callbacks: Vec<Listener> = {
            let inner = self.inner.borrow();
            if !inner.is_attached(target) {
                return false;
            }
            inner.bubble_path(target, EventKind::Click)
        };
        let event = DocumentEvent::Click { target };
        for callback in &callbacks {
            callback(&event);
        }
        !callbacks.is_empty()
    }

    /// The element key events are dispatched to: the last element child of
    /// `body`, or `body` itself when it has none.
    #[must_use]
    pub fn key_target(&self) -> NodeId {
        self.inner.borrow().top_layer()
    }

    /// Dispatch a key press to the top layer, bubbling to `body`.
    ///
    /// A top layer without keydown listeners swallows the press. Returns
    /// `true` if a listener ran.
    pub fn key(&self, key: KeyEvent) -> bool {
        let callbacks = {
            let inner = self.inner.borrow();
            let target = inner.top_layer();
            inner.bubble_path(target, EventKind::KeyDown)
        };
        let event = DocumentEvent::Key(key);
        for callback in &callbacks {
            callback(&event);
        }
        !callbacks.is_empty()
    }
}
