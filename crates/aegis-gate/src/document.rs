//! In-memory host document
//!
//! `MemoryDocument` implements `DocumentSource` over a parsed HTML tree
//! (`scraper::Html`), and selectors are full CSS matched by `scraper`. It
//! stands in for the webmail page in the CLI and in tests: clones share the
//! same tree, so the host side can open messages while the gate reads and
//! annotates them.

use crate::banner::escape_html;
use aegis_domain::{DocumentSource, Element, NodeId};
use ego_tree::{NodeId as TreeId, NodeMut, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Attribute marking a style-isolated subtree (the stand-in for a shadow root)
pub const ISOLATED_ATTR: &str = "data-aegis-isolated";

/// Errors raised by document operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DocumentError {
    /// The node does not exist (or was removed)
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// The root node cannot be removed
    #[error("Cannot remove the document root")]
    RootRemoval,

    /// The selector could not be parsed
    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector {
        /// Selector as given
        selector: String,
        /// Parser error
        reason: String,
    },

    /// An element was expected but the markup produced none
    #[error("Markup produced no element: '{0}'")]
    NoElement(String),
}

/// Parse a CSS selector
///
/// # Examples
///
/// ```
/// use aegis_gate::document::parse_selector;
///
/// assert!(parse_selector("div.thread > .a3s.aiL").is_ok());
/// assert!(parse_selector("div[").is_err());
/// ```
pub fn parse_selector(selector: &str) -> Result<Selector, DocumentError> {
    Selector::parse(selector).map_err(|e| DocumentError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Kind of structural change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// A child was inserted under the target
    ChildAdded,
    /// A child was removed from the target
    ChildRemoved,
    /// The target's own text changed
    TextChanged,
}

/// A structural change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mutation {
    /// What changed
    pub kind: MutationKind,
    /// Node whose subtree changed
    pub target: NodeId,
}

struct DocumentTree {
    html: Html,
    body: TreeId,
    handles: HashMap<TreeId, NodeId>,
    nodes: HashMap<NodeId, TreeId>,
    next_id: u64,
    observers: Vec<UnboundedSender<Mutation>>,
    alerts: Vec<String>,
}

impl fmt::Debug for DocumentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentTree")
            .field("handles", &self.handles.len())
            .field("observers", &self.observers.len())
            .field("alerts", &self.alerts.len())
            .finish()
    }
}

fn tree_id(element: ElementRef<'_>) -> TreeId {
    let node: NodeRef<'_, Node> = *element;
    node.id()
}

impl DocumentTree {
    fn new() -> Self {
        let html = Html::parse_document("");
        let root = html.root_element();
        let body = (*root)
            .children()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "body")
            .map(tree_id)
            .unwrap_or_else(|| tree_id(root));

        let handle = NodeId::from_value(0);
        Self {
            html,
            body,
            handles: HashMap::from([(body, handle)]),
            nodes: HashMap::from([(handle, body)]),
            next_id: 1,
            observers: Vec::new(),
            alerts: Vec::new(),
        }
    }

    fn handle(&mut self, id: TreeId) -> NodeId {
        if let Some(handle) = self.handles.get(&id) {
            return *handle;
        }
        let handle = NodeId::from_value(self.next_id);
        self.next_id += 1;
        self.handles.insert(id, handle);
        self.nodes.insert(handle, id);
        handle
    }

    fn root(&self) -> NodeId {
        self.handles
            .get(&self.body)
            .copied()
            .unwrap_or(NodeId::from_value(0))
    }

    fn is_attached(&self, id: TreeId) -> bool {
        self.html
            .tree
            .get(id)
            .is_some_and(|node| node.id() == self.body || node.ancestors().any(|a| a.id() == self.body))
    }

    fn locate(&self, node: NodeId) -> Result<TreeId, DocumentError> {
        self.nodes
            .get(&node)
            .copied()
            .filter(|id| self.is_attached(*id))
            .ok_or(DocumentError::NodeNotFound(node))
    }

    fn element_ref(&self, id: TreeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// Parse `markup` and copy its top-level nodes under `parent`
    fn graft(&mut self, parent: NodeId, markup: &str, first: bool) -> Result<Vec<TreeId>, DocumentError> {
        let target_id = self.locate(parent)?;
        let fragment = Html::parse_fragment(markup);
        let sources: Vec<NodeRef<'_, Node>> = (*fragment.root_element()).children().collect();
        let Some(mut target) = self.html.tree.get_mut(target_id) else {
            return Err(DocumentError::NodeNotFound(parent));
        };

        let mut copies = Vec::with_capacity(sources.len());
        if first {
            for source in sources.iter().rev() {
                let mut copy = target.prepend(source.value().clone());
                copy_children(&mut copy, *source);
                copies.push(copy.id());
            }
            copies.reverse();
        } else {
            for source in &sources {
                let mut copy = target.append(source.value().clone());
                copy_children(&mut copy, *source);
                copies.push(copy.id());
            }
        }
        Ok(copies)
    }

    fn insert(&mut self, parent: NodeId, element: &Element, first: bool) -> Result<NodeId, DocumentError> {
        let copies = self.graft(parent, &render(element), first)?;
        let Some(id) = copies.iter().copied().find(|id| self.element_ref(*id).is_some()) else {
            for copy in copies {
                self.detach(copy);
            }
            return Err(DocumentError::NoElement(element.tag.clone()));
        };
        let handle = self.handle(id);
        self.notify(MutationKind::ChildAdded, parent);
        Ok(handle)
    }

    fn append_html(&mut self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>, DocumentError> {
        let copies = self.graft(parent, markup, false)?;
        let elements: Vec<TreeId> = copies
            .into_iter()
            .filter(|id| self.element_ref(*id).is_some())
            .collect();
        let handles = elements.into_iter().map(|id| self.handle(id)).collect();
        self.notify(MutationKind::ChildAdded, parent);
        Ok(handles)
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DocumentError> {
        let id = self.locate(node)?;
        let children: Vec<TreeId> = self
            .html
            .tree
            .get(id)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default();
        for child in children {
            self.detach(child);
        }
        self.graft(node, &escape_html(text), false)?;
        self.notify(MutationKind::TextChanged, node);
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<(), DocumentError> {
        let id = self.locate(node)?;
        if id == self.body {
            return Err(DocumentError::RootRemoval);
        }
        let parent = self.html.tree.get(id).and_then(|n| n.parent()).map(|p| p.id());
        self.detach(id);
        if let Some(parent) = parent {
            let parent = self.handle(parent);
            self.notify(MutationKind::ChildRemoved, parent);
        }
        Ok(())
    }

    /// Detach a subtree and forget the handles inside it
    fn detach(&mut self, id: TreeId) {
        let removed: Vec<TreeId> = self
            .html
            .tree
            .get(id)
            .map(|n| n.descendants().map(|d| d.id()).collect())
            .unwrap_or_default();
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
        for tree_id in removed {
            if let Some(handle) = self.handles.remove(&tree_id) {
                self.nodes.remove(&handle);
            }
        }
    }

    fn notify(&mut self, kind: MutationKind, target: NodeId) {
        let mutation = Mutation { kind, target };
        self.observers.retain(|tx| tx.send(mutation).is_ok());
    }

    fn select(&mut self, selector: &Selector) -> Vec<NodeId> {
        let matches: Vec<TreeId> = match self.element_ref(self.body) {
            Some(body) => body.select(selector).map(tree_id).collect(),
            None => Vec::new(),
        };
        matches.into_iter().map(|id| self.handle(id)).collect()
    }

    fn find_marked(&mut self, marker: &str) -> Option<NodeId> {
        let found = self
            .html
            .tree
            .get(self.body)?
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().id() == Some(marker))
            .map(tree_id)?;
        Some(self.handle(found))
    }

    fn inner_text(&self, node: NodeId) -> Option<String> {
        let id = self.locate(node).ok()?;
        let mut parts = Vec::new();
        collect_text(self.html.tree.get(id)?, &mut parts);
        Some(parts.join("\n"))
    }

    fn element(&self, node: NodeId) -> Option<Element> {
        let element = self.element_ref(self.locate(node).ok()?)?;
        let value = element.value();
        Some(Element {
            tag: value.name().to_string(),
            marker: value.id().map(str::to_string),
            classes: value.classes().map(str::to_string).collect(),
            content: element.inner_html(),
            isolated: value.attr(ISOLATED_ATTR).is_some(),
        })
    }

    fn children(&mut self, node: NodeId) -> Vec<NodeId> {
        let Ok(id) = self.locate(node) else {
            return Vec::new();
        };
        let ids: Vec<TreeId> = self
            .html
            .tree
            .get(id)
            .map(|n| {
                n.children()
                    .filter(|c| c.value().is_element())
                    .map(|c| c.id())
                    .collect()
            })
            .unwrap_or_default();
        ids.into_iter().map(|id| self.handle(id)).collect()
    }
}

fn copy_children(target: &mut NodeMut<'_, Node>, source: NodeRef<'_, Node>) {
    for child in source.children() {
        let mut copy = target.append(child.value().clone());
        copy_children(&mut copy, child);
    }
}

/// Visible text: trimmed text nodes, skipping isolated subtrees, styles and scripts
fn collect_text(node: NodeRef<'_, Node>, parts: &mut Vec<String>) {
    match node.value() {
        Node::Text(text) => {
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        }
        Node::Element(element) => {
            if element.attr(ISOLATED_ATTR).is_some() || matches!(element.name(), "style" | "script") {
                return;
            }
            for child in node.children() {
                collect_text(child, parts);
            }
        }
        _ => {}
    }
}

/// Serialize a domain element; its content is taken as markup
fn render(element: &Element) -> String {
    let mut attrs = String::new();
    if let Some(marker) = &element.marker {
        attrs.push_str(&format!(" id=\"{}\"", escape_html(marker)));
    }
    if !element.classes.is_empty() {
        attrs.push_str(&format!(" class=\"{}\"", escape_html(&element.classes.join(" "))));
    }
    if element.isolated {
        attrs.push(' ');
        attrs.push_str(ISOLATED_ATTR);
    }
    format!(
        "<{tag}{attrs}>{content}</{tag}>",
        tag = element.tag,
        attrs = attrs,
        content = element.content
    )
}

/// Shared, observable in-memory document
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    tree: Arc<Mutex<DocumentTree>>,
}

impl MemoryDocument {
    /// Create an empty document; its `body` is the root
    pub fn new() -> Self {
        Self {
            tree: Arc::new(Mutex::new(DocumentTree::new())),
        }
    }

    fn tree(&self) -> MutexGuard<'_, DocumentTree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The root node (`body`)
    pub fn root(&self) -> NodeId {
        self.tree().root()
    }

    /// Subscribe to structural changes
    ///
    /// Every mutation made through any clone of this document is delivered to
    /// every subscriber.
    pub fn observe(&self) -> UnboundedReceiver<Mutation> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.tree().observers.push(tx);
        rx
    }

    /// Stop delivering mutations; every subscribed stream ends once drained
    pub fn disconnect(&self) {
        self.tree().observers.clear();
    }

    /// Append an element as the last child of `parent`
    pub fn append_child(&self, parent: NodeId, element: Element) -> Result<NodeId, DocumentError> {
        self.tree().insert(parent, &element, false)
    }

    /// Parse an HTML fragment and append it under `parent`
    ///
    /// Returns the top-level elements that were added. One mutation is
    /// reported for the whole fragment.
    pub fn append_html(&self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>, DocumentError> {
        self.tree().append_html(parent, markup)
    }

    /// Replace a node's children with a single text node
    pub fn set_text(&self, node: NodeId, text: impl AsRef<str>) -> Result<(), DocumentError> {
        self.tree().set_text(node, text.as_ref())
    }

    /// Remove a node and its subtree
    pub fn remove_node(&self, node: NodeId) -> Result<(), DocumentError> {
        self.tree().remove(node)
    }

    /// Snapshot of a node's element; `content` is its inner HTML
    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.tree().element(node)
    }

    /// Child elements of a node, in order
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree().children(node)
    }

    /// Notifications shown so far
    pub fn alerts(&self) -> Vec<String> {
        self.tree().alerts.clone()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSource for MemoryDocument {
    type Error = DocumentError;

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        match parse_selector(selector) {
            Ok(selector) => self.tree().select(&selector),
            Err(_) => Vec::new(),
        }
    }

    fn inner_text(&self, node: NodeId) -> Option<String> {
        self.tree().inner_text(node)
    }

    fn insert_first_child(
        &mut self,
        container: NodeId,
        element: Element,
    ) -> Result<NodeId, Self::Error> {
        self.tree().insert(container, &element, true)
    }

    fn find_marked(&self, marker: &str) -> Option<NodeId> {
        self.tree().find_marked(marker)
    }

    fn remove(&mut self, node: NodeId) -> Result<(), Self::Error> {
        self.tree().remove(node)
    }

    fn alert(&mut self, message: &str) {
        self.tree().alerts.push(message.to_string());
    }
}
