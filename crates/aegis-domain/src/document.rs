//! Document module - the host document as a capability
//!
//! The gate never touches a concrete page. It reads and writes through
//! [`DocumentSource`], which a browser binding or the in-memory document
//! used by the CLI and the tests implement.

use std::fmt;

/// Opaque handle to a node in a host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a node handle from a raw value
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// An element to be inserted into a host document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Tag name (e.g., "div")
    pub tag: String,

    /// Fixed identity marker (the `id` attribute in an HTML document)
    pub marker: Option<String>,

    /// Class names
    pub classes: Vec<String>,

    /// Text or markup carried by the element
    pub content: String,

    /// Style-isolated subtree: host styles do not apply, and its content is
    /// not part of the surrounding visible text
    pub isolated: bool,
}

impl Element {
    /// Create an element with the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set the identity marker
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Add a class name
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set the element content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Mark the element as a style-isolated root
    pub fn isolated(mut self) -> Self {
        self.isolated = true;
        self
    }
}

/// Queryable, mutable host document
///
/// Implemented by the infrastructure layer (aegis-gate's `MemoryDocument`, or
/// a browser binding).
pub trait DocumentSource {
    /// Error type for document mutations
    type Error;

    /// All nodes matching a CSS selector, in document order
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// Visible text of a node, or `None` if the node no longer exists
    fn inner_text(&self, node: NodeId) -> Option<String>;

    /// Insert an element as the first child of `container`
    fn insert_first_child(&mut self, container: NodeId, element: Element)
        -> Result<NodeId, Self::Error>;

    /// Find the node carrying the given identity marker
    fn find_marked(&self, marker: &str) -> Option<NodeId>;

    /// Remove a node and its subtree
    fn remove(&mut self, node: NodeId) -> Result<(), Self::Error>;

    /// Show a blocking notification to the user
    fn alert(&mut self, message: &str);
}
