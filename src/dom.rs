//! Mapping between CFIs and positions within a document tree.
//!
//! The tree itself is supplied by the host through the [`Document`] trait,
//! so any DOM-like structure can be addressed.
//! [`XmlDocument`](xml::XmlDocument) is a ready-made implementation backed
//! by [`quick_xml`].
//!
//! # Examples
//! ```
//! # use epubcfi::errors::DocumentResult;
//! use epubcfi::cfi;
//! use epubcfi::dom::{self, AcceptAll, Boundary, xml::XmlDocument};
//!
//! # fn main() -> DocumentResult<()> {
//! let doc = XmlDocument::parse("<html><head/><body><p>Hello, world</p></body></html>")?;
//! let range = dom::to_range(&doc, &cfi::parse("/4/2/1:7"), &AcceptAll).unwrap();
//!
//! let Boundary::At { node, offset } = range.start else { unreachable!() };
//! assert_eq!("Hello, world", doc.text(node));
//! assert_eq!(7, offset);
//!
//! assert_eq!("epubcfi(/4/2/1:7)", dom::from_range(&doc, &range, &AcceptAll).to_string());
//! # Ok(())
//! # }
//! ```

mod index;
mod locate;
pub mod xml;

pub use index::{Slot, index_children};
pub use locate::{derive_path, from_elements, from_range, resolve, resolve_path, to_element, to_range};

/// The kind of a node within a [`Document`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An element, such as `<p>`.
    Element,
    /// A text node.
    Text,
    /// A CDATA section.
    CData,
    /// Any other node (comments, processing instructions, etc.),
    /// which does not take part in CFI indexing.
    Other,
}

impl NodeKind {
    /// Returns `true` if the kind is [`Self::Text`] or [`Self::CData`].
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text | Self::CData)
    }
}

/// Read-only access to a host document tree.
///
/// Nodes are handles: cheap to clone and compared by identity.
pub trait Document {
    /// Handle to a node within the document.
    type Node: Clone + PartialEq;

    /// The root element of the document (e.g., `<html>`).
    fn document_element(&self) -> Option<Self::Node>;

    /// The kind of `node`.
    fn kind(&self, node: &Self::Node) -> NodeKind;

    /// All children of `node` in document order, including
    /// nodes of kind [`NodeKind::Other`].
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// The parent of `node`, or [`None`] for the topmost node.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// The length of the textual content of `node`,
    /// in the same unit the host uses for range offsets.
    fn text_len(&self, node: &Self::Node) -> usize;

    /// The `id` attribute of `node`, if any.
    fn id(&self, node: &Self::Node) -> Option<String>;

    /// Looks up a node by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// The first child of `node`, including nodes of any kind.
    fn first_child(&self, node: &Self::Node) -> Option<Self::Node> {
        self.children(node).into_iter().next()
    }

    /// The last child of `node`, including nodes of any kind.
    fn last_child(&self, node: &Self::Node) -> Option<Self::Node> {
        self.children(node).pop()
    }
}

/// The decision of a [`NodeFilter`] for a single node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterAction {
    /// The node takes part in indexing.
    #[default]
    Keep,
    /// The node and its entire subtree are ignored.
    Drop,
    /// The node is ignored, while its children are indexed
    /// as if they were children of the node's parent.
    Flatten,
}

/// Excludes injected nodes (e.g., highlight wrappers) from indexing,
/// so that CFIs remain stable regardless of host modifications.
///
/// Any `Fn(&N) -> FilterAction` closure is a filter.
///
/// # Examples
/// ```
/// # use epubcfi::errors::DocumentResult;
/// use epubcfi::dom::{self, FilterAction, xml::{NodeId, XmlDocument}};
///
/// # fn main() -> DocumentResult<()> {
/// let doc = XmlDocument::parse(
///     "<html><body><p>Hello, <mark>world</mark></p></body></html>",
/// )?;
/// let p = doc.elements("p").next().unwrap();
/// let filter = |node: &NodeId| match doc.name(*node) {
///     Some("mark") => FilterAction::Flatten,
///     _ => FilterAction::Keep,
/// };
///
/// // Without the injected <mark>, the paragraph holds a single text chunk
/// assert_eq!(3, dom::index_children(&doc, &p, &filter).len());
/// assert_eq!(5, dom::index_children(&doc, &p, &dom::AcceptAll).len());
/// # Ok(())
/// # }
/// ```
pub trait NodeFilter<N> {
    /// Decides how `node` takes part in indexing.
    fn filter(&self, node: &N) -> FilterAction;
}

impl<N, F> NodeFilter<N> for F
where
    F: Fn(&N) -> FilterAction,
{
    fn filter(&self, node: &N) -> FilterAction {
        self(node)
    }
}

/// A [`NodeFilter`] that keeps every node.
#[derive(Copy, Clone, Debug, Default)]
pub struct AcceptAll;

impl<N> NodeFilter<N> for AcceptAll {
    fn filter(&self, _: &N) -> FilterAction {
        FilterAction::Keep
    }
}

/// The result of resolving a CFI path against a [`Document`].
#[derive(Clone, Debug, PartialEq)]
pub enum Position<N> {
    /// A node, with a character offset if the path supplied one.
    At {
        /// The resolved node.
        node: N,
        /// The character offset within `node`.
        offset: Option<usize>,
    },
    /// Immediately before the node.
    Before(N),
    /// Immediately after the node.
    After(N),
}

impl<N> Position<N> {
    /// The node this position is anchored on.
    pub fn node(&self) -> &N {
        match self {
            Self::At { node, .. } | Self::Before(node) | Self::After(node) => node,
        }
    }

    /// Takes the node this position is anchored on.
    pub fn into_node(self) -> N {
        match self {
            Self::At { node, .. } | Self::Before(node) | Self::After(node) => node,
        }
    }
}

impl<N> From<Position<N>> for Boundary<N> {
    fn from(position: Position<N>) -> Self {
        match position {
            Position::At { node, offset } => Self::At {
                node,
                offset: offset.unwrap_or_default(),
            },
            Position::Before(node) => Self::Before(node),
            Position::After(node) => Self::After(node),
        }
    }
}

/// One end of a [`DomRange`].
#[derive(Clone, Debug, PartialEq)]
pub enum Boundary<N> {
    /// Within `node` at `offset`, mirroring a DOM `setStart(node, offset)`.
    At {
        /// The container node.
        node: N,
        /// Character offset for text nodes, otherwise a child offset.
        offset: usize,
    },
    /// Mirrors a DOM `setStartBefore(node)`.
    Before(N),
    /// Mirrors a DOM `setStartAfter(node)`.
    After(N),
}

/// A host-agnostic range between two [`Boundary`] points.
#[derive(Clone, Debug, PartialEq)]
pub struct DomRange<N> {
    /// The start of the range.
    pub start: Boundary<N>,
    /// The end of the range.
    pub end: Boundary<N>,
}

impl<N: PartialEq> DomRange<N> {
    /// Creates a range from `start` to `end`.
    pub fn new(start: Boundary<N>, end: Boundary<N>) -> Self {
        Self { start, end }
    }

    /// Returns `true` if the start and end are the same point.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

impl<N: Clone> DomRange<N> {
    /// Creates a collapsed range at `boundary`.
    pub fn collapsed(boundary: Boundary<N>) -> Self {
        Self {
            start: boundary.clone(),
            end: boundary,
        }
    }
}
