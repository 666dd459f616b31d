use crate::dom::{Document, FilterAction, NodeFilter, NodeKind};

/// A single position within the CFI child index of a node.
///
/// The index of a slot within the list returned by [`index_children`]
/// is the step index a CFI uses to address it.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot<N> {
    /// Virtual position before all children (index `0`).
    Before,
    /// Virtual position before the first child element,
    /// present only when the first child is an element.
    First,
    /// A child element (always an even index).
    Element(N),
    /// Consecutive text nodes merged into one position (always an odd index).
    ///
    /// May be empty when separating two adjacent elements.
    Chunk(Vec<N>),
    /// Virtual position after the last child element,
    /// present only when the last child is an element.
    Last,
    /// Virtual position after all children (always the last index).
    After,
}

impl<N: PartialEq> Slot<N> {
    /// Returns `true` if `node` occupies this slot.
    pub fn contains(&self, node: &N) -> bool {
        match self {
            Self::Element(element) => element == node,
            Self::Chunk(nodes) => nodes.contains(node),
            _ => false,
        }
    }
}

/// Builds the CFI child index of `node`.
///
/// Only element and text children take part, after `filter` is applied.
/// Elements always land on even indices, and text chunks on odd indices.
///
/// # Examples
/// ```
/// # use epubcfi::errors::DocumentResult;
/// use epubcfi::dom::{self, AcceptAll, Slot, xml::XmlDocument};
///
/// # fn main() -> DocumentResult<()> {
/// let doc = XmlDocument::parse("<p>a<!-- note -->b<br/><br/></p>")?;
/// let p = doc.elements("p").next().unwrap();
/// let slots = dom::index_children(&doc, &p, &AcceptAll);
///
/// assert_eq!(Slot::Before, slots[0]);
/// // Text on either side of the comment shares one chunk
/// assert!(matches!(&slots[1], Slot::Chunk(text) if text.len() == 2));
/// assert!(matches!(slots[2], Slot::Element(_)));
/// assert_eq!(Slot::Chunk(Vec::new()), slots[3]);
/// assert!(matches!(slots[4], Slot::Element(_)));
/// assert_eq!(Slot::Last, slots[5]);
/// assert_eq!(Slot::After, slots[6]);
/// # Ok(())
/// # }
/// ```
pub fn index_children<D, F>(doc: &D, node: &D::Node, filter: &F) -> Vec<Slot<D::Node>>
where
    D: Document + ?Sized,
    F: NodeFilter<D::Node> + ?Sized,
{
    let mut nodes = Vec::new();
    child_nodes(doc, node, filter, &mut nodes);

    let mut slots = Vec::with_capacity(nodes.len() + 4);
    slots.push(Slot::Before);

    for child in nodes {
        if doc.kind(&child) != NodeKind::Element {
            if let Some(Slot::Chunk(chunk)) = slots.last_mut() {
                chunk.push(child);
            } else {
                slots.push(Slot::Chunk(vec![child]));
            }
            continue;
        }
        match slots.last() {
            Some(Slot::Before) => slots.push(Slot::First),
            Some(Slot::Element(_)) => slots.push(Slot::Chunk(Vec::new())),
            _ => {}
        }
        slots.push(Slot::Element(child));
    }

    if let Some(Slot::Element(_)) = slots.last() {
        slots.push(Slot::Last);
    }
    slots.push(Slot::After);
    slots
}

/// Collects the element and text children of `node` that pass `filter`.
fn child_nodes<D, F>(doc: &D, node: &D::Node, filter: &F, nodes: &mut Vec<D::Node>)
where
    D: Document + ?Sized,
    F: NodeFilter<D::Node> + ?Sized,
{
    for child in doc.children(node) {
        let kind = doc.kind(&child);

        if kind != NodeKind::Element && !kind.is_text() {
            continue;
        }
        match filter.filter(&child) {
            FilterAction::Keep => nodes.push(child),
            FilterAction::Flatten => child_nodes(doc, &child, filter, nodes),
            FilterAction::Drop => {}
        }
    }
}
