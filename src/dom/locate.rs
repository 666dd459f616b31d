use crate::cfi::{Assertion, Cfi, IndirectPath, Part, Path, build_range};
use crate::dom::index::{Slot, index_children};
use crate::dom::{
    AcceptAll, Boundary, Document, DomRange, FilterAction, NodeFilter, NodeKind, Position,
};
use tracing::{debug, trace};

/// Walks `path` from `root` by index alone, ignoring id assertions.
///
/// Returns [`None`] when an index is unreadable or out of bounds,
/// when a text chunk is stepped through, or when the final offset exceeds
/// the text of the addressed chunk.
pub fn resolve_path<D, F>(
    doc: &D,
    root: &D::Node,
    path: &[Part],
    filter: &F,
) -> Option<Position<D::Node>>
where
    D: Document + ?Sized,
    F: NodeFilter<D::Node> + ?Sized,
{
    let mut node = root.clone();
    let mut chunk = None;

    for (depth, part) in path.iter().enumerate() {
        if chunk.is_some() {
            trace!(depth, "cannot step into a text chunk");
            return None;
        }
        let Some(index) = part.index else {
            trace!(depth, "unreadable step index");
            return None;
        };
        let Some(slot) = index_children(doc, &node, filter).into_iter().nth(index) else {
            trace!(depth, index, "step index out of bounds");
            return None;
        };
        match slot {
            Slot::Before => return Some(Position::Before(node)),
            Slot::After => return Some(Position::After(node)),
            Slot::First => {
                let first = doc.first_child(&node).unwrap_or(node);
                return Some(Position::At { node: first, offset: None });
            }
            Slot::Last => {
                let last = doc.last_child(&node).unwrap_or(node);
                return Some(Position::At { node: last, offset: None });
            }
            Slot::Element(element) => node = element,
            Slot::Chunk(nodes) => chunk = Some(nodes),
        }
    }

    let offset = path.last().and_then(|part| part.offset);
    match chunk {
        Some(nodes) => locate_in_chunk(doc, nodes, offset),
        None => Some(Position::At { node, offset }),
    }
}

/// Finds the member of a text chunk holding the chunk-cumulative `offset`.
fn locate_in_chunk<D>(
    doc: &D,
    nodes: Vec<D::Node>,
    offset: Option<usize>,
) -> Option<Position<D::Node>>
where
    D: Document + ?Sized,
{
    let Some(offset) = offset else {
        return nodes
            .into_iter()
            .next()
            .map(|node| Position::At { node, offset: None });
    };
    let mut sum = 0;

    for node in nodes {
        let len = doc.text_len(&node);

        if sum + len >= offset {
            return Some(Position::At {
                node,
                offset: Some(offset - sum),
            });
        }
        sum += len;
    }
    trace!(offset, len = sum, "offset exceeds text chunk");
    None
}

/// Resolves `path` against the document element of `doc`.
///
/// When the final part carries an id assertion referencing an element,
/// that element is returned directly. Otherwise, the path is walked by
/// index with [`resolve_path`].
pub fn resolve<D, F>(doc: &D, path: &Path, filter: &F) -> Option<Position<D::Node>>
where
    D: Document + ?Sized,
    F: NodeFilter<D::Node> + ?Sized,
{
    if let Some(position) = resolve_by_id(doc, path) {
        return Some(position);
    }
    let root = doc.document_element()?;
    let position = resolve_path(doc, &root, path, filter);

    if position.is_none() {
        debug!(path = %path, "path does not resolve within the document");
    }
    position
}

fn resolve_by_id<D>(doc: &D, path: &Path) -> Option<Position<D::Node>>
where
    D: Document + ?Sized,
{
    let last = path.last()?;
    let id = last.id()?;

    match doc.element_by_id(id) {
        Some(node) if doc.kind(&node) == NodeKind::Element && !last.is_text_position() => {
            Some(Position::At { node, offset: None })
        }
        Some(_) => {
            debug!(id, "id assertion does not match an element step; resolving by index");
            None
        }
        None => {
            debug!(id, "id assertion not found; resolving by index");
            None
        }
    }
}

/// Derives the path of `node` (and a character `offset` within it)
/// relative to the document element.
///
/// The offset of a text node is converted to be relative to the
/// entire text chunk the node belongs to.
/// Element parts carry the element's id as an assertion.
pub fn derive_path<D, F>(doc: &D, node: &D::Node, offset: Option<usize>, filter: &F) -> Path
where
    D: Document + ?Sized,
    F: NodeFilter<D::Node> + ?Sized,
{
    let root = doc.document_element();
    let mut parts = Vec::new();
    let mut current = node.clone();
    let mut offset = offset;

    while root.as_ref() != Some(&current) {
        let Some(parent) = indexed_parent(doc, &current, root.as_ref(), filter) else {
            break;
        };
        let slots = index_children(doc, &parent, filter);

        match slots.iter().position(|slot| slot.contains(&current)) {
            Some(index) => {
                let offset = match &slots[index] {
                    Slot::Chunk(nodes) => {
                        offset.map(|offset| chunk_offset(doc, nodes, &current) + offset)
                    }
                    _ => offset,
                };
                parts.push(node_part(doc, &current, index, offset));
            }
            None => trace!("node is excluded from its parent's index"),
        }
        offset = None;
        current = parent;
    }

    parts.reverse();
    Path(parts)
}

/// The total length of the chunk members preceding `node`.
fn chunk_offset<D>(doc: &D, nodes: &[D::Node], node: &D::Node) -> usize
where
    D: Document + ?Sized,
{
    nodes
        .iter()
        .take_while(|member| *member != node)
        .map(|member| doc.text_len(member))
        .sum()
}

fn node_part<D>(doc: &D, node: &D::Node, index: usize, offset: Option<usize>) -> Part
where
    D: Document + ?Sized,
{
    let mut part = Part::new(index);
    part.offset = offset;

    if doc.kind(node) == NodeKind::Element {
        part.assertion = doc
            .id(node)
            .filter(|id| !id.is_empty())
            .map(Assertion::Id);
    }
    part
}

/// The ancestor of `node` whose index holds it.
fn indexed_parent<D, F>(
    doc: &D,
    node: &D::Node,
    root: Option<&D::Node>,
    filter: &F,
) -> Option<D::Node>
where
    D: Document + ?Sized,
    F: NodeFilter<D::Node> + ?Sized,
{
    let mut parent = doc.parent(node)?;

    // Flattened ancestors contribute their children to the next one up
    while root != Some(&parent) && filter.filter(&parent) == FilterAction::Flatten {
        match doc.parent(&parent) {
            Some(ancestor) => parent = ancestor,
            None => break,
        }
    }
    Some(parent)
}

fn derive_boundary<D, F>(doc: &D, boundary: &Boundary<D::Node>, filter: &F) -> Path
where
    D: Document + ?Sized,
    F: NodeFilter<D::Node> + ?Sized,
{
    match boundary {
        // A child offset; zero addresses the element itself
        Boundary::At { node, offset } if *offset > 0 && doc.kind(node) == NodeKind::Element => {
            let children = doc.children(node);

            match (children.get(*offset), children.last()) {
                (Some(child), _) => derive_adjacent(doc, child, false, filter),
                (None, Some(last)) => derive_adjacent(doc, last, true, filter),
                (None, None) => derive_path(doc, node, None, filter),
            }
        }
        Boundary::At { node, offset } => derive_path(doc, node, Some(*offset), filter),
        Boundary::Before(node) => derive_adjacent(doc, node, false, filter),
        Boundary::After(node) => derive_adjacent(doc, node, true, filter),
    }
}

/// Derives the position immediately before (or after) `node`.
///
/// For an element, this is the end of the text chunk preceding it,
/// or the start of the one following it.
fn derive_adjacent<D, F>(doc: &D, node: &D::Node, after: bool, filter: &F) -> Path
where
    D: Document + ?Sized,
    F: NodeFilter<D::Node> + ?Sized,
{
    if doc.kind(node).is_text() {
        let offset = if after { doc.text_len(node) } else { 0 };
        return derive_path(doc, node, Some(offset), filter);
    }
    let root = doc.document_element();
    let parent = match indexed_parent(doc, node, root.as_ref(), filter) {
        Some(parent) if root.as_ref() != Some(node) => parent,
        _ => return derive_path(doc, node, None, filter),
    };
    let slots = index_children(doc, &parent, filter);

    let Some(index) = slots.iter().position(|slot| slot.contains(node)) else {
        trace!("node is excluded from its parent's index");
        return derive_path(doc, node, None, filter);
    };
    let part = if after {
        Part::new(index + 1).with_offset(0)
    } else {
        let index = index.saturating_sub(1);
        let offset: usize = match slots.get(index) {
            Some(Slot::Chunk(nodes)) => nodes.iter().map(|member| doc.text_len(member)).sum(),
            _ => 0,
        };
        Part::new(index).with_offset(offset)
    };

    let mut path = derive_path(doc, &parent, None, filter);
    path.push(part);
    path
}

/// Resolves `cfi` into a range within `doc`.
///
/// The CFI must be relative to the content document;
/// see [`Cfi::shift_outer`] to strip the package-level path.
/// Points produce a collapsed range.
///
/// Returns [`None`] if either endpoint cannot be resolved.
pub fn to_range<D, F>(doc: &D, cfi: &Cfi, filter: &F) -> Option<DomRange<D::Node>>
where
    D: Document + ?Sized,
    F: NodeFilter<D::Node> + ?Sized,
{
    let start = resolve(doc, cfi.collapse(false).first()?, filter)?;
    let end = if cfi.is_range() {
        resolve(doc, cfi.collapse(true).first()?, filter)?
    } else {
        start.clone()
    };

    Some(DomRange {
        start: start.into(),
        end: end.into(),
    })
}

/// Derives the CFI of `range` within `doc`.
///
/// A collapsed range produces a point; otherwise a range with the
/// longest common parent is produced.
pub fn from_range<D, F>(doc: &D, range: &DomRange<D::Node>, filter: &F) -> Cfi
where
    D: Document + ?Sized,
    F: NodeFilter<D::Node> + ?Sized,
{
    let start = IndirectPath(vec![derive_boundary(doc, &range.start, filter)]);

    if range.is_collapsed() {
        return Cfi::Point(start);
    }
    let end = IndirectPath(vec![derive_boundary(doc, &range.end, filter)]);
    Cfi::Range(build_range(&start, &end))
}

/// Derives the CFIs of sibling `elements`, given in document order,
/// with a single pass over their parent.
///
/// Elements not found among the parent's children, and any following them,
/// are skipped.
pub fn from_elements<D>(doc: &D, elements: &[D::Node]) -> Vec<Cfi>
where
    D: Document + ?Sized,
{
    let Some(parent) = elements.first().and_then(|first| doc.parent(first)) else {
        return Vec::new();
    };
    let base = derive_path(doc, &parent, None, &AcceptAll);
    let mut cfis = Vec::with_capacity(elements.len());

    for (index, slot) in index_children(doc, &parent, &AcceptAll).into_iter().enumerate() {
        let Some(element) = elements.get(cfis.len()) else {
            break;
        };
        if let Slot::Element(node) = slot {
            if &node == element {
                let mut path = base.clone();
                path.push(node_part(doc, &node, index, None));
                cfis.push(Cfi::Point(IndirectPath(vec![path])));
            }
        }
    }
    cfis
}

/// Resolves the node addressed by the start of `cfi`.
///
/// Text positions resolve to the text node itself.
pub fn to_element<D>(doc: &D, cfi: &Cfi) -> Option<D::Node>
where
    D: Document + ?Sized,
{
    resolve(doc, cfi.collapse(false).first()?, &AcceptAll).map(Position::into_node)
}
