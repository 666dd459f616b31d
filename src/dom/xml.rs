//! A [`Document`] implementation backed by [`quick_xml`].

use crate::dom::{Document, NodeKind};
use crate::errors::{DocumentError, DocumentResult};
use quick_xml::Reader;
use quick_xml::events::{BytesRef, BytesStart, Event};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::trace;

/// Handle to a node within an [`XmlDocument`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The topmost node, holding the document element.
    pub const DOCUMENT: NodeId = NodeId(0);
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    name: Option<String>,
    id: Option<String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            name: None,
            id: None,
            text: String::new(),
            parent,
            children: Vec::new(),
        }
    }
}

/// An immutable XML/XHTML content document tree.
///
/// Nodes are stored in document order.
///
/// # Examples
/// ```
/// # use epubcfi::errors::DocumentResult;
/// use epubcfi::dom::Document;
/// use epubcfi::dom::xml::XmlDocument;
///
/// # fn main() -> DocumentResult<()> {
/// let doc = XmlDocument::parse(r#"<html><body id="b">caf&#233;</body></html>"#)?;
/// let body = doc.element_by_id("b").unwrap();
///
/// assert_eq!(Some("body"), doc.name(body));
/// assert_eq!("café", doc.text_content(body));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct XmlDocument {
    nodes: Vec<NodeData>,
    ids: HashMap<String, NodeId>,
    root: NodeId,
}

impl XmlDocument {
    /// Parses `xml` with [`XmlSettings::default`].
    pub fn parse(xml: &str) -> DocumentResult<Self> {
        Self::parse_with(xml, XmlSettings::default())
    }

    /// Parses `xml` with the given [`XmlSettings`].
    ///
    /// # Examples
    /// ```
    /// # use epubcfi::errors::DocumentResult;
    /// use epubcfi::dom::xml::{XmlDocument, XmlSettings};
    ///
    /// # fn main() -> DocumentResult<()> {
    /// // Unclosed elements are refused by default
    /// assert!(XmlDocument::parse("<html><body><p>text").is_err());
    ///
    /// let doc = XmlDocument::parse_with(
    ///     "<html><body><p>text",
    ///     XmlSettings::builder().strict(false),
    /// )?;
    /// assert_eq!(1, doc.elements("p").count());
    /// # Ok(())
    /// # }
    /// ```
    pub fn parse_with(xml: &str, settings: impl Into<XmlSettings>) -> DocumentResult<Self> {
        TreeBuilder::new(settings.into()).build(xml)
    }

    /// The qualified name of `node` if it is an element.
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0)?.name.as_deref()
    }

    /// The text of a text, CDATA, or comment node.
    ///
    /// Returns an empty string for elements.
    pub fn text(&self, node: NodeId) -> &str {
        self.nodes.get(node.0).map_or("", |data| &data.text)
    }

    /// The concatenated text and CDATA content of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut content = String::new();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            let Some(data) = self.nodes.get(current.0) else {
                continue;
            };
            if data.kind.is_text() {
                content.push_str(&data.text);
            }
            stack.extend(data.children.iter().rev());
        }
        content
    }

    /// All elements named `name`, in document order.
    pub fn elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, data)| data.name.as_deref() == Some(name))
            .map(|(i, _)| NodeId(i))
    }

    fn data(&self, node: &NodeId) -> Option<&NodeData> {
        self.nodes.get(node.0)
    }
}

impl Document for XmlDocument {
    type Node = NodeId;

    fn document_element(&self) -> Option<NodeId> {
        Some(self.root)
    }

    fn kind(&self, node: &NodeId) -> NodeKind {
        self.data(node).map_or(NodeKind::Other, |data| data.kind)
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.data(node)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.data(node)?.parent
    }

    /// Counted in UTF-16 code units, matching DOM range offsets.
    fn text_len(&self, node: &NodeId) -> usize {
        self.data(node)
            .map_or(0, |data| data.text.encode_utf16().count())
    }

    fn id(&self, node: &NodeId) -> Option<String> {
        self.data(node)?.id.clone()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    fn first_child(&self, node: &NodeId) -> Option<NodeId> {
        self.data(node)?.children.first().copied()
    }

    fn last_child(&self, node: &NodeId) -> Option<NodeId> {
        self.data(node)?.children.last().copied()
    }
}

/// Settings upon parsing an [`XmlDocument`].
///
/// To create a mutable settings instance, see
/// [`XmlSettings::builder`] or [`XmlSettings::default`].
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct XmlSettings {
    /// When set to `true`, ensures a document conforms to the following:
    /// - End tags match their start tags.
    /// - Every element is closed by the end of the document.
    ///
    /// When set to `false`, mismatched end tags are accepted and
    /// elements left open at the end of the document are closed implicitly.
    ///
    /// Default: `true`
    pub strict: bool,
}

impl XmlSettings {
    /// Returns a builder to create an [`XmlSettings`] instance.
    pub fn builder() -> XmlSettingsBuilder {
        XmlSettingsBuilder(Self::default())
    }
}

impl Default for XmlSettings {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl From<XmlSettingsBuilder> for XmlSettings {
    fn from(value: XmlSettingsBuilder) -> Self {
        value.build()
    }
}

/// Builder to construct an [`XmlSettings`] instance.
///
/// # Examples
/// - Passing a builder to parse an [`XmlDocument`] with:
/// ```
/// # use epubcfi::errors::DocumentResult;
/// use epubcfi::dom::xml::{XmlDocument, XmlSettings};
///
/// # fn main() -> DocumentResult<()> {
/// let doc = XmlDocument::parse_with("<p>a<b>b</p>", XmlSettings::builder().strict(false))?;
/// assert_eq!("ab", doc.text_content(doc.elements("p").next().unwrap()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct XmlSettingsBuilder(XmlSettings);

impl XmlSettingsBuilder {
    /// Turn this builder into an [`XmlSettings`] instance.
    pub fn build(self) -> XmlSettings {
        self.0
    }

    /// See [`XmlSettings::strict`].
    pub fn strict(mut self, strict: bool) -> Self {
        self.0.strict = strict;
        self
    }
}

/// Assembles an [`XmlDocument`] from [`quick_xml`] events.
struct TreeBuilder {
    settings: XmlSettings,
    nodes: Vec<NodeData>,
    ids: HashMap<String, NodeId>,
    /// Currently open elements, starting with [`NodeId::DOCUMENT`].
    open: Vec<NodeId>,
    /// The text node that adjacent text and entity references append to.
    text: Option<NodeId>,
}

impl TreeBuilder {
    fn new(settings: XmlSettings) -> Self {
        Self {
            settings,
            nodes: vec![NodeData::new(NodeKind::Other, None)],
            ids: HashMap::new(),
            open: vec![NodeId::DOCUMENT],
            text: None,
        }
    }

    fn build(mut self, xml: &str) -> DocumentResult<XmlDocument> {
        let mut reader = Reader::from_str(xml);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = self.settings.strict;
        config.allow_unmatched_ends = !self.settings.strict;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let element = self.element(&start);
                    self.open.push(element);
                }
                Event::Empty(start) => {
                    self.element(&start);
                }
                Event::End(_) => self.close(),
                Event::Text(text) => self.push_text(&text.decode()?),
                Event::GeneralRef(reference) => self.push_text(&resolve_reference(&reference)?),
                Event::CData(cdata) => {
                    self.append(NodeKind::CData, &cdata.decode()?);
                }
                Event::Comment(comment) => {
                    self.append(NodeKind::Other, &comment.decode()?);
                }
                Event::PI(_) => {
                    self.append(NodeKind::Other, "");
                }
                Event::Eof => break,
                _ => {}
            }
        }
        self.finish()
    }

    fn finish(self) -> DocumentResult<XmlDocument> {
        if self.settings.strict && self.open.len() > 1 {
            let unclosed = self.open[self.open.len() - 1];
            let name = self.nodes[unclosed.0].name.clone().unwrap_or_default();
            return Err(DocumentError::UnclosedElement(name));
        }
        let root = self.nodes[NodeId::DOCUMENT.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].kind == NodeKind::Element)
            .ok_or(DocumentError::NoRootElement)?;

        Ok(XmlDocument {
            nodes: self.nodes,
            ids: self.ids,
            root,
        })
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(NodeId::DOCUMENT)
    }

    fn append(&mut self, kind: NodeKind, text: &str) -> NodeId {
        let parent = self.current();
        let node = NodeId(self.nodes.len());
        let mut data = NodeData::new(kind, Some(parent));
        data.text.push_str(text);

        self.nodes.push(data);
        self.nodes[parent.0].children.push(node);
        self.text = None;
        node
    }

    fn element(&mut self, start: &BytesStart) -> NodeId {
        let node = self.append(NodeKind::Element, "");
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

        let id = start
            .attributes()
            .with_checks(false)
            .flatten()
            .filter(|attribute| matches!(attribute.key.as_ref(), b"id" | b"xml:id"))
            .map(|attribute| attribute_value(&attribute.value))
            .find(|id| !id.is_empty());

        if let Some(id) = &id {
            // The first occurrence of an id wins, as with `getElementById`
            self.ids.entry(id.clone()).or_insert(node);
        }
        let data = &mut self.nodes[node.0];
        data.name = Some(name);
        data.id = id;
        node
    }

    fn close(&mut self) {
        if self.open.len() > 1 {
            self.open.pop();
        } else {
            trace!("ignoring unmatched end tag");
        }
        self.text = None;
    }

    fn push_text(&mut self, text: &str) {
        // Text outside the document element is insignificant whitespace
        if self.open.len() <= 1 || text.is_empty() {
            return;
        }
        match self.text {
            Some(node) => self.nodes[node.0].text.push_str(text),
            None => {
                let node = self.append(NodeKind::Text, text);
                self.text = Some(node);
            }
        }
    }
}

/// Resolves a character or predefined entity reference.
///
/// Unknown entities are kept verbatim as `&name;`.
fn resolve_reference(reference: &BytesRef) -> DocumentResult<Cow<'static, str>> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(Cow::Owned(ch.to_string()));
    }
    let name = reference.decode()?;

    Ok(match quick_xml::escape::resolve_predefined_entity(&name) {
        Some(value) => Cow::Borrowed(value),
        None => {
            trace!(entity = %name, "keeping unknown entity reference");
            Cow::Owned(format!("&{name};"))
        }
    })
}

fn attribute_value(value: &[u8]) -> String {
    let value = String::from_utf8_lossy(value);

    quick_xml::escape::unescape(&value).map_or_else(|_| value.to_string(), Cow::into_owned)
}
