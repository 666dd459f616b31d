//! Error-related types for an [`XmlDocument`](crate::dom::xml::XmlDocument).
//!
//! Operations on CFIs themselves never fail; unresolvable locations are
//! represented as [`None`].

use quick_xml::encoding::EncodingError;

/// Alias for `Result<T, DocumentError>`.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Possible errors when parsing an [`XmlDocument`](crate::dom::xml::XmlDocument).
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    /// Document content unexpectedly causes an internal parser error.
    ///
    /// This may originate from malformed content, such as improper XML.
    #[error(transparent)]
    Unparsable(#[from] quick_xml::Error),

    /// Text content could not be decoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The document contains no element.
    #[error("Document has no root element")]
    NoRootElement,

    /// An element was left open at the end of the document.
    ///
    /// Only reported when [`XmlSettings::strict`](crate::dom::xml::XmlSettings::strict)
    /// is enabled.
    #[error("Element `{0}` is never closed")]
    UnclosedElement(String),
}
