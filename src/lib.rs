//! # epubcfi
//!
//! A library for EPUB Canonical Fragment Identifiers (CFIs):
//! parsing, serialization, range construction, reading-order comparison,
//! and mapping to and from positions within a content document tree.
//!
//! ## Modules
//! - [`cfi`]: The CFI model, along with parsing and serialization.
//! - [`dom`]: Resolution of CFIs against a host [`Document`](dom::Document),
//!   and derivation of CFIs from host ranges and elements.
//! - [`errors`]: Errors when parsing an [`XmlDocument`](dom::xml::XmlDocument).
//!
//! ## Examples
//! Parsing and serializing:
//! ```
//! use epubcfi::cfi::{self, Cfi};
//!
//! let cfi = cfi::parse("epubcfi(/6/4[chap01ref]!/4[body01]/10[para05]/3:10)");
//! let Cfi::Point(paths) = &cfi else { unreachable!() };
//!
//! // Package document path, then the content document path
//! assert_eq!(2, paths.len());
//! assert_eq!(Some("chap01ref"), paths[0][1].id());
//! assert_eq!(Some(10), paths[1][2].offset);
//!
//! assert_eq!("epubcfi(/6/4[chap01ref]!/4[body01]/10[para05]/3:10)", cfi.to_string());
//! ```
//! Mapping into a content document:
//! ```
//! # use epubcfi::errors::DocumentResult;
//! use epubcfi::cfi;
//! use epubcfi::dom::{self, AcceptAll, Boundary, xml::XmlDocument};
//!
//! # fn main() -> DocumentResult<()> {
//! let doc = XmlDocument::parse(
//!     r#"<html><head/><body id="body01"><p>Call me Ishmael.</p></body></html>"#,
//! )?;
//!
//! // Strip the package document path
//! let mut cfi = cfi::parse("epubcfi(/6/4[chap01ref]!/4[body01]/2,/1:0,/1:4)");
//! cfi.shift_outer();
//!
//! let range = dom::to_range(&doc, &cfi, &AcceptAll).unwrap();
//! let (Boundary::At { offset: start, .. }, Boundary::At { offset: end, .. }) =
//!     (&range.start, &range.end)
//! else {
//!     unreachable!()
//! };
//! assert_eq!((0, 4), (*start, *end));
//!
//! // And back
//! assert_eq!(cfi, dom::from_range(&doc, &range, &AcceptAll));
//! # Ok(())
//! # }
//! ```

pub mod cfi;
pub mod dom;
pub mod errors;
