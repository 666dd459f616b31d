//! EPUB Canonical Fragment Identifiers.
//!
//! # Overview
//! A CFI is a compact pointer into a document tree:
//! ```text
//! epubcfi(/6/4[chap01ref]!/4/10/3:10)
//!          │ ││          │ │ │  │ └── character offset
//!          │ ││          │ │ │  └── odd index: text position
//!          │ ││          │ │ └── even index: element
//!          │ ││          │ └── element (body)
//!          │ ││          └── indirection into the content document
//!          │ │└── id assertion
//!          │ └── spine item
//!          └── spine
//! ```
//!
//! ## Components
//! - [`token`]: Lexical stage.
//! - [`parse`]: Structured model ([`Cfi`], [`IndirectPath`], [`Path`], [`Part`]).
//! - [`Display`](std::fmt::Display) impls: Canonical escaped string form.
//! - [`build_range`] / [`collapse_range`]: Range construction and its inverse.
//! - [`compare`]: Reading-order comparison.
//! - [`fake`], [`calibre`]: CFIs derived without a package document.
//!
//! Mapping to and from positions within a document tree is found within [`dom`](crate::dom).
//!
//! See <https://idpf.org/epub/linking/cfi/epub-cfi.html> for the grammar.

pub mod calibre;
mod compare;
mod display;
pub mod fake;
mod parser;
mod part;
mod range;
pub mod token;

pub use compare::{compare, compare_str};
pub use display::escape;
pub use parser::{parse, parse_tokens};
pub use part::{Assertion, Cfi, CfiRange, IndirectPath, Part, Path, Side, Spatial};
pub use range::{build_range, collapse_range, range_between};

pub(crate) const ENVELOPE_START: &str = "epubcfi(";
pub(crate) const ENVELOPE_END: &str = ")";

/// Returns `true` if `value` is enclosed within `epubcfi(...)`.
pub fn is_cfi(value: &str) -> bool {
    value.len() >= ENVELOPE_START.len() + ENVELOPE_END.len()
        && value.starts_with(ENVELOPE_START)
        && value.ends_with(ENVELOPE_END)
}

/// Encloses `value` within `epubcfi(...)` unless already enclosed.
///
/// # Examples
/// ```
/// use epubcfi::cfi::wrap;
///
/// assert_eq!("epubcfi(/6/4)", wrap("/6/4"));
/// assert_eq!("epubcfi(/6/4)", wrap("epubcfi(/6/4)"));
/// ```
pub fn wrap(value: &str) -> String {
    if is_cfi(value) {
        value.to_owned()
    } else {
        format!("{ENVELOPE_START}{value}{ENVELOPE_END}")
    }
}

/// Returns the body within `epubcfi(...)`, or `value` itself if not enclosed.
///
/// # Examples
/// ```
/// use epubcfi::cfi::unwrap;
///
/// assert_eq!("/6/4", unwrap("epubcfi(/6/4)"));
/// assert_eq!("/6/4", unwrap("/6/4"));
/// ```
pub fn unwrap(value: &str) -> &str {
    if is_cfi(value) {
        &value[ENVELOPE_START.len()..value.len() - ENVELOPE_END.len()]
    } else {
        value
    }
}

/// Joins CFIs, wrapped or not, with indirection steps into a single wrapped CFI.
///
/// # Examples
/// ```
/// use epubcfi::cfi::join_indirection;
///
/// assert_eq!(
///     "epubcfi(/6/4[chap]!/4/2/1:3)",
///     join_indirection(&["epubcfi(/6/4[chap])", "/4/2/1:3"]),
/// );
/// ```
pub fn join_indirection(cfis: &[&str]) -> String {
    let body: Vec<&str> = cfis.iter().map(|cfi| unwrap(cfi)).collect();
    wrap(&body.join("!"))
}
