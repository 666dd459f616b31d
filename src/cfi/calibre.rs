//! Conversion of Calibre bookmark and highlight positions into standard CFIs.
//!
//! Calibre records positions relative to the book rather than to the
//! package document:
//! - A bookmark `pos` starts with the step of the spine item, followed by a
//!   step for the content document's root element, then the path within it.
//! - A highlight carries the spine index separately, and its endpoints start
//!   with a step for the content document's root element.

use crate::cfi::fake;
use crate::cfi::part::{Cfi, CfiRange, IndirectPath, Part, Path};
use crate::cfi::{parse, range};

/// Converts a Calibre bookmark position into a CFI.
///
/// # Examples
/// ```
/// use epubcfi::cfi::calibre;
///
/// let cfi = calibre::from_pos("epubcfi(/8/2/4/2/1:12)");
/// assert_eq!("epubcfi(/6/8!/4/2/1:12)", cfi.to_string());
/// ```
pub fn from_pos(pos: &str) -> Cfi {
    let path = parse(pos).collapse(false);
    let mut parts = path.into_inner().into_iter().next().unwrap_or_default().into_iter();

    let mut outer = Path(vec![Part::new(fake::SPINE_INDEX)]);
    outer.extend(parts.next());
    // The content document's root element
    parts.next();

    Cfi::Point(IndirectPath(vec![outer, parts.collect()]))
}

/// Converts a Calibre highlight into a range CFI within the spine item at `spine_index`.
///
/// # Examples
/// ```
/// use epubcfi::cfi::{calibre, Cfi};
///
/// let range = calibre::from_highlight(1, "/2/4/2/1:3", "/2/4/6/1:8");
/// assert_eq!("epubcfi(/6/4!/4,/2/1:3,/6/1:8)", Cfi::from(range).to_string());
/// ```
pub fn from_highlight(spine_index: usize, start: &str, end: &str) -> CfiRange {
    let endpoint = |cfi: &str| {
        let mut paths = fake::from_index(spine_index);
        paths.push(strip_root(cfi));
        paths
    };
    range::build_range(&endpoint(start), &endpoint(end))
}

fn strip_root(cfi: &str) -> Path {
    let mut path = parse(cfi)
        .collapse(false)
        .into_inner()
        .into_iter()
        .next()
        .unwrap_or_default();

    if !path.is_empty() {
        path.remove(0);
    }
    path
}
