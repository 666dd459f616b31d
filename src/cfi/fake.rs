//! Index-only CFIs for when no package document is available.
//!
//! In a package document the spine is conventionally the third child element
//! of `<package>` (index `6`), and the `n`th `<itemref>` within it has the
//! index `(n + 1) * 2`.

use crate::cfi::part::{IndirectPath, Part, Path};

/// Virtual child index of the `<spine>` element within `<package>`.
pub const SPINE_INDEX: usize = 6;

/// Creates the CFI of the spine item at `index`.
///
/// # Examples
/// ```
/// use epubcfi::cfi::{fake, Cfi};
///
/// assert_eq!("epubcfi(/6/2)", Cfi::from(fake::from_index(0)).to_string());
/// assert_eq!("epubcfi(/6/8)", Cfi::from(fake::from_index(3)).to_string());
/// ```
pub fn from_index(index: usize) -> IndirectPath {
    // Saturates at the largest even index
    let step = index
        .checked_add(1)
        .and_then(|n| n.checked_mul(2))
        .unwrap_or(usize::MAX - 1);

    IndirectPath(vec![Path(vec![Part::new(SPINE_INDEX), Part::new(step)])])
}

/// Recovers the spine index from the last part of `path`.
///
/// Returns [`None`] if the part does not reference an element (odd or unreadable index).
pub fn to_index(path: &Path) -> Option<usize> {
    let index = path.last()?.index?;

    if index % 2 == 0 {
        (index / 2).checked_sub(1)
    } else {
        None
    }
}
