//! Construction of [`CfiRange`] values from two endpoints, and the inverse collapse.
//!
//! Ranges never cross documents: only the innermost [`Path`] of each endpoint
//! is compared, and outer paths are taken from the starting endpoint.

use crate::cfi::part::{Cfi, CfiRange, IndirectPath, Part, Path};

/// Builds a range between `from` and `to`.
///
/// Leading parts that share an index (and carry no offset on either side)
/// form the shared parent; everything from the first divergence on forms
/// the start and end suffixes.
///
/// Both endpoints must share the same outer paths; only those of `from` are kept.
///
/// # Examples
/// ```
/// use epubcfi::cfi::{self, Cfi};
///
/// let Cfi::Point(from) = cfi::parse("/6/4!/4/10/2/1:1") else { unreachable!() };
/// let Cfi::Point(to) = cfi::parse("/6/4!/4/10/3:4") else { unreachable!() };
///
/// let range = cfi::build_range(&from, &to);
/// assert_eq!("epubcfi(/6/4!/4/10,/2/1:1,/3:4)", Cfi::from(range).to_string());
/// ```
pub fn build_range(from: &IndirectPath, to: &IndirectPath) -> CfiRange {
    let empty = Path::new();
    let local_from = from.local().unwrap_or(&empty);
    let local_to = to.local().unwrap_or(&empty);

    let mut parent = Path::new();
    let mut start = Path::new();
    let mut end = Path::new();
    let mut shared = true;

    for i in 0..local_from.len().max(local_to.len()) {
        let a = local_from.get(i);
        let b = local_to.get(i);

        shared = shared && a.zip(b).is_some_and(|(a, b)| is_shared(a, b));
        if shared {
            parent.extend(a.cloned());
        } else {
            start.extend(a.cloned());
            end.extend(b.cloned());
        }
    }

    let mut outer: Vec<Path> = from.iter().take(from.len().saturating_sub(1)).cloned().collect();
    outer.push(parent);

    CfiRange {
        parent: IndirectPath(outer),
        start: IndirectPath(vec![start]),
        end: IndirectPath(vec![end]),
    }
}

fn is_shared(a: &Part, b: &Part) -> bool {
    a.index == b.index && a.offset.is_none() && b.offset.is_none()
}

/// Builds a range spanning from the start of `from` to the end of `to`.
///
/// Either argument may itself be a range, in which case it is collapsed first.
pub fn range_between(from: &Cfi, to: &Cfi) -> CfiRange {
    build_range(&from.collapse(false), &to.collapse(true))
}

/// Reassembles the full start (or end, when `to_end` is `true`) location of `range`.
///
/// This is the inverse of [`build_range`].
pub fn collapse_range(range: &CfiRange, to_end: bool) -> IndirectPath {
    let suffix = if to_end { &range.end } else { &range.start };
    let mut paths = range.parent.0.clone();
    let mut rest = suffix.iter();

    match (paths.last_mut(), rest.next()) {
        (Some(last), Some(first)) => last.extend(first.iter().cloned()),
        (None, Some(first)) => paths.push(first.clone()),
        _ => {}
    }
    paths.extend(rest.cloned());

    IndirectPath(paths)
}
