//! Reading-order comparison of CFIs.

use crate::cfi::part::{Cfi, IndirectPath};
use crate::cfi::parse;
use std::cmp::Ordering;

/// Compares two CFIs by their position in reading order.
///
/// Ranges are compared by their start, then by their end.
/// A location that is a prefix of another orders first.
/// Character offsets are only compared on the final part of each path,
/// and only when both sides carry one.
///
/// # Examples
/// ```
/// use epubcfi::cfi;
///
/// let mut cfis: Vec<_> = [
///     "epubcfi(/6/8!/4/2/1:50)",
///     "epubcfi(/6/4!/4/2/1:10)",
///     "epubcfi(/6/4!/4/2/1:5)",
/// ]
/// .into_iter()
/// .map(cfi::parse)
/// .collect();
///
/// cfis.sort_by(cfi::compare);
/// assert_eq!("epubcfi(/6/4!/4/2/1:5)", cfis[0].to_string());
/// assert_eq!("epubcfi(/6/8!/4/2/1:50)", cfis[2].to_string());
/// ```
pub fn compare(a: &Cfi, b: &Cfi) -> Ordering {
    if a.is_range() || b.is_range() {
        return compare_paths(&a.collapse(false), &b.collapse(false))
            .then_with(|| compare_paths(&a.collapse(true), &b.collapse(true)));
    }
    match (a, b) {
        (Cfi::Point(a), Cfi::Point(b)) => compare_paths(a, b),
        _ => Ordering::Equal,
    }
}

/// Compares two CFI strings; see [`compare`].
pub fn compare_str(a: &str, b: &str) -> Ordering {
    compare(&parse(a), &parse(b))
}

fn compare_paths(a: &IndirectPath, b: &IndirectPath) -> Ordering {
    for i in 0..a.len().max(b.len()) {
        let p = a.get(i).map(|path| path.as_slice()).unwrap_or_default();
        let q = b.get(i).map(|path| path.as_slice()).unwrap_or_default();
        let Some(last) = p.len().max(q.len()).checked_sub(1) else {
            continue;
        };

        for j in 0..=last {
            let (x, y) = match (p.get(j), q.get(j)) {
                (None, _) => return Ordering::Less,
                (_, None) => return Ordering::Greater,
                (Some(x), Some(y)) => (x, y),
            };
            // Unreadable indices are left unordered
            if let (Some(i), Some(k)) = (x.index, y.index) {
                match i.cmp(&k) {
                    Ordering::Equal => {}
                    ordering => return ordering,
                }
            }
            if j == last {
                if let (Some(i), Some(k)) = (x.offset, y.offset) {
                    match i.cmp(&k) {
                        Ordering::Equal => {}
                        ordering => return ordering,
                    }
                }
            }
        }
    }
    Ordering::Equal
}
