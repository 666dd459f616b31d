//! Structured CFI model: [`Part`], [`Path`], [`IndirectPath`], [`CfiRange`] and [`Cfi`].

use std::ops::{Deref, DerefMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Disambiguates a position that sits on the boundary between two pieces of content.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    /// The location binds to the content preceding it.
    Before,
    /// The location binds to the content following it.
    After,
}

impl Side {
    /// Reads the value of an `s=` parameter, returning [`None`] for anything
    /// other than `before` or `after` (or their abbreviations `b` and `a`).
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "before" | "b" => Some(Self::Before),
            "after" | "a" => Some(Self::After),
            _ => None,
        }
    }

    /// The parameter value as written within a CFI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

/// A bracketed assertion attached to a [`Part`].
///
/// A part carries either an id assertion or a list of text assertions, never both.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Assertion {
    /// Element id, usable as a shortcut when resolving.
    Id(String),
    /// Text content surrounding the location. Diagnostic only.
    Text(Vec<String>),
}

/// A spatial `@x:y` coordinate pair.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Spatial {
    pub x: f64,
    pub y: f64,
}

/// A single `/index[...]` step of a [`Path`].
///
/// # Fields
/// - `index`: The virtual child index (see [`dom::index_children`](crate::dom::index_children)).
///   [`None`] when the step's digits could not be read, which never matches a node.
/// - `offset`: Character offset; only rendered when `index` is odd.
/// - `temporal`, `spatial`: Timing and coordinate assertions for media.
/// - `assertion`: An id or text assertion.
/// - `side`: Boundary bias.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Part {
    pub index: Option<usize>,
    pub offset: Option<usize>,
    pub temporal: Option<f64>,
    pub spatial: Option<Spatial>,
    pub assertion: Option<Assertion>,
    pub side: Option<Side>,
}

impl Part {
    /// Creates a part referencing the given virtual child `index`.
    pub fn new(index: usize) -> Self {
        Self {
            index: Some(index),
            ..Self::default()
        }
    }

    /// Sets the character offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets an id assertion, replacing any text assertion.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.assertion = Some(Assertion::Id(id.into()));
        self
    }

    /// Sets text assertions, replacing any id assertion.
    pub fn with_text<I, S>(mut self, text: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assertion = Some(Assertion::Text(text.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_temporal(mut self, seconds: f64) -> Self {
        self.temporal = Some(seconds);
        self
    }

    pub fn with_spatial(mut self, x: f64, y: f64) -> Self {
        self.spatial = Some(Spatial { x, y });
        self
    }

    /// The id assertion, if present.
    pub fn id(&self) -> Option<&str> {
        match &self.assertion {
            Some(Assertion::Id(id)) => Some(id),
            _ => None,
        }
    }

    /// The text assertions, if present.
    pub fn text(&self) -> Option<&[String]> {
        match &self.assertion {
            Some(Assertion::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Returns `true` if the index addresses a position between elements
    /// (odd index) rather than an element (even index).
    pub fn is_text_position(&self) -> bool {
        self.index.is_some_and(|index| index % 2 == 1)
    }

    pub(crate) fn push_text(&mut self, value: String) {
        match &mut self.assertion {
            Some(Assertion::Text(text)) => text.push(value),
            // An id takes precedence over text
            Some(Assertion::Id(_)) => {}
            None => self.assertion = Some(Assertion::Text(vec![value])),
        }
    }
}

macro_rules! vec_newtype {
    ($name:ident, $item:ty) => {
        impl $name {
            /// Creates an empty instance.
            pub fn new() -> Self {
                Self(Vec::new())
            }

            /// Consumes `self`, returning the underlying items.
            pub fn into_inner(self) -> Vec<$item> {
                self.0
            }
        }

        impl Deref for $name {
            type Target = Vec<$item>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<Vec<$item>> for $name {
            fn from(items: Vec<$item>) -> Self {
                Self(items)
            }
        }

        impl FromIterator<$item> for $name {
            fn from_iter<T: IntoIterator<Item = $item>>(iter: T) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl IntoIterator for $name {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<$item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }
    };
}

/// An ordered, root-to-leaf sequence of [`Part`] within a single document.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Path(pub Vec<Part>);

vec_newtype!(Path, Part);

/// A sequence of [`Path`] separated by indirection (`!`) steps,
/// each path addressing a document nested within the previous one.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct IndirectPath(pub Vec<Path>);

vec_newtype!(IndirectPath, Path);

impl IndirectPath {
    /// The innermost path, which addresses the most deeply nested document.
    pub fn local(&self) -> Option<&Path> {
        self.0.last()
    }
}

/// A range expressed as a shared `parent` prefix with diverging `start` and `end` suffixes.
///
/// `start` and `end` are scoped to the innermost document of `parent`;
/// a range never crosses an indirection.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CfiRange {
    pub parent: IndirectPath,
    pub start: IndirectPath,
    pub end: IndirectPath,
}

/// A parsed CFI: either a single location or a range.
///
/// # Examples
/// ```
/// use epubcfi::cfi::{self, Cfi};
///
/// let cfi = cfi::parse("epubcfi(/6/4[chap01ref]!/4[body01]/10[para05]/3:10)");
/// let Cfi::Point(path) = &cfi else { unreachable!() };
///
/// assert_eq!(2, path.len());
/// assert_eq!(Some(10), path[1].last().unwrap().offset);
/// assert_eq!("epubcfi(/6/4[chap01ref]!/4[body01]/10[para05]/3:10)", cfi.to_string());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Cfi {
    /// A single location.
    Point(IndirectPath),
    /// A range between two locations.
    Range(CfiRange),
}

impl Cfi {
    /// Returns `true` if this is a [`Cfi::Range`].
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range(_))
    }

    /// Reduces `self` into a single location.
    ///
    /// For a range, this is the start (or end when `to_end` is `true`)
    /// as a full path. A point is returned as is.
    pub fn collapse(&self, to_end: bool) -> IndirectPath {
        match self {
            Self::Point(path) => path.clone(),
            Self::Range(range) => super::range::collapse_range(range, to_end),
        }
    }

    /// Removes and returns the outermost path.
    ///
    /// For a range, this is taken from [`CfiRange::parent`].
    /// After the call, `self` is relative to the document that the removed
    /// path referenced, which is the form expected by
    /// [`dom::to_range`](crate::dom::to_range).
    ///
    /// # Examples
    /// ```
    /// use epubcfi::cfi::{self, fake};
    ///
    /// let mut cfi = cfi::parse("epubcfi(/6/8!/4/2/1:3)");
    /// let outer = cfi.shift_outer().unwrap();
    ///
    /// assert_eq!(Some(3), fake::to_index(&outer));
    /// assert_eq!("epubcfi(/4/2/1:3)", cfi.to_string());
    /// ```
    pub fn shift_outer(&mut self) -> Option<Path> {
        let paths = match self {
            Self::Point(path) => path,
            Self::Range(range) => &mut range.parent,
        };
        (!paths.is_empty()).then(|| paths.remove(0))
    }
}

impl From<IndirectPath> for Cfi {
    fn from(path: IndirectPath) -> Self {
        Self::Point(path)
    }
}

impl From<CfiRange> for Cfi {
    fn from(range: CfiRange) -> Self {
        Self::Range(range)
    }
}
