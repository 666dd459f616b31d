//! Canonical textual form of the CFI model; the inverse of [`parse`](super::parse).

use crate::cfi::part::{Assertion, Cfi, CfiRange, IndirectPath, Part, Path, Side};
use crate::cfi::token::ESCAPE;
use crate::cfi::{ENVELOPE_END, ENVELOPE_START};
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter, Write};

/// Characters that carry meaning inside an assertion and must be escaped.
const SPECIAL: &[char] = &[ESCAPE, '[', ']', '(', ')', ',', ';', '='];

/// Escapes characters with special meaning inside a CFI assertion by prefixing them with `^`.
///
/// # Examples
/// ```
/// use epubcfi::cfi::escape;
///
/// assert_eq!("plain", escape("plain"));
/// assert_eq!("a^,b^[c^]^^", escape("a,b[c]^"));
/// ```
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(SPECIAL) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 4);

    for c in value.chars() {
        if SPECIAL.contains(&c) {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

fn write_bracket<'a>(
    f: &mut Formatter<'_>,
    values: impl IntoIterator<Item = &'a str>,
    side: Option<Side>,
) -> fmt::Result {
    f.write_char('[')?;
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        f.write_str(&escape(value))?;
    }
    if let Some(side) = side {
        write!(f, ";s={}", side.as_str())?;
    }
    f.write_char(']')
}

impl Display for Part {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_char('/')?;
        if let Some(index) = self.index {
            write!(f, "{index}")?;
        }
        if let Some(id) = self.id() {
            write_bracket(f, [id], self.side)?;
        }
        let mut separated = false;

        // Character offsets are only meaningful on text positions
        if let Some(offset) = self.offset.filter(|_| self.is_text_position()) {
            write!(f, ":{offset}")?;
            separated = true;
        }
        if let Some(temporal) = self.temporal {
            write!(f, "~{temporal}")?;
            separated = true;
        }
        if let Some(spatial) = self.spatial {
            write!(f, "@{}:{}", spatial.x, spatial.y)?;
            separated = true;
        }
        match &self.assertion {
            Some(Assertion::Text(text)) => {
                // A lone segment right after the step would read back as an id
                if text.len() == 1 && !separated {
                    f.write_str("[]")?;
                }
                write_bracket(f, text.iter().map(String::as_str), self.side)
            }
            None if self.side.is_some() => write_bracket(f, std::iter::empty(), self.side),
            _ => Ok(()),
        }
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.iter().try_for_each(|part| part.fmt(f))
    }
}

impl Display for IndirectPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, path) in self.iter().enumerate() {
            if i > 0 {
                f.write_char('!')?;
            }
            path.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for CfiRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.parent, self.start, self.end)
    }
}

/// Renders the CFI within its `epubcfi(...)` envelope.
impl Display for Cfi {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(ENVELOPE_START)?;
        match self {
            Self::Point(path) => path.fmt(f)?,
            Self::Range(range) => range.fmt(f)?,
        }
        f.write_str(ENVELOPE_END)
    }
}
