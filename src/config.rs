//! Immutable bar configuration.
//!
//! A [`BarConfig`] is validated exactly once, when it is built. The render path then
//! reads it without re-checking anything, and the controller shares it with the
//! render thread behind an [`Arc`](std::sync::Arc).

use compact_str::CompactString;

use crate::error::{ProgressError, Result};

/// How values outside `[min, max]` are drawn.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Overflow {
    /// Draw the raw proportion. Values below `min` produce an empty segment, values
    /// above `max` produce a segment wider than the bar.
    #[default]
    PassThrough,
    /// Clamp every normalized value into `[0, 1]` before scaling.
    Clamp,
}

/// Left and right bracket strings surrounding the bar.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Brackets {
    left: CompactString,
    right: CompactString,
}

impl Brackets {
    /// Creates brackets from an explicit pair.
    #[must_use]
    pub fn new(left: impl Into<CompactString>, right: impl Into<CompactString>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Splits a combined string: the left half gets the first `len / 2` chars and the
    /// right half gets the rest.
    ///
    /// ```
    /// use segment_progress::Brackets;
    ///
    /// let b = Brackets::split("<|>");
    /// assert_eq!(b.left(), "<");
    /// assert_eq!(b.right(), "|>");
    /// ```
    #[must_use]
    pub fn split(combined: &str) -> Self {
        let half = combined.chars().count() / 2;
        let at = combined
            .char_indices()
            .nth(half)
            .map_or(combined.len(), |(i, _)| i);
        let (left, right) = combined.split_at(at);
        Self::new(left, right)
    }

    /// The left bracket.
    #[must_use]
    pub fn left(&self) -> &str {
        &self.left
    }

    /// The right bracket.
    #[must_use]
    pub fn right(&self) -> &str {
        &self.right
    }

    /// Combined display length of both brackets, in chars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.chars().count() + self.right.chars().count()
    }

    /// Returns `true` when both brackets are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

impl From<&str> for Brackets {
    fn from(combined: &str) -> Self {
        Self::split(combined)
    }
}

impl<L, R> From<(L, R)> for Brackets
where
    L: Into<CompactString>,
    R: Into<CompactString>,
{
    fn from((left, right): (L, R)) -> Self {
        Self::new(left, right)
    }
}

/// Validated, immutable configuration for a single progress bar.
#[derive(Clone, Debug, PartialEq)]
pub struct BarConfig {
    min: f64,
    max: f64,
    width: usize,
    brackets: Brackets,
    mapping: Vec<CompactString>,
    // Cached so the bracket length isn't recounted on every draw.
    brackets_len: usize,
    overflow: Overflow,
}

impl BarConfig {
    /// Validates and builds a configuration.
    ///
    /// # Errors
    ///
    /// * [`ProgressError::InvalidRange`] unless `max - min > 0`.
    /// * [`ProgressError::InvalidWidth`] if `width` cannot hold both brackets.
    /// * [`ProgressError::InvalidMapping`] if `mapping` has fewer than two glyphs.
    ///
    /// ```
    /// use segment_progress::{BarConfig, ProgressError};
    ///
    /// assert!(BarConfig::new(0.0, 100.0, 12, "[]", ["#", " "]).is_ok());
    /// assert!(matches!(
    ///     BarConfig::new(0.0, 100.0, 1, "[]", ["#", " "]),
    ///     Err(ProgressError::InvalidWidth { .. })
    /// ));
    /// ```
    pub fn new<B, M, G>(min: f64, max: f64, width: usize, brackets: B, mapping: M) -> Result<Self>
    where
        B: Into<Brackets>,
        M: IntoIterator<Item = G>,
        G: Into<CompactString>,
    {
        let range = max - min;
        if range.is_nan() || range <= 0.0 {
            return Err(ProgressError::InvalidRange { min, max });
        }

        let brackets = brackets.into();
        let brackets_len = brackets.len();
        if width < brackets_len {
            return Err(ProgressError::InvalidWidth {
                width,
                brackets: brackets_len,
            });
        }

        let mapping: Vec<CompactString> = mapping.into_iter().map(Into::into).collect();
        if mapping.len() < 2 {
            return Err(ProgressError::InvalidMapping { got: mapping.len() });
        }

        Ok(Self {
            min,
            max,
            width,
            brackets,
            mapping,
            brackets_len,
            overflow: Overflow::default(),
        })
    }

    /// Replaces the overflow policy.
    #[must_use]
    pub const fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Lower bound of the value range.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound of the value range.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// `max - min`, always positive.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Preferred total width in chars, brackets included.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// The bracket pair.
    #[must_use]
    pub const fn brackets(&self) -> &Brackets {
        &self.brackets
    }

    /// Combined bracket length in chars.
    #[must_use]
    pub const fn brackets_len(&self) -> usize {
        self.brackets_len
    }

    /// Fill glyphs. The last entry is the empty filler.
    #[must_use]
    pub fn mapping(&self) -> &[CompactString] {
        &self.mapping
    }

    /// The glyph used for the unfilled remainder.
    #[must_use]
    pub fn filler(&self) -> &str {
        // Non-empty: construction requires at least two glyphs.
        self.mapping.last().map_or("", CompactString::as_str)
    }

    /// Number of values each sample must provide (`mapping.len() - 1`).
    #[must_use]
    pub fn segments(&self) -> usize {
        self.mapping.len() - 1
    }

    /// Overflow policy for out-of-range values.
    #[must_use]
    pub const fn overflow(&self) -> Overflow {
        self.overflow
    }
}

#[cfg(test)]
mod tests {
    use super::{BarConfig, Brackets, Overflow};
    use crate::ProgressError;

    /// Range Validation
    /// `max` must be strictly above `min`; NaN never passes.
    #[test]
    fn test_invalid_range() {
        for (min, max) in [(0.0, 0.0), (10.0, 5.0), (f64::NAN, 1.0), (0.0, f64::NAN)] {
            let err = BarConfig::new(min, max, 80, "[]", ["#", " "]).unwrap_err();
            assert!(
                matches!(err, ProgressError::InvalidRange { .. }),
                "({min}, {max}) should be rejected"
            );
        }
    }

    /// Width Validation
    /// The width must at least fit the brackets; exactly fitting is allowed.
    #[test]
    fn test_invalid_width() {
        let err = BarConfig::new(0.0, 100.0, 1, "[]", ["#", " "]).unwrap_err();
        assert!(matches!(
            err,
            ProgressError::InvalidWidth {
                width: 1,
                brackets: 2
            }
        ));

        let cfg = BarConfig::new(0.0, 100.0, 2, "[]", ["#", " "]).unwrap();
        assert_eq!(cfg.width(), 2);
    }

    /// Mapping Validation
    /// A mapping needs at least one segment glyph and the filler.
    #[test]
    fn test_invalid_mapping() {
        let err = BarConfig::new(0.0, 100.0, 80, "[]", ["#"]).unwrap_err();
        assert!(matches!(err, ProgressError::InvalidMapping { got: 1 }));

        let err = BarConfig::new(0.0, 100.0, 80, "[]", Vec::<&str>::new()).unwrap_err();
        assert!(matches!(err, ProgressError::InvalidMapping { got: 0 }));
    }

    /// Bracket Splitting
    /// Odd-length strings give the extra char to the right side.
    #[test]
    fn test_bracket_split() {
        let b = Brackets::split("[]");
        assert_eq!((b.left(), b.right()), ("[", "]"));

        let b = Brackets::split("|");
        assert_eq!((b.left(), b.right()), ("", "|"));

        let b = Brackets::split("«[]»");
        assert_eq!((b.left(), b.right()), ("«[", "]»"));
        assert_eq!(b.len(), 4);

        let b: Brackets = ("<<", ">").into();
        assert_eq!(b.len(), 3);
        assert!(Brackets::split("").is_empty());
    }

    /// Accessors
    /// Derived values come straight from the validated inputs.
    #[test]
    #[allow(clippy::float_cmp)]
    fn test_accessors() {
        let cfg = BarConfig::new(-50.0, 50.0, 40, "()", ["a", "b", "."])
            .unwrap()
            .with_overflow(Overflow::Clamp);

        assert_eq!(cfg.range(), 100.0);
        assert_eq!(cfg.segments(), 2);
        assert_eq!(cfg.filler(), ".");
        assert_eq!(cfg.brackets_len(), 2);
        assert_eq!(cfg.overflow(), Overflow::Clamp);
    }
}
