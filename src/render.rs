//! The bar-drawing algorithm.
//!
//! [`render`] is a pure function: given a sample, the configuration, and the live
//! terminal width, it returns the exact line to write, carriage return included.
//!
//! # Layout
//!
//! ```text
//! <left><seg 0 glyphs><seg 1 glyphs>...<filler glyphs><right>\r
//! ```
//!
//! Each segment is `trunc(normalized * usable)` glyphs wide, where `usable` is the
//! smaller of the configured and the terminal width minus the brackets. Truncation
//! makes the bar under-fill rather than overflow at the edges.

use crate::{
    config::{BarConfig, Overflow},
    error::{ProgressError, Result},
};

/// Renders one bar line for `sample`.
///
/// Values are paired with mapping glyphs in order; the `i`-th value fills with the
/// `i`-th glyph. Values beyond the mapping draw nothing but still shrink the filler.
///
/// # Errors
///
/// Returns [`ProgressError::SegmentCountMismatch`] if `sample` holds fewer values than
/// the mapping has segment glyphs, and [`ProgressError::LineTooLong`] if an
/// out-of-range value asks for a line that cannot be allocated.
///
/// ```
/// use segment_progress::{BarConfig, render};
///
/// let config = BarConfig::new(0.0, 100.0, 12, "[]", ["#", " "]).unwrap();
/// assert_eq!(render(&[50.0], &config, 80).unwrap(), "[#####     ]\r");
/// ```
pub fn render(sample: &[f64], config: &BarConfig, terminal_width: usize) -> Result<String> {
    if sample.len() < config.segments() {
        return Err(ProgressError::SegmentCountMismatch {
            expected: config.segments(),
            got: sample.len(),
        });
    }

    let usable = usable_width(config, terminal_width);
    let brackets = config.brackets();

    // Every value takes up room, even one past the glyphs it could be drawn with.
    let counts: Vec<usize> = sample
        .iter()
        .map(|&value| segment_count(config, value, usable))
        .collect();
    let filled = counts.iter().fold(0usize, |acc, &c| acc.saturating_add(c));
    // Out-of-range samples can overfill the bar; never emit a negative remainder.
    let remainder = usable.saturating_sub(filled);

    let mut line = String::new();
    let bytes = line_len(config, &counts, remainder).ok_or(ProgressError::LineTooLong)?;
    line.try_reserve_exact(bytes).map_err(|_| ProgressError::LineTooLong)?;

    line.push_str(brackets.left());
    for (&count, glyph) in counts.iter().zip(config.mapping()) {
        for _ in 0..count {
            line.push_str(glyph);
        }
    }
    for _ in 0..remainder {
        line.push_str(config.filler());
    }

    line.push_str(brackets.right());
    line.push('\r');
    Ok(line)
}

/// Chars available between the brackets at the given terminal width.
#[must_use]
pub fn usable_width(config: &BarConfig, terminal_width: usize) -> usize {
    terminal_width
        .min(config.width())
        .saturating_sub(config.brackets_len())
}

/// Byte length of the finished line, or `None` if it can't even be addressed.
fn line_len(config: &BarConfig, counts: &[usize], remainder: usize) -> Option<usize> {
    let brackets = config.brackets();
    let mut bytes = brackets.left().len() + brackets.right().len() + 1;
    for (&count, glyph) in counts.iter().zip(config.mapping()) {
        bytes = bytes.checked_add(count.checked_mul(glyph.len())?)?;
    }
    bytes.checked_add(remainder.checked_mul(config.filler().len())?)
}

#[allow(clippy::cast_precision_loss)]
fn segment_count(config: &BarConfig, value: f64, usable: usize) -> usize {
    let mut normalized = (value - config.min()) / config.range();
    if config.overflow() == Overflow::Clamp {
        normalized = normalized.clamp(0.0, 1.0);
    }

    // `as` truncates toward zero and maps NaN to 0; negatives draw nothing.
    let count = (normalized * usable as f64) as i64;
    usize::try_from(count).unwrap_or(0)
}
