//! Error types shared by configuration, rendering, and the render loop.
//!
//! Construction errors ([`InvalidRange`](ProgressError::InvalidRange),
//! [`InvalidWidth`](ProgressError::InvalidWidth),
//! [`InvalidMapping`](ProgressError::InvalidMapping)) are only ever returned while
//! building a [`BarConfig`](crate::BarConfig). Everything else is reported either
//! synchronously from [`update`](crate::ProgressController::update) or, once the
//! terminal has been restored, from [`stop`](crate::ProgressController::stop).

use std::io;

use thiserror::Error;

/// Errors produced by this crate.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// The upper bound is not strictly greater than the lower bound.
    #[error("invalid range: max ({max}) must be greater than min ({min})")]
    InvalidRange {
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },

    /// The total width cannot even hold the brackets.
    #[error("invalid width: {width} is narrower than the brackets ({brackets} chars)")]
    InvalidWidth {
        /// Configured total width.
        width: usize,
        /// Combined length of the left and right brackets.
        brackets: usize,
    },

    /// The fill mapping needs at least one segment glyph plus the filler.
    #[error("invalid mapping: need at least 2 glyphs, got {got}")]
    InvalidMapping {
        /// Number of glyphs supplied.
        got: usize,
    },

    /// A sample has fewer values than the mapping has segment glyphs.
    #[error("segment count mismatch: mapping needs {expected} values, sample has {got}")]
    SegmentCountMismatch {
        /// Minimum number of values (`mapping.len() - 1`).
        expected: usize,
        /// Number of values in the offending sample.
        got: usize,
    },

    /// An out-of-range value asked for a line too long to allocate.
    #[error("line too long: a sample value is too far out of range to draw")]
    LineTooLong,

    /// Querying the live terminal width failed.
    #[error("terminal size query failed: {0}")]
    TerminalSize(#[source] io::Error),

    /// Writing to the output stream failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The render thread panicked before observing `Stop`.
    #[error("render thread panicked")]
    WorkerPanicked,
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = ProgressError> = std::result::Result<T, E>;
