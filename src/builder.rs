//! Fluent interface for constructing [`ProgressController`] instances.
//!
//! [`BarConfig::new`] plus [`ProgressController::new`] cover the common case. The
//! [`ProgressBuilder`] starts from the classic defaults and lets you override only what
//! you need:
//!
//! | setting  | default            |
//! |----------|--------------------|
//! | range    | `0.0 .. 100.0`     |
//! | width    | `80`               |
//! | brackets | `"[]"`             |
//! | mapping  | `["#", " "]`       |
//! | output   | standard error     |
//! | terminal | [`CrosstermWidth`] |
//! | overflow | [`Overflow::PassThrough`] |
//!
//! All validation happens in [`build`](ProgressBuilder::build).

use std::{
    io::{self, Write},
    sync::Arc,
};

use compact_str::CompactString;

use crate::{
    config::{BarConfig, Brackets, Overflow},
    error::Result,
    progress::ProgressController,
    terminal::{CrosstermWidth, TerminalWidth},
};

/// A builder pattern for constructing [`ProgressController`] instances.
///
/// ```
/// use segment_progress::{FixedWidth, ProgressBuilder, io::SharedWriter};
///
/// let sink = SharedWriter::new();
/// let progress = ProgressBuilder::new()
///     .range(0.0, 1.0)
///     .width(40)
///     .mapping(["=", "-", " "])
///     .output(sink.clone())
///     .terminal(FixedWidth(120))
///     .build()
///     .unwrap();
///
/// assert_eq!(progress.config().segments(), 2);
/// ```
pub struct ProgressBuilder {
    min: f64,
    max: f64,
    width: usize,
    brackets: Brackets,
    mapping: Vec<CompactString>,
    overflow: Overflow,
    output: Box<dyn Write + Send>,
    terminal: Arc<dyn TerminalWidth>,
}

impl Default for ProgressBuilder {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            width: 80,
            brackets: Brackets::split("[]"),
            mapping: vec!["#".into(), " ".into()],
            overflow: Overflow::default(),
            output: Box::new(io::stderr()),
            terminal: Arc::new(CrosstermWidth),
        }
    }
}

impl ProgressBuilder {
    /// Starts from the defaults listed in the module docs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value range. Checked in [`build`](Self::build).
    #[must_use]
    pub const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Sets the preferred total width, brackets included.
    #[must_use]
    pub const fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the brackets, either as one combined string or an explicit pair.
    #[must_use]
    pub fn brackets(mut self, brackets: impl Into<Brackets>) -> Self {
        self.brackets = brackets.into();
        self
    }

    /// Sets the fill glyphs, one per segment followed by the empty filler.
    #[must_use]
    pub fn mapping<M, G>(mut self, mapping: M) -> Self
    where
        M: IntoIterator<Item = G>,
        G: Into<CompactString>,
    {
        self.mapping = mapping.into_iter().map(Into::into).collect();
        self
    }

    /// Sets how out-of-range values are drawn.
    #[must_use]
    pub const fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Sets the stream the bar is drawn to.
    #[must_use]
    pub fn output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Sets the source of the live terminal width.
    #[must_use]
    pub fn terminal(mut self, terminal: impl TerminalWidth + 'static) -> Self {
        self.terminal = Arc::new(terminal);
        self
    }

    /// Validates the settings and returns a controller that has not been started.
    ///
    /// # Errors
    ///
    /// Same as [`BarConfig::new`].
    pub fn build(self) -> Result<ProgressController> {
        let config = BarConfig::new(self.min, self.max, self.width, self.brackets, self.mapping)?
            .with_overflow(self.overflow);
        Ok(ProgressController::from_parts(
            config,
            self.output,
            self.terminal,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressBuilder;
    use crate::{FixedWidth, Overflow, ProgressError, io::SharedWriter};

    /// Defaults
    /// An untouched builder matches the classic bar.
    #[test]
    #[allow(clippy::float_cmp)]
    fn test_defaults() {
        let progress = ProgressBuilder::new().build().unwrap();
        let cfg = progress.config();

        assert_eq!((cfg.min(), cfg.max()), (0.0, 100.0));
        assert_eq!(cfg.width(), 80);
        assert_eq!((cfg.brackets().left(), cfg.brackets().right()), ("[", "]"));
        assert_eq!(cfg.mapping(), &["#", " "]);
        assert_eq!(cfg.overflow(), Overflow::PassThrough);
        assert!(!progress.is_running());
    }

    /// Validation
    /// Errors surface from `build`, not from the setters.
    #[test]
    fn test_build_validates() {
        let err = ProgressBuilder::new().width(1).build().unwrap_err();
        assert!(matches!(err, ProgressError::InvalidWidth { .. }));

        let err = ProgressBuilder::new().range(5.0, 5.0).build().unwrap_err();
        assert!(matches!(err, ProgressError::InvalidRange { .. }));

        let err = ProgressBuilder::new().mapping(["#"]).build().unwrap_err();
        assert!(matches!(err, ProgressError::InvalidMapping { got: 1 }));
    }

    /// Wiring
    /// Output, terminal, and overflow settings reach the running bar.
    #[test]
    fn test_settings_reach_controller() {
        let sink = SharedWriter::new();
        let progress = ProgressBuilder::new()
            .width(12)
            .brackets(("<", ">"))
            .overflow(Overflow::Clamp)
            .output(sink.clone())
            .terminal(FixedWidth(80))
            .build()
            .unwrap();

        let bar = progress.scope().unwrap();
        bar.update([250]).unwrap();
        // Let the render thread pick the update up before stopping.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !sink.contents_lossy().contains('\r') {
            assert!(std::time::Instant::now() < deadline, "render thread never drew");
            std::thread::yield_now();
        }
        bar.finish().unwrap();

        assert_eq!(
            sink.contents_lossy(),
            "\x1b[?25l<##########>\r\x1b[?25h\x1b[0m"
        );
    }
}
