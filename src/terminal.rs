//! Terminal lifecycle and width discovery.
//!
//! [`activate`] and [`deactivate`] are the only places that write control sequences.
//! They are called exactly once each per render loop, by the controller:
//!
//! * **activate**: `ESC[?25l` (hide cursor).
//! * **deactivate**: `ESC[?25h` (show cursor) then `ESC[0m` (reset attributes).
//!
//! Calling [`activate`] twice without a matching [`deactivate`] is the caller's
//! problem; the controller never does.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, Show},
    queue,
    style::{Attribute, SetAttribute},
};

/// Hides the cursor and flushes.
pub fn activate<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, Hide)?;
    out.flush()
}

/// Shows the cursor, resets display attributes, and flushes.
pub fn deactivate<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, Show, SetAttribute(Attribute::Reset))?;
    out.flush()
}

/// Source of the live terminal width, queried once per draw.
///
/// Implemented for any `Fn() -> io::Result<usize>` so tests and embedders can plug in
/// their own source.
pub trait TerminalWidth: Send + Sync {
    /// Current width in columns.
    fn width(&self) -> io::Result<usize>;
}

/// Queries the controlling terminal through [`crossterm::terminal::size`].
///
/// Fails when no terminal is attached; the error ends the render loop and is
/// reported by [`stop`](crate::ProgressController::stop).
#[derive(Clone, Copy, Debug, Default)]
pub struct CrosstermWidth;

impl TerminalWidth for CrosstermWidth {
    fn width(&self) -> io::Result<usize> {
        crossterm::terminal::size().map(|(cols, _)| usize::from(cols))
    }
}

/// A terminal that never resizes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FixedWidth(pub usize);

impl TerminalWidth for FixedWidth {
    fn width(&self) -> io::Result<usize> {
        Ok(self.0)
    }
}

impl<F> TerminalWidth for F
where
    F: Fn() -> io::Result<usize> + Send + Sync,
{
    fn width(&self) -> io::Result<usize> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{FixedWidth, TerminalWidth, activate, deactivate};

    /// Control Sequences
    /// Activation hides the cursor; deactivation shows it and resets attributes.
    #[test]
    fn test_lifecycle_sequences() {
        let mut out = Vec::new();
        activate(&mut out).unwrap();
        assert_eq!(out, b"\x1b[?25l");

        out.clear();
        deactivate(&mut out).unwrap();
        assert_eq!(out, b"\x1b[?25h\x1b[0m");
    }

    /// Width Sources
    /// Fixed widths and closures both satisfy the trait.
    #[test]
    fn test_width_sources() {
        assert_eq!(FixedWidth(42).width().unwrap(), 42);

        let closure = || -> io::Result<usize> { Ok(7) };
        assert_eq!(closure.width().unwrap(), 7);

        let failing = || -> io::Result<usize> { Err(io::Error::other("not a tty")) };
        assert!(failing.width().is_err());
    }
}
