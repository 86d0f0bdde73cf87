//! # `segment_progress`
//!
//! A live, single-line, multi-segment progress bar drawn in place from a background
//! thread.
//!
//! Producers report progress with [`ProgressController::update`] from any thread. The
//! call never waits on drawing: it drops the sample into a single-slot mailbox,
//! replacing any sample that hasn't been drawn yet, and the render thread draws the
//! most recent one. The bar is:
//!
//! * **Lossy**: only the latest state matters, intermediate updates may be skipped.
//! * **Multi-segment**: each value in a sample fills its own glyph, back to back.
//! * **Resize-aware**: the live terminal width is queried on every draw.
//! * **Self-restoring**: the cursor is hidden while the bar runs and always restored,
//!   including when the render loop fails or the owning scope unwinds.
//!
//! ```no_run
//! use segment_progress::ProgressBuilder;
//!
//! let progress = ProgressBuilder::new().width(40).build()?;
//! {
//!     let bar = progress.scope()?;
//!     for i in 0..=100 {
//!         bar.update([i])?;
//!     }
//! }
//! # Ok::<(), segment_progress::ProgressError>(())
//! ```
//!
//! ## Modules
//!
//! * [`builder`]: Fluent construction with the classic defaults.
//! * [`config`]: The validated, immutable [`BarConfig`].
//! * [`render`]: The pure bar-drawing algorithm.
//! * [`terminal`]: Cursor hide/restore and terminal width discovery.
//! * [`mailbox`]: The last-write-wins handoff to the render thread.
//! * [`progress`]: The [`ProgressController`] state machine and its scope guard.
//! * [`io`]: An in-memory, cloneable output sink.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
pub mod config;
pub mod error;
pub mod io;
pub mod mailbox;
pub mod progress;
pub mod render;
pub mod terminal;

pub use builder::ProgressBuilder;
pub use config::{BarConfig, Brackets, Overflow};
pub use error::{ProgressError, Result};
pub use mailbox::SampleValue;
pub use progress::{Phase, ProgressController, ProgressGuard};
pub use render::render;
pub use terminal::{CrosstermWidth, FixedWidth, TerminalWidth};
