//! The progress controller and its render thread.
//!
//! A [`ProgressController`] owns exactly one background thread. Producers call
//! [`update`](ProgressController::update) from any thread; each call overwrites the
//! [`Mailbox`] slot and wakes the render thread, which draws the most recent sample
//! with the live terminal width.
//!
//! # Lifecycle
//!
//! ```text
//! NotStarted --start()--> Running --stop()--> Stopped
//! ```
//!
//! There is no restart. [`start`](ProgressController::start) hides the cursor before
//! the thread is spawned; [`stop`](ProgressController::stop) joins the thread and then
//! shows the cursor and resets attributes, whatever ended the render loop.
//!
//! # Output
//!
//! While running, the render thread is the only writer of the output stream. Writing
//! to the same stream from elsewhere during that window garbles the bar.

use std::{
    fmt,
    io::Write,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};
use web_time::Instant;

use crate::{
    config::BarConfig,
    error::{ProgressError, Result},
    mailbox::{Event, Mailbox, Sample, SampleValue},
    render::{render, usable_width},
    terminal::{self, CrosstermWidth, TerminalWidth},
};

/// Stream shared by the caller thread (cursor handling) and the render thread (draws).
type Output = Arc<Mutex<Box<dyn Write + Send>>>;

/// Where a controller is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    /// Constructed, nothing written yet.
    #[default]
    NotStarted,
    /// The render thread is alive and accepting updates.
    Running,
    /// Stopped for good.
    Stopped,
}

/// A thread-safe, cloneable handle to a live progress bar.
///
/// Cloning is cheap (Arc bump); every clone drives the same bar and the same render
/// thread. When the last clone is dropped while running, the bar is stopped and the
/// terminal restored.
///
/// ```
/// use segment_progress::{BarConfig, FixedWidth, ProgressController, io::SharedWriter};
///
/// let sink = SharedWriter::new();
/// let config = BarConfig::new(0.0, 100.0, 12, "[]", ["#", " "]).unwrap();
/// let progress = ProgressController::with_terminal(config, sink.clone(), FixedWidth(80));
///
/// progress.start().unwrap();
/// progress.update([50]).unwrap();
/// progress.stop().unwrap();
///
/// let out = sink.contents_lossy();
/// assert!(out.starts_with("\x1b[?25l"));
/// assert!(out.ends_with("\x1b[?25h\x1b[0m"));
/// ```
#[derive(Clone)]
pub struct ProgressController {
    shared: Arc<Shared>,
}

struct Shared {
    config: Arc<BarConfig>,
    output: Output,
    terminal: Arc<dyn TerminalWidth>,
    state: Mutex<State>,
}

struct State {
    phase: Phase,
    mailbox: Mailbox,
    worker: Option<JoinHandle<Result<()>>>,
    started: Option<Instant>,
    stopped: Option<Instant>,
}

impl State {
    /// Running with a render thread that hasn't exited on its own.
    fn accepts_updates(&self) -> bool {
        self.phase == Phase::Running && self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }
}

impl fmt::Debug for ProgressController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressController")
            .field("config", &self.shared.config)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl ProgressController {
    /// Creates a stopped controller that measures the real terminal.
    pub fn new(config: BarConfig, output: impl Write + Send + 'static) -> Self {
        Self::with_terminal(config, output, CrosstermWidth)
    }

    /// Creates a controller with a custom terminal-width source.
    pub fn with_terminal(
        config: BarConfig,
        output: impl Write + Send + 'static,
        terminal: impl TerminalWidth + 'static,
    ) -> Self {
        Self::from_parts(config, Box::new(output), Arc::new(terminal))
    }

    pub(crate) fn from_parts(
        config: BarConfig,
        output: Box<dyn Write + Send>,
        terminal: Arc<dyn TerminalWidth>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config: Arc::new(config),
                output: Arc::new(Mutex::new(output)),
                terminal,
                state: Mutex::new(State {
                    phase: Phase::NotStarted,
                    mailbox: Mailbox::new(),
                    worker: None,
                    started: None,
                    stopped: None,
                }),
            }),
        }
    }

    /// The validated bar configuration.
    #[must_use]
    pub fn config(&self) -> &BarConfig {
        &self.shared.config
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared.state.lock().phase
    }

    /// Returns `true` between a successful `start` and the next `stop`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }

    /// Time spent running, or `None` if never started.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        let state = self.shared.state.lock();
        let started = state.started?;
        Some(
            state
                .stopped
                .map_or_else(|| started.elapsed(), |stopped| stopped.duration_since(started)),
        )
    }

    /// Hides the cursor and spawns the render thread.
    ///
    /// Does nothing unless the controller has never been started.
    ///
    /// # Errors
    ///
    /// Fails if the cursor sequence cannot be written or the thread cannot be spawned.
    /// In the latter case the terminal is restored before returning.
    pub fn start(&self) -> Result<()> {
        self.shared.start()
    }

    /// Publishes a new sample, replacing any sample not yet drawn.
    ///
    /// Outside the `Running` phase this silently does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::SegmentCountMismatch`] if the sample has fewer values
    /// than the mapping has segment glyphs.
    pub fn update<I>(&self, values: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: SampleValue,
    {
        let sample: Sample = values.into_iter().map(SampleValue::to_sample).collect();
        self.shared.update(sample)
    }

    /// Stops the render thread, waits for it, and restores the terminal.
    ///
    /// A second call is a no-op.
    ///
    /// # Errors
    ///
    /// Reports whatever ended the render loop early (terminal query, write failure,
    /// panic) or a failure to write the restore sequences. The terminal restore is
    /// attempted in every case before the error is returned.
    pub fn stop(&self) -> Result<()> {
        self.shared.stop()
    }

    /// Starts the bar (if needed) and returns a guard that stops it when dropped.
    ///
    /// # Errors
    ///
    /// Propagates [`start`](Self::start) failures.
    ///
    /// ```
    /// use segment_progress::{BarConfig, FixedWidth, ProgressController, io::SharedWriter};
    ///
    /// let sink = SharedWriter::new();
    /// let config = BarConfig::new(0.0, 10.0, 20, "[]", ["#", "."]).unwrap();
    /// let progress = ProgressController::with_terminal(config, sink.clone(), FixedWidth(80));
    ///
    /// {
    ///     let bar = progress.scope().unwrap();
    ///     for i in 0..=10 {
    ///         bar.update([i]).unwrap();
    ///     }
    /// }
    ///
    /// assert!(!progress.is_running());
    /// assert!(sink.contents_lossy().ends_with("\x1b[?25h\x1b[0m"));
    /// ```
    pub fn scope(&self) -> Result<ProgressGuard<'_>> {
        self.start()?;
        Ok(ProgressGuard { controller: self })
    }
}

impl Shared {
    fn start(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.phase != Phase::NotStarted {
            return Ok(());
        }

        terminal::activate(&mut *self.output.lock())?;

        let rx = state.mailbox.receiver();
        let config = Arc::clone(&self.config);
        let width_source = Arc::clone(&self.terminal);
        let output = Arc::clone(&self.output);

        let spawned = thread::Builder::new()
            .name("segment-progress".into())
            .spawn(move || render_loop(&rx, &config, &*width_source, &output));

        let worker = match spawned {
            Ok(worker) => worker,
            Err(err) => {
                state.phase = Phase::Stopped;
                drop(state);
                if let Err(restore) = terminal::deactivate(&mut *self.output.lock()) {
                    warn!(error = %restore, "failed to restore terminal");
                }
                return Err(err.into());
            }
        };

        state.worker = Some(worker);
        state.started = Some(Instant::now());
        state.phase = Phase::Running;
        debug!(
            width = self.config.width(),
            segments = self.config.segments(),
            "progress started"
        );
        Ok(())
    }

    fn update(&self, sample: Sample) -> Result<()> {
        let mut state = self.state.lock();
        if !state.accepts_updates() {
            return Ok(());
        }

        let expected = self.config.segments();
        if sample.len() < expected {
            return Err(ProgressError::SegmentCountMismatch {
                expected,
                got: sample.len(),
            });
        }

        state.mailbox.post(Event::Update(sample));
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let worker = {
            let mut state = self.state.lock();
            if state.phase != Phase::Running {
                return Ok(());
            }

            // Overwrites any pending update; nothing is accepted after this point.
            state.mailbox.post(Event::Stop);
            state.phase = Phase::Stopped;
            state.worker.take()
        };

        let outcome = worker.map_or(Ok(()), |worker| {
            worker.join().unwrap_or(Err(ProgressError::WorkerPanicked))
        });
        let restored = terminal::deactivate(&mut *self.output.lock());

        let mut state = self.state.lock();
        state.stopped = Some(Instant::now());
        let elapsed = state
            .started
            .zip(state.stopped)
            .map(|(start, stop)| stop.duration_since(start));
        drop(state);

        match &outcome {
            Ok(()) => debug!(?elapsed, "progress stopped"),
            Err(err) => warn!(error = %err, ?elapsed, "progress stopped after render failure"),
        }

        outcome?;
        restored?;
        Ok(())
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            warn!(error = %err, "failed to stop progress on drop");
        }
    }
}

fn render_loop(
    rx: &Receiver<Event>,
    config: &BarConfig,
    terminal: &dyn TerminalWidth,
    output: &Output,
) -> Result<()> {
    // `recv` only fails once every sender is gone, which means the controller is gone.
    while let Ok(event) = rx.recv() {
        match event {
            Event::Stop => break,
            Event::Update(sample) => draw(&sample, config, terminal, output)?,
        }
    }
    Ok(())
}

fn draw(
    sample: &[f64],
    config: &BarConfig,
    terminal: &dyn TerminalWidth,
    output: &Output,
) -> Result<()> {
    let columns = terminal.width().map_err(ProgressError::TerminalSize)?;
    let line = render(sample, config, columns)?;
    trace!(columns, usable = usable_width(config, columns), "drawing progress line");

    // One write and one flush per line, under one lock.
    let mut out = output.lock();
    out.write_all(line.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Keeps a bar running for the duration of a scope.
///
/// Created by [`ProgressController::scope`]. Dereferences to the controller, so
/// `guard.update(..)` works directly. Dropping the guard, including during a panic,
/// stops the bar and restores the terminal.
#[must_use = "the bar stops as soon as the guard is dropped"]
pub struct ProgressGuard<'a> {
    controller: &'a ProgressController,
}

impl ProgressGuard<'_> {
    /// Stops the bar now and reports the outcome, instead of logging it on drop.
    ///
    /// # Errors
    ///
    /// Same as [`ProgressController::stop`].
    pub fn finish(self) -> Result<()> {
        // Drop runs afterwards and finds the bar already stopped.
        self.controller.stop()
    }
}

impl std::ops::Deref for ProgressGuard<'_> {
    type Target = ProgressController;

    fn deref(&self) -> &Self::Target {
        self.controller
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.controller.stop() {
            warn!(error = %err, "failed to stop progress bar");
        }
    }
}
