//! Single-slot, last-write-wins handoff between producers and the render thread.
//!
//! The slot is a [`crossbeam_channel::bounded`] channel of capacity one. Posting into a
//! full slot evicts the pending event first, so the render thread only ever sees the
//! most recent state. Progress reporting is lossy on purpose: a live bar has no use
//! for stale frames.
//!
//! [`Mailbox::post`] takes `&mut self`. Writers are serialized by whoever owns the
//! mailbox, which keeps a late update from evicting a pending [`Event::Stop`].

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

/// One value per bar segment, frozen once posted.
pub type Sample = Box<[f64]>;

/// A number a producer can report.
///
/// Implemented for every primitive integer and float type, so counters such as
/// `u64` byte totals or `usize` indices can be passed straight to
/// [`update`](crate::ProgressController::update). Integers wider than 53 bits lose
/// precision, which is far below what a terminal cell can show.
pub trait SampleValue {
    /// The value as a float in the bar's coordinate space.
    fn to_sample(self) -> f64;
}

macro_rules! impl_sample_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SampleValue for $ty {
                #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
                fn to_sample(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_sample_value!(f32, f64, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<T: SampleValue + Copy> SampleValue for &T {
    fn to_sample(self) -> f64 {
        (*self).to_sample()
    }
}

/// A message for the render thread.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Leave the render loop.
    Stop,
    /// Draw this sample.
    Update(Sample),
}

/// The sending half of the slot.
#[derive(Debug)]
pub struct Mailbox {
    tx: Sender<Event>,
    // Our own handle on the slot, used only to evict an undelivered event.
    evict: Receiver<Event>,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    /// Creates an empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        let (tx, evict) = bounded(1);
        Self { tx, evict }
    }

    /// A receiver for the render thread to block on.
    #[must_use]
    pub fn receiver(&self) -> Receiver<Event> {
        self.evict.clone()
    }

    /// Puts `event` in the slot, discarding whatever was still pending.
    pub fn post(&mut self, mut event: Event) {
        loop {
            match self.tx.try_send(event) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    // The render thread may win the race for the stale event; either
                    // way the slot is free on the next attempt.
                    if self.evict.try_recv().is_ok() {
                        tracing::trace!("discarded undelivered progress event");
                    }
                    event = back;
                }
                // Unreachable while `evict` is alive.
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    #[cfg(test)]
    fn is_pending(&self) -> bool {
        !self.tx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::{Event, Mailbox, SampleValue};

    /// Overwrite Semantics
    /// Two posts before a receive deliver only the second.
    #[test]
    fn test_last_write_wins() {
        let mut mailbox = Mailbox::new();
        let rx = mailbox.receiver();

        mailbox.post(Event::Update(vec![1.0].into()));
        mailbox.post(Event::Update(vec![2.0].into()));
        assert!(mailbox.is_pending());

        assert_eq!(rx.recv().unwrap(), Event::Update(vec![2.0].into()));
        assert!(rx.try_recv().is_err(), "A should have been discarded");
        assert!(!mailbox.is_pending());
    }

    /// Stop Overrides Update
    /// A stop posted over a pending update replaces it.
    #[test]
    fn test_stop_replaces_update() {
        let mut mailbox = Mailbox::new();
        let rx = mailbox.receiver();

        mailbox.post(Event::Update(vec![50.0].into()));
        mailbox.post(Event::Stop);

        assert_eq!(rx.recv().unwrap(), Event::Stop);
        assert!(rx.try_recv().is_err());
    }

    /// Cross-Thread Handoff
    /// A consumer racing with the producer sees updates in order and ends on stop.
    #[test]
    fn test_concurrent_consumer_sees_ordered_updates() {
        let mut mailbox = Mailbox::new();
        let rx = mailbox.receiver();

        let consumer = thread::spawn(move || {
            let mut seen = Vec::new();
            while let Ok(event) = rx.recv() {
                match event {
                    Event::Stop => break,
                    Event::Update(sample) => seen.push(sample[0]),
                }
            }
            seen
        });

        for i in 0..1000 {
            mailbox.post(Event::Update(vec![f64::from(i)].into()));
        }
        mailbox.post(Event::Stop);

        let seen = consumer.join().unwrap();
        assert!(seen.len() <= 1000);
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "updates reordered");
    }

    /// Sample Values
    /// Every primitive number converts, including wide counters and references.
    #[test]
    #[allow(clippy::float_cmp)]
    fn test_sample_value_conversions() {
        assert_eq!(42u64.to_sample(), 42.0);
        assert_eq!(7usize.to_sample(), 7.0);
        assert_eq!((-3i64).to_sample(), -3.0);
        assert_eq!(0.5f32.to_sample(), 0.5);
        assert_eq!((&9u8).to_sample(), 9.0);
        assert_eq!(u64::MAX.to_sample(), 18_446_744_073_709_551_615.0);
    }
}
