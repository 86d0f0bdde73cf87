//! In-memory output capture.
//!
//! The controller takes ownership of its output stream because the render thread
//! writes to it. [`SharedWriter`] is a cloneable [`Write`] sink: hand one clone to the
//! controller and keep another to read back exactly what was written.
//!
//! ```
//! use std::io::Write as _;
//!
//! use segment_progress::io::SharedWriter;
//!
//! let sink = SharedWriter::new();
//! let mut writer = sink.clone();
//! writer.write_all(b"[##  ]\r").unwrap();
//! assert_eq!(sink.contents_lossy(), "[##  ]\r");
//! ```

use std::{
    io::{self, Write},
    sync::Arc,
};

use parking_lot::Mutex;

/// A thread-safe, cloneable byte buffer implementing [`Write`].
///
/// Cloning is cheap (Arc bump) and every clone appends to the same buffer.
#[derive(Clone, Debug, Default)]
pub struct SharedWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedWriter {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.inner.lock().clone()
    }

    /// Returns everything written so far as text, replacing invalid UTF-8.
    #[must_use]
    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Discards the buffered bytes.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.lock().extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write as _, thread};

    use super::SharedWriter;

    /// Shared Buffer
    /// Writes through one clone are visible through another.
    #[test]
    fn test_clones_share_buffer() {
        let sink = SharedWriter::new();
        assert!(sink.is_empty());

        let mut a = sink.clone();
        let mut b = sink.clone();
        a.write_all(b"ab").unwrap();
        b.write_all(b"cd").unwrap();

        assert_eq!(sink.contents(), b"abcd");
        assert_eq!(sink.len(), 4);

        sink.clear();
        assert!(sink.is_empty());
    }

    /// Whole Writes
    /// Concurrent `write_all` calls never interleave inside one call.
    #[test]
    fn test_write_all_is_atomic() {
        let sink = SharedWriter::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mut w = sink.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        w.write_all(b"[####]\r").unwrap();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let text = sink.contents_lossy();
        assert_eq!(text.matches("[####]\r").count(), 800);
        assert_eq!(text.len(), 800 * 7);
    }
}
