//! Two colored segments racing each other across the terminal.
//!
//! Run with `cargo run --example segments`.

use std::{thread, time::Duration};

use segment_progress::ProgressBuilder;

fn main() -> segment_progress::Result<()> {
    let progress = ProgressBuilder::new()
        .mapping(["\x1b[31m>", "\x1b[32m>", "\x1b[0m "])
        .build()?;

    let bar = progress.scope()?;
    for i in 0..25 {
        bar.update([i, i * 2])?;
        thread::sleep(Duration::from_millis(50));
    }
    bar.finish()
}
