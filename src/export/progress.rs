//! Progress reporting for export operations
//!
//! The exporter reports the running row count to a [`ProgressNotifier`],
//! which calls its observers every `interval` rows. Delivery is synchronous
//! on the exporting thread, and an observer that returns an error aborts the
//! export with that error.
//!
//! [`ProgressBarObserver`] is a ready-made observer drawing a terminal
//! spinner with throughput.

use std::fmt;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::trace;

use crate::error::Result;

/// Callback receiving the number of rows written so far
pub type ProgressObserver = Box<dyn FnMut(u64) -> Result<()> + Send>;

/// Fans row counts out to observers every `interval` rows.
///
/// An interval of zero disables notification.
#[derive(Default)]
pub struct ProgressNotifier {
    interval: u64,
    observers: Vec<ProgressObserver>,
}

impl ProgressNotifier {
    /// Create a notifier firing every `interval` rows
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            observers: Vec::new(),
        }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn set_interval(&mut self, interval: u64) {
        self.interval = interval;
    }

    /// Attach an observer
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(u64) -> Result<()> + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Detach every observer
    pub fn clear(&mut self) {
        self.observers.clear();
    }

    /// Check whether `count` lands on a notification boundary
    pub fn is_due(&self, count: u64) -> bool {
        self.interval > 0 && count > 0 && count % self.interval == 0
    }

    /// Record that `count` rows have been written, notifying when due
    ///
    /// # Returns
    /// * `Result<()>` - The first observer error, if any
    pub fn record(&mut self, count: u64) -> Result<()> {
        if self.is_due(count) {
            self.notify(count)?;
        }
        Ok(())
    }

    /// Call every observer with `count`, in registration order.
    ///
    /// Stops at the first observer that fails.
    pub fn notify(&mut self, count: u64) -> Result<()> {
        trace!("Progress: {} rows", count);
        for observer in &mut self.observers {
            observer(count)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProgressNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressNotifier")
            .field("interval", &self.interval)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Terminal progress display for exports
///
/// Tracks the row count and shows a spinner (or a bar when the total is
/// known) with rows per second.
pub struct ProgressBarObserver {
    /// Progress bar handle, shared with the observer closures
    bar: ProgressBar,
    /// Start time of the export
    start_time: Instant,
}

impl ProgressBarObserver {
    /// Create a new progress display
    ///
    /// # Arguments
    /// * `total` - Total number of rows if known (None for unknown)
    ///
    /// # Returns
    /// * `Self` - New progress display
    pub fn new(total: Option<u64>) -> Self {
        let bar = match total {
            Some(n) => {
                let bar = ProgressBar::new(n);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {pos} rows {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            }
        };

        Self {
            bar,
            start_time: Instant::now(),
        }
    }

    /// Create a display that never draws, for non-interactive runs
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            start_time: Instant::now(),
        }
    }

    /// Update the display with the number of rows written so far
    pub fn update(&self, count: u64) {
        update_bar(&self.bar, self.start_time, count);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Build an observer closure that drives this display
    pub fn observer(&self) -> impl FnMut(u64) -> Result<()> + Send + 'static {
        let bar = self.bar.clone();
        let start_time = self.start_time;
        move |count| {
            update_bar(&bar, start_time, count);
            Ok(())
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn update_bar(bar: &ProgressBar, start_time: Instant, count: u64) {
    bar.set_position(count);

    let elapsed = start_time.elapsed().as_secs_f64();
    if elapsed > 0.0 {
        let speed = count as f64 / elapsed;
        bar.set_message(format!("({:.0} rows/sec)", speed));
    }
}
