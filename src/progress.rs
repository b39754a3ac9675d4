//! Progress reporting and Ctrl-C style cancellation.
//!
//! The export loop reports through a [`ProgressCallback`] and polls a
//! [`CancellationToken`] between frames. Neither is required: the defaults
//! report nothing and never cancel.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// Where an export stands.
///
/// Delivered every [`batch_size`](crate::ExportOptions::with_batch_size)
/// handled frames and once more when the loop ends.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    /// Selected frames handled so far, written or skipped.
    pub handled: u64,
    /// Selected frames in the job.
    pub expected: u64,
    /// Images written so far.
    pub saved: u64,
    /// Frames skipped so far.
    pub skipped: u64,
    /// Time since the loop started.
    pub elapsed: Duration,
    /// Linear extrapolation of the time left, once anything was handled.
    pub estimated_remaining: Option<Duration>,
    /// Index of the frame handled last, `None` in the closing report.
    pub last_frame: Option<u64>,
}

impl ProgressInfo {
    /// Share of the job handled, from `0.0` to `1.0`.
    pub fn fraction(&self) -> f64 {
        if self.expected == 0 {
            1.0
        } else {
            self.handled as f64 / self.expected as f64
        }
    }
}

/// Receives [`ProgressInfo`] snapshots from the export loop.
///
/// Implementations observe only. To stop an export, cancel its
/// [`CancellationToken`].
pub trait ProgressCallback: Send + Sync {
    /// Called with the latest snapshot.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Callback used when none is configured.
pub(crate) struct Silent;

impl ProgressCallback for Silent {
    fn on_progress(&self, _: &ProgressInfo) {}
}

/// A shared stop flag.
///
/// Clones observe the same flag, so one clone can live in a signal handler
/// while another sits in [`ExportOptions`](crate::ExportOptions).
///
/// ```
/// use extract_frames::CancellationToken;
///
/// let token = CancellationToken::new();
/// let for_handler = token.clone();
///
/// for_handler.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this token to stop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Counts outcomes and throttles callback invocations.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    expected: u64,
    saved: u64,
    skipped: u64,
    every: u64,
    unreported: u64,
    started: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, expected: u64, every: u64) -> Self {
        Self {
            callback,
            expected,
            saved: 0,
            skipped: 0,
            every: every.max(1),
            unreported: 0,
            started: Instant::now(),
        }
    }

    pub(crate) fn saved(&mut self, frame_number: u64) {
        self.saved += 1;
        self.tick(frame_number);
    }

    pub(crate) fn skipped(&mut self, frame_number: u64) {
        self.skipped += 1;
        self.tick(frame_number);
    }

    /// Emit the closing snapshot.
    pub(crate) fn finish(&self) {
        self.callback.on_progress(&self.snapshot(None));
    }

    fn tick(&mut self, frame_number: u64) {
        self.unreported += 1;
        if self.unreported == self.every {
            self.unreported = 0;
            self.callback.on_progress(&self.snapshot(Some(frame_number)));
        }
    }

    fn snapshot(&self, last_frame: Option<u64>) -> ProgressInfo {
        let handled = self.saved + self.skipped;
        let elapsed = self.started.elapsed();
        let estimated_remaining = (handled > 0).then(|| {
            let left = self.expected.saturating_sub(handled);
            elapsed.mul_f64(left as f64 / handled as f64)
        });

        ProgressInfo {
            handled,
            expected: self.expected,
            saved: self.saved,
            skipped: self.skipped,
            elapsed,
            estimated_remaining,
            last_frame,
        }
    }
}
