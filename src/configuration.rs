//! Export configuration.
//!
//! [`ExportOptions`] is a builder that threads progress callbacks,
//! cancellation, JPEG quality, and output placement through job planning and
//! the export loop without widening every function signature.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use extract_frames::{
//!     CancellationToken, CollisionPolicy, ExportOptions, ProgressCallback, ProgressInfo,
//! };
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{}/{} frames handled", info.handled, info.expected);
//!     }
//! }
//!
//! let token = CancellationToken::new();
//! let options = ExportOptions::new()
//!     .with_progress(Arc::new(LogProgress))
//!     .with_cancellation(token.clone())
//!     .with_jpeg_quality(85)
//!     .with_collision_policy(CollisionPolicy::Fail);
//! assert_eq!(options.jpeg_quality(), 85);
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    output::CollisionPolicy,
    progress::{CancellationToken, ProgressCallback, Silent},
};

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Configuration for planning and running an export.
///
/// A default-constructed value writes quality-95 JPEGs next to the video,
/// renames on collision, reports no progress, and is never cancelled.
#[derive(Clone)]
pub struct ExportOptions {
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    /// How often to fire the progress callback (every N frames).
    pub(crate) batch_size: u64,
    pub(crate) jpeg_quality: u8,
    pub(crate) collision_policy: CollisionPolicy,
    /// Parent directory for the output directory; `None` means the video's
    /// own directory.
    pub(crate) output_root: Option<PathBuf>,
}

impl Debug for ExportOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExportOptions")
            .field("cancellable", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("collision_policy", &self.collision_policy)
            .field("output_root", &self.output_root)
            .finish_non_exhaustive()
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(Silent),
            cancellation: None,
            batch_size: 1,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            collision_policy: CollisionPolicy::default(),
            output_root: None,
        }
    }

    /// Report progress to `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Stop the export once `token` is cancelled. Images already written
    /// are kept.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, frames: u64) -> Self {
        self.batch_size = frames.max(1);
        self
    }

    /// Set the JPEG quality, clamped to `1..=100`.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Choose what happens when the output directory already exists.
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Place the output directory under `root` instead of next to the video.
    #[must_use]
    pub fn with_output_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.output_root = Some(root.as_ref().to_path_buf());
        self
    }

    /// The configured JPEG quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// The configured collision policy.
    pub fn collision_policy(&self) -> CollisionPolicy {
        self.collision_policy
    }

    /// Whether the attached token, if any, was cancelled.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
