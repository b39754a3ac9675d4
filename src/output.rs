//! Output directory naming and creation.
//!
//! Frames land in a directory named after the video and the job parameters,
//! placed next to the video unless an output root is configured:
//!
//! ```text
//! clip.mp4  ->  clip_frames_split_every_5_frames_between_1500_2100/
//! ```
//!
//! When that name is taken, [`CollisionPolicy`] decides between appending
//! ` (1)`, ` (2)`, … and failing with [`ExtractError::DirectoryExists`].

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{error::ExtractError, range::FrameRange};

/// What to do when the output directory name is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Append ` (1)`, ` (2)`, … until a free name is found.
    #[default]
    Disambiguate,
    /// Return [`ExtractError::DirectoryExists`].
    Fail,
}

/// Base name of the output directory for a video stem, stride and range.
///
/// ```
/// use extract_frames::{FrameRange, output::directory_name};
///
/// let range = FrameRange::new(0, 3600)?;
/// assert_eq!(
///     directory_name("clip", 1, &range),
///     "clip_frames_split_every_1_frame_between_0_3600",
/// );
/// # Ok::<(), extract_frames::ExtractError>(())
/// ```
pub fn directory_name(video_stem: &str, stride: u64, range: &FrameRange) -> String {
    let frame_text = if stride == 1 { "frame" } else { "frames" };
    format!(
        "{video_stem}_frames_split_every_{stride}_{frame_text}_between_{}_{}",
        range.start_index(),
        range.end_index(),
    )
}

/// Choose the output directory path for a job without creating it.
///
/// `parent` is the directory the output is placed in (normally the video's
/// own directory).
///
/// # Errors
///
/// Returns [`ExtractError::DirectoryExists`] when the name is taken and
/// `policy` is [`CollisionPolicy::Fail`].
pub fn plan_directory(
    parent: &Path,
    base_name: &str,
    policy: CollisionPolicy,
) -> Result<PathBuf, ExtractError> {
    let candidate = parent.join(base_name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    match policy {
        CollisionPolicy::Fail => Err(ExtractError::DirectoryExists(candidate)),
        CollisionPolicy::Disambiguate => {
            let mut suffix = 1_u32;
            loop {
                let candidate = parent.join(format!("{base_name} ({suffix})"));
                if !candidate.exists() {
                    log::debug!(
                        "{} exists, using {}",
                        parent.join(base_name).display(),
                        candidate.display()
                    );
                    return Ok(candidate);
                }
                suffix += 1;
            }
        }
    }
}

/// Create the planned output directory, including missing parents.
///
/// The final component must not exist yet.
///
/// # Errors
///
/// - [`ExtractError::DirectoryExists`] if something already occupies `path`.
/// - [`ExtractError::DirectoryCreation`] for any other filesystem failure,
///   such as a permission error or a parent that is a regular file.
pub fn create_directory(path: &Path) -> Result<(), ExtractError> {
    let creation_error = |source| ExtractError::DirectoryCreation {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(creation_error)?;
    }

    match fs::create_dir(path) {
        Ok(()) => {
            log::debug!("Created output directory {}", path.display());
            Ok(())
        }
        Err(error) if error.kind() == ErrorKind::AlreadyExists => {
            Err(ExtractError::DirectoryExists(path.to_path_buf()))
        }
        Err(error) => Err(creation_error(error)),
    }
}
