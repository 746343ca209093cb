//! Crash- and race-safe PNG output
//!
//! Images are encoded into a uniquely named temporary file next to the target and renamed
//! into place, so readers only ever see a missing or a complete file.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{DynamicImage, ImageFormat};

use crate::error::{TimelineError, TimelineResult};

/// Disambiguates temporary files written by the same process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Write `image` as PNG to `path` through a temporary file and a rename
///
/// The parent directory must exist. An existing file at `path` is replaced.
///
/// # Errors
///
/// Returns `TimelineError::AssetError` if encoding or the rename fails
pub(crate) fn save_png_atomically(image: &DynamicImage, path: &Path) -> TimelineResult<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TimelineError::asset(format!("'{}' has no file name", path.display())))?;
    let tmp = path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    image
        .save_with_format(&tmp, ImageFormat::Png)
        .map_err(|e| TimelineError::asset(format!("failed to write '{}': {e}", tmp.display())))?;

    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(TimelineError::asset(format!(
            "failed to move image into '{}': {e}",
            path.display()
        )));
    }
    Ok(())
}
