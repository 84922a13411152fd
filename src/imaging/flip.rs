//! Mirror correction for captured camera frames.
//!
//! The capture surface shows a front-camera preview, which is mirrored
//! relative to the physical document.  [`mirror`] writes a horizontally
//! flipped copy beside the source file; the source is never mutated.
//! [`ImagingError`] is shared with the result renderer.

use std::path::{Path, PathBuf};

use thiserror::Error;

// ---------------------------------------------------------------------------
// ImagingError
// ---------------------------------------------------------------------------

/// Errors that can occur in the imaging subsystem.
#[derive(Debug, Error)]
pub enum ImagingError {
    /// The image could not be decoded or encoded.
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),

    /// The image file could not be read or written.
    #[error("image I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// mirror
// ---------------------------------------------------------------------------

/// Write a horizontally flipped copy of `path` and return the new path.
///
/// The copy lands beside the source as `<stem>_flipped.<ext>` (PNG when the
/// source has no extension).  Callers treat failure as non-fatal and keep
/// working with the unflipped original.
pub fn mirror(path: &Path) -> Result<PathBuf, ImagingError> {
    let img = image::open(path)?;
    let flipped = img.fliph();

    let out = flipped_path(path);
    flipped.save(&out)?;

    log::debug!("imaging: mirrored {} -> {}", path.display(), out.display());
    Ok(out)
}

/// Derive the output path: `<stem>_flipped.<ext>`.
fn flipped_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("capture");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png");
    path.with_file_name(format!("{stem}_flipped.{ext}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
