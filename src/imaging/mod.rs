//! Imaging module — local frame correction and result rendering.
//!
//! This module provides:
//! * [`mirror`] — horizontal flip of captured frames (preview convention).
//! * [`render`] — best-effort polygon overlay of an analysis result.
//! * [`ImagingError`] — error variants shared by both operations.

pub mod annotate;
pub mod flip;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use annotate::render;
pub use flip::{mirror, ImagingError};
