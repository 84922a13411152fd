//! Per-turn image variant trail.
//!
//! One captured frame goes through up to three named variants in a turn:
//! the original capture, the mirror-corrected copy, and the annotated
//! render.  [`ImageTrail`] keeps them as an ordered sequence so the
//! orchestrator always reads the latest variant and the full lineage stays
//! inspectable, instead of silently overwriting a single mutable path.

use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ImageStage
// ---------------------------------------------------------------------------

/// Which processing step produced an image variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStage {
    /// The frame as captured by the surface.
    Original,
    /// Mirror-corrected copy of the capture.
    Mirrored,
    /// Analysis overlay rendered on top of the latest variant.
    Annotated,
}

// ---------------------------------------------------------------------------
// ImageTrail
// ---------------------------------------------------------------------------

/// Ordered sequence of image variants for one turn.
#[derive(Debug, Clone, Default)]
pub struct ImageTrail {
    variants: Vec<(ImageStage, PathBuf)>,
}

impl ImageTrail {
    /// Start a trail from an optional captured frame.
    pub fn new(original: Option<PathBuf>) -> Self {
        let variants = original
            .map(|p| vec![(ImageStage::Original, p)])
            .unwrap_or_default();
        Self { variants }
    }

    /// Append a new variant; it becomes the latest.
    pub fn push(&mut self, stage: ImageStage, path: PathBuf) {
        self.variants.push((stage, path));
    }

    /// The most recent variant, if any frame was captured at all.
    pub fn latest(&self) -> Option<&Path> {
        self.variants.last().map(|(_, p)| p.as_path())
    }

    /// Stage of the most recent variant.
    pub fn latest_stage(&self) -> Option<ImageStage> {
        self.variants.last().map(|(s, _)| *s)
    }

    /// Consume the trail, keeping only the latest path.
    pub fn into_latest(mut self) -> Option<PathBuf> {
        self.variants.pop().map(|(_, p)| p)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
