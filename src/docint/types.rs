//! Wire payloads and domain types for document layout analysis.
//!
//! The service returns a job body `{status, analyzeResult}`; the analyze
//! result carries the full extracted text plus a list of paragraphs, each
//! with a flat `[x0, y0, x1, y1, …]` bounding polygon.  The wire structs
//! here deserialize that shape; [`DocumentAnalysis`] is the immutable
//! domain view the rest of the crate works with.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// Structured layout extracted from one document image.
///
/// Produced once per analysis request; immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAnalysis {
    /// Paragraph blocks in reading order.
    pub paragraphs: Vec<Paragraph>,
    /// The full extracted text, fed back to the chat model.
    pub full_text: String,
}

/// One paragraph block with its bounding polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    /// Text content of the block.
    pub content: String,
    /// Bounding polygon as `(x, y)` vertices in image pixels.
    pub polygon: Vec<(f32, f32)>,
}

// ---------------------------------------------------------------------------
// Job status classification
// ---------------------------------------------------------------------------

/// Classified state of an analysis job poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    /// Still processing — keep polling.
    InProgress,
    /// Terminal success — the payload carries the analyze result.
    Succeeded,
    /// Any other terminal status (`failed`, `canceled`, …) — do not retry.
    Failed(String),
}

/// Map a wire `status` string onto a [`JobState`].
pub fn classify_status(status: &str) -> JobState {
    match status {
        "running" | "notStarted" => JobState::InProgress,
        "succeeded" => JobState::Succeeded,
        other => JobState::Failed(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body returned by every job poll.
#[derive(Debug, Deserialize)]
pub struct JobResponse {
    pub status: String,
    #[serde(rename = "analyzeResult")]
    pub analyze_result: Option<WireAnalyzeResult>,
}

#[derive(Debug, Deserialize)]
pub struct WireAnalyzeResult {
    /// Full extracted text.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub paragraphs: Vec<WireParagraph>,
}

#[derive(Debug, Deserialize)]
pub struct WireParagraph {
    #[serde(default)]
    pub content: String,
    #[serde(rename = "boundingRegions", default)]
    pub bounding_regions: Vec<WireBoundingRegion>,
}

#[derive(Debug, Deserialize)]
pub struct WireBoundingRegion {
    /// Flat coordinate list: `[x0, y0, x1, y1, …]`.
    #[serde(default)]
    pub polygon: Vec<f32>,
}

impl WireAnalyzeResult {
    /// Convert the wire payload into the domain [`DocumentAnalysis`].
    ///
    /// Only the first bounding region of each paragraph is used (one region
    /// per paragraph for single-page images); a trailing odd coordinate is
    /// dropped when pairing.
    pub fn into_analysis(self) -> DocumentAnalysis {
        let paragraphs = self
            .paragraphs
            .into_iter()
            .map(|p| {
                let polygon = p
                    .bounding_regions
                    .first()
                    .map(|r| {
                        r.polygon
                            .chunks_exact(2)
                            .map(|xy| (xy[0], xy[1]))
                            .collect()
                    })
                    .unwrap_or_default();
                Paragraph {
                    content: p.content,
                    polygon,
                }
            })
            .collect();

        DocumentAnalysis {
            paragraphs,
            full_text: self.content,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
