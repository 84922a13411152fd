//! Document layout-analysis module.
//!
//! This module provides:
//! * [`DocumentAnalyzer`] — async trait implemented by all analyzer backends.
//! * [`ApiDocumentAnalyzer`] — the remote two-phase (submit + poll) backend.
//! * [`DocumentAnalysis`] / [`Paragraph`] — the immutable structured result.
//! * [`DocIntError`] — error variants, including the bounded-poll timeout.

pub mod client;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiDocumentAnalyzer, DocIntError, DocumentAnalyzer};
pub use types::{DocumentAnalysis, Paragraph};

#[cfg(test)]
pub use client::MockDocumentAnalyzer;
