//! OCR Engine
//!
//! The recognizer itself is an external collaborator. This module defines the
//! seam it plugs into and the raw, engine-shaped output it produces.
//!
//! Backends:
//! - Tesseract (local CLI, one process per call)
//!
//! Engine output is grouped the way the engine reports it: a sequence of
//! groups, each a sequence of detections. Flattening into response records
//! happens in [`crate::ocr::adapter`] and nowhere else.

mod gate;
mod tesseract;

pub use gate::{EngineGate, GateStats, GatePermit, GatedEngine};
pub use tesseract::{missing_languages, parse_tsv, tesseract_languages, TesseractEngine};

use std::path::Path;

use crate::ocr::OcrError;

/// Four corner points, clockwise from top-left, in image pixels
pub type Quad = [[f32; 2]; 4];

/// One text region as reported by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub quad: Quad,
    pub text: String,
    /// Engine confidence, nominally 0-1
    pub confidence: f32,
}

/// Detections the engine reports together (one text block for tesseract)
pub type DetectionGroup = Vec<Detection>;

/// OCR engine trait
///
/// Implementations are created once at startup and shared by every request,
/// so they must be callable from several threads at once. Calls block.
pub trait OcrEngine: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Recognize all text in the image at `image`.
    fn recognize(&self, image: &Path) -> Result<Vec<DetectionGroup>, OcrError>;
}

/// Axis-aligned rectangle as a quad
pub fn rect_quad(left: f32, top: f32, right: f32, bottom: f32) -> Quad {
    [[left, top], [right, top], [right, bottom], [left, bottom]]
}
