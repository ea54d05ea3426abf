//! OCR Types
//!
//! Response records and the pipeline error type.

use serde::{Deserialize, Serialize};

use crate::engine::Quad;

/// One recognized text region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionItem {
    pub text: String,
    /// Confidence in 0-1
    pub score: f32,
    /// Corner points, clockwise from top-left
    #[serde(rename = "box")]
    pub bbox: Quad,
}

/// Recognized items for one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page number (1-indexed)
    pub page: usize,
    pub items: Vec<RecognitionItem>,
}

/// Recognition result for a whole upload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentResult {
    pub pages: Vec<PageResult>,
}

impl DocumentResult {
    /// A standalone image is a one-page document.
    pub fn single_page(items: Vec<RecognitionItem>) -> Self {
        Self {
            pages: vec![PageResult { page: 1, items }],
        }
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Failed to render PDF: {0}")]
    Render(String),

    #[error("OCR processing failed: {0}")]
    Recognition(String),

    #[error("Failed to stage file: {0}")]
    Staging(#[from] std::io::Error),

    #[error("OCR task failed: {0}")]
    Task(String),

    #[error("OCR engine not available: {0}")]
    EngineUnavailable(String),
}

impl From<mupdf::Error> for OcrError {
    fn from(err: mupdf::Error) -> Self {
        OcrError::Render(err.to_string())
    }
}
