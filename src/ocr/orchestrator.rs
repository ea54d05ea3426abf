//! Document OCR
//!
//! Dispatches a staged upload to the image or PDF path.

use std::path::Path;
use std::sync::Arc;

use crate::engine::OcrEngine;
use crate::pdf;
use crate::scratch::ScratchSpace;

use super::adapter::recognize_image;
use super::types::{DocumentResult, OcrError, PageResult};
use super::PDF_CONTENT_TYPE;

/// Whether a staged file should go through the PDF renderer
pub fn is_pdf(path: &Path, content_type: &str) -> bool {
    content_type == PDF_CONTENT_TYPE
        || path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// OCR for whole uploads
#[derive(Clone)]
pub struct DocumentOcr {
    engine: Arc<dyn OcrEngine>,
    scratch: ScratchSpace,
}

impl DocumentOcr {
    pub fn new(engine: Arc<dyn OcrEngine>, scratch: ScratchSpace) -> Self {
        Self { engine, scratch }
    }

    /// Recognize the file at `path`. Blocks until every page is done.
    pub fn ocr_file(&self, path: &Path, content_type: &str) -> Result<DocumentResult, OcrError> {
        if is_pdf(path, content_type) {
            let pages: Vec<PageResult> = pdf::ocr_pdf(path, &self.scratch, self.engine.as_ref())?;
            return Ok(DocumentResult { pages });
        }

        let items = recognize_image(self.engine.as_ref(), path)?;
        Ok(DocumentResult::single_page(items))
    }
}
