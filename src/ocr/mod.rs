//! OCR Module
//!
//! Turns staged uploads into page-ordered recognition results.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_server::ocr::DocumentOcr;
//!
//! let ocr = DocumentOcr::new(engine, scratch);
//! let result = ocr.ocr_file(staged.path(), "application/pdf")?;
//! for page in &result.pages {
//!     println!("page {}: {} lines", page.page, page.items.len());
//! }
//! ```

pub mod adapter;
mod orchestrator;
mod types;

pub use adapter::recognize_image;
pub use orchestrator::{is_pdf, DocumentOcr};
pub use types::{DocumentResult, OcrError, PageResult, RecognitionItem};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Uploads must be an image or a PDF.
pub fn is_supported_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == PDF_CONTENT_TYPE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_content_types() {
        assert!(is_supported_content_type("image/png"));
        assert!(is_supported_content_type("image/jpeg"));
        assert!(is_supported_content_type("application/pdf"));
        assert!(!is_supported_content_type("text/plain"));
        assert!(!is_supported_content_type("application/octet-stream"));
        assert!(!is_supported_content_type("application/pdfx"));
    }
}
