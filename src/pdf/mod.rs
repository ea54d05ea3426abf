//! PDF Module
//!
//! Rasterizes PDF pages via MuPDF so they can go through the image OCR path.

mod renderer;

pub use renderer::{ocr_pdf, render_page_png, PDF_RENDER_SCALE};

#[cfg(test)]
pub(crate) mod fixtures;
