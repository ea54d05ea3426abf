//! PDF page rasterization for OCR
//!
//! Uses MuPDF to render each page, then feeds the page image to the engine.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, RgbImage};
use mupdf::{Colorspace, Document, Matrix, Pixmap};

use crate::engine::OcrEngine;
use crate::ocr::{recognize_image, OcrError, PageResult, PDF_CONTENT_TYPE};
use crate::scratch::ScratchSpace;

/// Linear upscale applied to both axes; small print reads better at 2x.
pub const PDF_RENDER_SCALE: f32 = 2.0;

/// OCR every page of the PDF at `path`, in order.
///
/// Each page is rendered to a PNG in `scratch`, recognized, and removed again
/// before the next page starts. The first failing page aborts the document.
pub fn ocr_pdf(
    path: &Path,
    scratch: &ScratchSpace,
    engine: &dyn OcrEngine,
) -> Result<Vec<PageResult>, OcrError> {
    let data = std::fs::read(path)
        .map_err(|e| OcrError::Render(format!("Failed to read {}: {}", path.display(), e)))?;
    let doc = Document::from_bytes(&data, PDF_CONTENT_TYPE)?;
    let page_count = doc.page_count()?;

    tracing::debug!(pdf = %path.display(), page_count, "Opened PDF");

    let mut pages = Vec::with_capacity(page_count.max(0) as usize);
    for index in 0..page_count {
        let png = render_page_png(&doc, index)?;
        let staged = scratch.stage(&png, ".png")?;

        let items = recognize_image(engine, staged.path());
        staged.cleanup();

        pages.push(PageResult {
            page: index as usize + 1,
            items: items?,
        });
    }

    Ok(pages)
}

/// Render one page (0-indexed) at [`PDF_RENDER_SCALE`] and encode it as PNG.
pub fn render_page_png(doc: &Document, index: i32) -> Result<Vec<u8>, OcrError> {
    let page = doc.load_page(index)?;
    let matrix = Matrix::new_scale(PDF_RENDER_SCALE, PDF_RENDER_SCALE);
    let colorspace = Colorspace::device_rgb();
    let pixmap = page.to_pixmap(&matrix, &colorspace, false, true)?;

    let png = encode_png(&pixmap)?;
    tracing::debug!(
        page = index + 1,
        width = pixmap.width(),
        height = pixmap.height(),
        bytes = png.len(),
        "Rendered page"
    );
    Ok(png)
}

fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, OcrError> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgb_buffer = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in 0..(width as usize * height as usize) {
        let offset = pixel * n;
        let r = samples.get(offset).copied().unwrap_or(0);
        // Single-channel pixmaps are gray; repeat the one sample.
        let (g, b) = if n >= 3 {
            (
                samples.get(offset + 1).copied().unwrap_or(0),
                samples.get(offset + 2).copied().unwrap_or(0),
            )
        } else {
            (r, r)
        };
        rgb_buffer.extend_from_slice(&[r, g, b]);
    }

    let img = RgbImage::from_raw(width, height, rgb_buffer)
        .ok_or_else(|| OcrError::Render("Failed to create image buffer".to_string()))?;

    let mut output = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| OcrError::Render(format!("Failed to encode page image: {}", e)))?;

    Ok(output)
}
