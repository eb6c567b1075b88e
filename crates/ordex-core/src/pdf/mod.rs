//! PDF page rasterization.

mod rasterizer;

pub use rasterizer::LopdfRasterizer;

#[cfg(test)]
pub(crate) use rasterizer::tests as rasterizer_tests;

use crate::error::PdfError;
use image::DynamicImage;
use tracing::debug;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for turning PDF pages into images for OCR.
pub trait PageRasterizer {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Render a page (1-indexed) as an image.
    fn render_page(&self, page: u32) -> Result<DynamicImage>;

    /// Render pages in order, at most `max_pages` of them (0 = all).
    fn render_pages(&self, max_pages: usize) -> Result<Vec<DynamicImage>> {
        let mut count = self.page_count();
        if max_pages > 0 {
            count = count.min(max_pages as u32);
        }
        debug!("Rendering {} pages", count);
        (1..=count).map(|page| self.render_page(page)).collect()
    }
}
