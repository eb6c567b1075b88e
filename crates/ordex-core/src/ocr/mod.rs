//! OCR service boundary and page aggregation.
//!
//! Recognition itself is done by an external engine. An [`OcrService`] is
//! constructed once (validating the engine) and then asked to recognize one
//! page image at a time; [`ocr_pages`] stitches the pages of a document into
//! a single line sequence.

mod bridge;
mod tesseract;

pub use bridge::BridgeEngine;
pub use tesseract::TesseractEngine;

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{OcrBackendKind, OcrConfig};
use crate::models::order::OrderHeader;

/// A recognized text line on one page image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLine {
    /// Recognized text content.
    pub text: String,
    /// Axis-aligned box `[x0, y0, x1, y1]` in image pixels.
    pub bbox: [f32; 4],
}

/// A text line of a document, tagged with its page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    /// Recognized text content.
    pub text: String,
    /// Axis-aligned box `[x0, y0, x1, y1]`, `y0 <= y1`.
    pub bbox: [f32; 4],
    /// Zero-based page index.
    pub page: usize,
}

impl OcrLine {
    pub fn new(text: impl Into<String>, bbox: [f32; 4], page: usize) -> Self {
        Self {
            text: text.into(),
            bbox,
            page,
        }
    }

    /// Top edge.
    pub fn top(&self) -> f32 {
        self.bbox[1]
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.bbox[3]
    }

    /// Vertical midpoint of the box.
    pub fn center_y(&self) -> f32 {
        vertical_center(&self.bbox)
    }

    /// Whether the box spans `y` strictly between its top and bottom edges.
    pub fn straddles(&self, y: f32) -> bool {
        self.top() < y && y < self.bottom()
    }
}

/// Vertical midpoint of an `[x0, y0, x1, y1]` box.
pub fn vertical_center(bbox: &[f32; 4]) -> f32 {
    (bbox[1] + bbox[3]) / 2.0
}

/// An OCR engine able to recognize text lines in a page image.
pub trait OcrService {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Recognize the lines of one image, in the engine's native order.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<RecognizedLine>, OcrError>;
}

/// Build the configured OCR service.
pub fn create_service(config: &OcrConfig) -> Result<Box<dyn OcrService>, OcrError> {
    let service: Box<dyn OcrService> = match config.backend {
        OcrBackendKind::Tesseract => Box::new(TesseractEngine::new(config)?),
        OcrBackendKind::Bridge => Box::new(BridgeEngine::new(config)?),
    };
    info!("Initialized {} OCR engine", service.name());
    Ok(service)
}

/// Run OCR on every page and concatenate the lines in page order.
pub fn ocr_pages(
    service: &dyn OcrService,
    images: &[DynamicImage],
) -> Result<Vec<OcrLine>, OcrError> {
    let start = Instant::now();
    let mut lines = Vec::new();

    for (page, image) in images.iter().enumerate() {
        let recognized = service.recognize(image)?;
        debug!("Page {}: {} lines", page, recognized.len());
        lines.extend(
            recognized
                .into_iter()
                .map(|line| OcrLine::new(line.text, line.bbox, page)),
        );
    }

    info!(
        "OCR complete: {} lines from {} pages in {}ms",
        lines.len(),
        images.len(),
        start.elapsed().as_millis()
    );
    Ok(lines)
}

/// Write an image to a temporary PNG for engines that read files.
pub(crate) fn write_temp_png(image: &DynamicImage) -> Result<tempfile::NamedTempFile, OcrError> {
    let file = tempfile::Builder::new()
        .prefix("ordex-page-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| OcrError::InvalidImage(format!("failed to create temp file: {}", e)))?;
    image
        .save_with_format(file.path(), image::ImageFormat::Png)
        .map_err(|e| OcrError::InvalidImage(e.to_string()))?;
    Ok(file)
}

/// OCR output of one document, as stored by `ordex ocr`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrDocument {
    #[serde(flatten)]
    pub header: OrderHeader,
    pub lines: Vec<OcrLine>,
}

impl OcrDocument {
    /// Load a document dump from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save the dump as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
