//! End-to-end processing of order documents.

use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::input;
use crate::models::config::OrdexConfig;
use crate::models::order::Order;
use crate::ocr::{self, OcrDocument, OcrLine, OcrService};
use crate::order::OrderParser;
use crate::pdf::{LopdfRasterizer, PageRasterizer};

/// Rasterizes, recognizes and parses order documents.
///
/// The OCR service is created once and reused for every document.
pub struct OrderPipeline {
    config: OrdexConfig,
    service: Box<dyn OcrService>,
    parser: OrderParser,
}

impl OrderPipeline {
    /// Create a pipeline with the configured OCR engine.
    pub fn new(config: OrdexConfig) -> Result<Self> {
        let service = ocr::create_service(&config.ocr)?;
        Ok(Self::with_service(config, service))
    }

    /// Create a pipeline around an existing OCR service.
    pub fn with_service(config: OrdexConfig, service: Box<dyn OcrService>) -> Self {
        let parser = OrderParser::new(config.extraction.clone());
        Self {
            config,
            service,
            parser,
        }
    }

    pub fn config(&self) -> &OrdexConfig {
        &self.config
    }

    /// Resolve a document's name and run OCR on its pages.
    pub fn ocr_file(&self, path: &Path) -> Result<OcrDocument> {
        let (header, path) = input::resolve(path, self.config.input.rename)?;
        let lines = self.recognize(&path)?;
        Ok(OcrDocument { header, lines })
    }

    /// Parse a previously recognized document.
    pub fn extract(&self, document: OcrDocument) -> Result<Order> {
        let result = self.parser.parse(document.header, &document.lines)?;
        debug!(
            "Parsed {} lines in {}ms",
            result.line_count, result.processing_time_ms
        );
        Ok(result.order)
    }

    /// Process one document from file to order.
    pub fn process_file(&self, path: &Path) -> Result<Order> {
        let start = Instant::now();
        let document = self.ocr_file(path)?;
        let order = self.extract(document)?;

        info!(
            "Order {}: {} items in {}ms",
            order.order_number,
            order.details.len(),
            start.elapsed().as_millis()
        );
        Ok(order)
    }

    fn recognize(&self, path: &Path) -> Result<Vec<OcrLine>> {
        let data = fs::read(path)?;

        let mut rasterizer = LopdfRasterizer::new();
        rasterizer.load(&data)?;
        let images = rasterizer.render_pages(self.config.pdf.max_pages)?;
        debug!("Rendered {} pages of {}", images.len(), path.display());

        Ok(ocr::ocr_pages(self.service.as_ref(), &images)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OcrError, OrdexError};
    use crate::models::config::MissingQuantity;
    use crate::ocr::RecognizedLine;
    use crate::pdf::rasterizer_tests::gray_pdf;
    use image::DynamicImage;
    use pretty_assertions::assert_eq;

    /// Returns the same order table for every page, tagged by page shade.
    struct FixedEngine;

    impl OcrService for FixedEngine {
        fn name(&self) -> &str {
            "fixed"
        }

        fn recognize(&self, image: &DynamicImage) -> std::result::Result<Vec<RecognizedLine>, OcrError> {
            let shade = image.to_luma8().get_pixel(0, 0)[0];
            let line = |text: &str, bbox: [f32; 4]| RecognizedLine {
                text: text.to_string(),
                bbox,
            };
            if shade == 0 {
                Ok(vec![
                    line("RIF. 4521.99", [0.0, 10.0, 80.0, 20.0]),
                    line("123.456.789", [0.0, 100.0, 50.0, 110.0]),
                    line("50,000", [60.0, 100.0, 110.0, 112.0]),
                ])
            } else {
                Ok(vec![line("987.654.321", [0.0, 100.0, 50.0, 110.0])])
            }
        }
    }

    fn pipeline(config: OrdexConfig) -> OrderPipeline {
        OrderPipeline::with_service(config, Box::new(FixedEngine))
    }

    #[test]
    fn test_process_renames_and_parses() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("ORDINE N-77 del 05-01-2024.pdf");
        fs::write(&source, gray_pdf(1, (4, 4))).unwrap();

        let order = pipeline(OrdexConfig::default()).process_file(&source).unwrap();

        assert_eq!(order.filename, "77_2024-01-05.pdf");
        assert_eq!(order.order_rif, Some(4521));
        assert_eq!(order.details[0].item_code, "123456789");
        assert_eq!(order.details[0].ordered_qty, Some(50));
        assert!(dir.path().join("77_2024-01-05.pdf").exists());
        assert!(!source.exists());
    }

    #[test]
    fn test_pages_are_tagged_and_limited() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("77_2024-01-05.pdf");
        fs::write(&source, gray_pdf(2, (4, 4))).unwrap();

        let document = pipeline(OrdexConfig::default()).ocr_file(&source).unwrap();
        assert_eq!(document.lines.len(), 4);
        assert_eq!(document.lines[3].page, 1);

        let order = pipeline(OrdexConfig::default())
            .extract(document)
            .unwrap();
        assert_eq!(order.details.len(), 2);
        assert_eq!(order.details[1].ordered_qty, None);

        let mut config = OrdexConfig::default();
        config.pdf.max_pages = 1;
        let document = pipeline(config).ocr_file(&source).unwrap();
        assert_eq!(document.lines.len(), 3);
    }

    #[test]
    fn test_fail_policy_surfaces_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("77_2024-01-05.pdf");
        fs::write(&source, gray_pdf(2, (4, 4))).unwrap();

        let mut config = OrdexConfig::default();
        config.extraction.missing_quantity = MissingQuantity::Fail;
        let err = pipeline(config).process_file(&source).unwrap_err();
        assert!(matches!(err, OrdexError::Extraction(_)));
    }

    #[test]
    fn test_bad_filename_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("scan.pdf");
        fs::write(&source, gray_pdf(1, (4, 4))).unwrap();

        let err = pipeline(OrdexConfig::default()).process_file(&source).unwrap_err();
        assert!(matches!(err, OrdexError::Input(_)));
    }
}
