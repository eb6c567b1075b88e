//! Order field extraction from OCR lines.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, OrderParser};

use crate::error::ExtractionError;
use crate::models::order::{Order, OrderHeader};
use crate::ocr::OcrLine;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for order extractors.
pub trait OrderExtractor {
    /// Extract an order from the OCR lines of one document.
    fn extract(&self, header: OrderHeader, lines: &[OcrLine]) -> Result<Order>;
}
