//! Rule-based extractors working on OCR lines.

pub mod items;
pub mod location;
pub mod quantity;
pub mod reference;

pub use items::{candidate_code, is_date_code, ItemCodeExtractor};
pub use location::LocationExtractor;
pub use quantity::{QuantityMatch, QuantityMatcher};
pub use reference::{extract_reference, ReferenceExtractor};

use crate::ocr::OcrLine;

/// Trait for extractors scanning a document's OCR lines.
pub trait LineExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract every occurrence, in line order.
    fn extract_all(&self, lines: &[OcrLine]) -> Vec<Self::Output>;

    /// Extract the first occurrence.
    fn extract(&self, lines: &[OcrLine]) -> Option<Self::Output> {
        self.extract_all(lines).into_iter().next()
    }
}
