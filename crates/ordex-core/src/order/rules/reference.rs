//! Order reference ("rif.") extraction.

use super::LineExtractor;
use crate::ocr::OcrLine;

/// Finds the integer printed after the reference marker.
///
/// The reference line reads like `RIF. 4521.99`: the text is split on dots
/// and the first segment that is an integer is the reference.
pub struct ReferenceExtractor {
    marker: String,
}

impl ReferenceExtractor {
    /// Create an extractor for a marker, matched case-insensitively.
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_lowercase(),
        }
    }

    fn has_marker(&self, line: &OcrLine) -> bool {
        line.text.to_lowercase().contains(&self.marker)
    }
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        Self::new("rif")
    }
}

impl LineExtractor for ReferenceExtractor {
    type Output = i64;

    /// One value per marker line that holds an integer segment.
    fn extract_all(&self, lines: &[OcrLine]) -> Vec<i64> {
        lines
            .iter()
            .filter(|line| self.has_marker(line))
            .filter_map(|line| reference_in_text(&line.text))
            .collect()
    }
}

/// First reference in the document, if any marker line carries one.
pub fn extract_reference(lines: &[OcrLine], marker: &str) -> Option<i64> {
    ReferenceExtractor::new(marker).extract(lines)
}

fn reference_in_text(text: &str) -> Option<i64> {
    text.split('.')
        .map(str::trim)
        .find_map(|segment| segment.parse().ok())
}
