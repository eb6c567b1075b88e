//! Item code detection.
//!
//! Article codes are printed in dotted groups (`123.456.789`) and OCR often
//! turns some dots into spaces, so both are treated as separators. The first
//! digit-bearing groups of a line are glued together and the result is
//! accepted when its length and characters look like an article code.

use chrono::NaiveDate;
use tracing::trace;

use super::LineExtractor;
use crate::models::config::ExtractionConfig;
use crate::models::order::ItemRow;
use crate::ocr::OcrLine;

/// Detects item code lines.
pub struct ItemCodeExtractor {
    min_len: usize,
    max_len: usize,
    expected_len: usize,
    flag_digit_count: bool,
    max_tokens: usize,
    excluded: Vec<String>,
}

impl ItemCodeExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min_len: config.item_code_min_len,
            max_len: config.item_code_max_len,
            expected_len: config.expected_item_code_len,
            flag_digit_count: config.flag_digit_count,
            max_tokens: config.max_code_tokens,
            excluded: config.excluded_patterns.clone(),
        }
    }

    /// The accepted item code in `text`, with its digit warning flag.
    pub fn accept(&self, text: &str) -> Option<(String, bool)> {
        let code = candidate_code(text, self.max_tokens);
        let len = code.chars().count();

        if is_date_code(&code) {
            trace!("Skipping date-like candidate {}", code);
            return None;
        }
        if len < self.min_len || len > self.max_len {
            return None;
        }
        if self.excluded.iter().any(|pattern| code.contains(pattern.as_str())) {
            trace!("Skipping candidate {} with excluded pattern", code);
            return None;
        }

        let digit_warning = self.flag_digit_count && len != self.expected_len;
        Some((code, digit_warning))
    }
}

impl Default for ItemCodeExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl LineExtractor for ItemCodeExtractor {
    type Output = ItemRow;

    /// Item rows without quantities, in line order.
    fn extract_all(&self, lines: &[OcrLine]) -> Vec<ItemRow> {
        lines
            .iter()
            .enumerate()
            .filter_map(|(line_index, line)| {
                self.accept(&line.text).map(|(item_code, digit_warning)| ItemRow {
                    item_code,
                    bbox: line.bbox,
                    page: line.page,
                    line_index,
                    ordered_qty: None,
                    digit_warning,
                })
            })
            .collect()
    }
}

/// Join the first `max_tokens` digit-bearing tokens of a line.
///
/// Lines without any digit give an empty string, which no length range
/// accepts.
pub fn candidate_code(text: &str, max_tokens: usize) -> String {
    let joined: String = text
        .split(['.', ' '])
        .filter(|token| token.chars().any(|c| c.is_ascii_digit()))
        .take(max_tokens)
        .collect();
    joined.trim().to_string()
}

/// Eight characters forming a valid `DDMMYYYY` date.
pub fn is_date_code(code: &str) -> bool {
    code.chars().count() == 8 && NaiveDate::parse_from_str(code, "%d%m%Y").is_ok()
}
