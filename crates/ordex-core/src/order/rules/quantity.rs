//! Quantity lookup on the visual row of an item code.

use crate::models::config::{ExtractionConfig, QuantityParse};
use crate::models::order::ItemRow;
use crate::ocr::{vertical_center, OcrLine};

/// Outcome of a quantity lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityMatch {
    /// A quantity text was found and parsed.
    Found(i64),
    /// No line on the row looks like a quantity.
    NotFound,
    /// A quantity-shaped text was found but holds no integer.
    Unparseable(String),
}

/// Finds the quantity printed on the same row as an item code.
///
/// Quantities are printed with decimals (`50,000`), so a row candidate must
/// contain a comma and have a trimmed length within the configured range.
pub struct QuantityMatcher {
    min_len: usize,
    max_len: usize,
    parse: QuantityParse,
}

impl QuantityMatcher {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min_len: config.quantity_min_len,
            max_len: config.quantity_max_len,
            parse: config.quantity_parse,
        }
    }

    /// Look up the quantity of `row` among the lines of its own page.
    pub fn find(&self, row: &ItemRow, lines: &[OcrLine]) -> QuantityMatch {
        let center = vertical_center(&row.bbox);

        let text = lines
            .iter()
            .filter(|line| line.page == row.page && line.straddles(center))
            .map(|line| line.text.trim())
            .find(|text| self.is_quantity_text(text));

        match text {
            Some(text) => match self.parse_quantity(text) {
                Some(qty) => QuantityMatch::Found(qty),
                None => QuantityMatch::Unparseable(text.to_string()),
            },
            None => QuantityMatch::NotFound,
        }
    }

    fn is_quantity_text(&self, text: &str) -> bool {
        let len = text.chars().count();
        text.contains(',') && len >= self.min_len && len <= self.max_len
    }

    fn parse_quantity(&self, text: &str) -> Option<i64> {
        match self.parse {
            QuantityParse::BeforeComma => text.split(',').next()?.trim().parse().ok(),
            QuantityParse::FirstChar => text
                .chars()
                .next()
                .and_then(|c| c.to_digit(10))
                .map(i64::from),
        }
    }
}

impl Default for QuantityMatcher {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}
