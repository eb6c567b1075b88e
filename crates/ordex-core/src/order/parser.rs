//! Rule-based order parser.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::{ExtractionConfig, MissingQuantity};
use crate::models::order::{Order, OrderHeader};
use crate::ocr::OcrLine;

use super::rules::{
    ItemCodeExtractor, LineExtractor, LocationExtractor, QuantityMatch, QuantityMatcher,
    ReferenceExtractor,
};
use super::{OrderExtractor, Result};

/// Result of order extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted order data.
    pub order: Order,
    /// Number of OCR lines examined.
    pub line_count: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Order parser combining the reference, location, item and quantity rules.
pub struct OrderParser {
    config: ExtractionConfig,
}

impl OrderParser {
    /// Create a parser from extraction settings.
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Enable or disable location tagging.
    pub fn with_locations(mut self, enabled: bool) -> Self {
        self.config.locations_enabled = enabled;
        self
    }

    /// Set the policy for item codes without a quantity.
    pub fn with_missing_quantity(mut self, policy: MissingQuantity) -> Self {
        self.config.missing_quantity = policy;
        self
    }

    /// Settings in use.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Parse the OCR lines of one document.
    pub fn parse(&self, header: OrderHeader, lines: &[OcrLine]) -> Result<ExtractionResult> {
        let start = Instant::now();
        let mut order = Order::new(header);

        info!(
            "Parsing order {} from {} OCR lines",
            order.order_number,
            lines.len()
        );

        order.order_rif = ReferenceExtractor::new(&self.config.reference_marker).extract(lines);
        if order.order_rif.is_none() {
            debug!("No reference found in order {}", order.order_number);
        }

        if self.config.locations_enabled {
            order.locations = LocationExtractor::new(&self.config.locations).extract_all(lines);
        }

        let matcher = QuantityMatcher::new(&self.config);
        let mut details = ItemCodeExtractor::new(&self.config).extract_all(lines);

        for row in &mut details {
            match matcher.find(row, lines) {
                QuantityMatch::Found(qty) => row.ordered_qty = Some(qty),
                QuantityMatch::NotFound => {
                    if self.config.missing_quantity == MissingQuantity::Fail {
                        return Err(ExtractionError::MissingQuantity {
                            item_code: row.item_code.clone(),
                            page: row.page,
                            line_index: row.line_index,
                        });
                    }
                    warn!("No quantity found for item code {}", row.item_code);
                    order
                        .warnings
                        .push(format!("No quantity found for item code {}", row.item_code));
                }
                QuantityMatch::Unparseable(text) => {
                    if self.config.missing_quantity == MissingQuantity::Fail {
                        return Err(ExtractionError::Parse {
                            field: format!("quantity of item code {}", row.item_code),
                            value: text,
                        });
                    }
                    warn!(
                        "Unreadable quantity '{}' for item code {}",
                        text, row.item_code
                    );
                    order.warnings.push(format!(
                        "Unreadable quantity '{}' for item code {}",
                        text, row.item_code
                    ));
                }
            }
        }

        order.details = details;

        debug!(
            "Extracted {} item rows ({} without quantity) for order {}",
            order.details.len(),
            order.missing_quantities(),
            order.order_number
        );

        Ok(ExtractionResult {
            order,
            line_count: lines.len(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl Default for OrderParser {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl OrderExtractor for OrderParser {
    fn extract(&self, header: OrderHeader, lines: &[OcrLine]) -> Result<Order> {
        self.parse(header, lines).map(|r| r.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn header() -> OrderHeader {
        OrderHeader {
            order_number: 77,
            order_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            filename: "77_2024-01-05.pdf".to_string(),
        }
    }

    fn sample_lines() -> Vec<OcrLine> {
        vec![
            OcrLine::new("RIF. 4521.99", [0.0, 10.0, 80.0, 20.0], 0),
            OcrLine::new("123.456.789", [0.0, 100.0, 50.0, 110.0], 0),
            OcrLine::new("50,000", [60.0, 100.0, 110.0, 112.0], 0),
        ]
    }

    #[test]
    fn test_parse_basic_order() {
        let order = OrderParser::default()
            .extract(header(), &sample_lines())
            .unwrap();

        assert_eq!(order.order_number, 77);
        assert_eq!(order.order_rif, Some(4521));
        assert_eq!(order.details.len(), 1);
        assert_eq!(order.details[0].item_code, "123456789");
        assert_eq!(order.details[0].ordered_qty, Some(50));
        assert!(!order.details[0].digit_warning);
        assert!(order.warnings.is_empty());
    }

    #[test]
    fn test_locations_follow_configuration() {
        let mut lines = vec![OcrLine::new("Consegna ufficio B", [0.0, 40.0, 100.0, 50.0], 0)];
        lines.extend(sample_lines());

        let order = OrderParser::default().extract(header(), &lines).unwrap();
        assert_eq!(order.location_for(order.details[0].line_index), Some("-UFF.B"));

        let order = OrderParser::default()
            .with_locations(false)
            .extract(header(), &lines)
            .unwrap();
        assert!(order.locations.is_empty());
    }

    #[test]
    fn test_missing_quantity_warns() {
        let lines = vec![
            OcrLine::new("123.456.789", [0.0, 100.0, 50.0, 110.0], 0),
            OcrLine::new("50,000", [60.0, 200.0, 110.0, 212.0], 0),
        ];
        let result = OrderParser::default().parse(header(), &lines).unwrap();

        assert_eq!(result.order.details[0].ordered_qty, None);
        assert_eq!(result.order.missing_quantities(), 1);
        assert_eq!(
            result.order.warnings,
            vec!["No quantity found for item code 123456789".to_string()]
        );
        assert_eq!(result.line_count, 2);
    }

    #[test]
    fn test_missing_quantity_fails_when_configured() {
        let lines = vec![OcrLine::new("123.456.789", [0.0, 100.0, 50.0, 110.0], 3)];
        let err = OrderParser::default()
            .with_missing_quantity(MissingQuantity::Fail)
            .extract(header(), &lines)
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractionError::MissingQuantity { ref item_code, page: 3, line_index: 0 }
                if item_code == "123456789"
        ));
    }

    #[test]
    fn test_strict_settings() {
        let lines = vec![
            OcrLine::new("RIF. 12", [0.0, 10.0, 80.0, 20.0], 0),
            OcrLine::new("Ufficio A", [0.0, 30.0, 80.0, 40.0], 0),
            OcrLine::new("123.456.789", [0.0, 100.0, 50.0, 110.0], 0),
            OcrLine::new("5,000", [60.0, 100.0, 110.0, 112.0], 0),
            OcrLine::new("1234.567.890", [0.0, 150.0, 50.0, 160.0], 0),
        ];
        let order = OrderParser::new(ExtractionConfig::strict())
            .extract(header(), &lines)
            .unwrap();

        assert!(order.locations.is_empty());
        assert_eq!(order.details.len(), 1);
        assert_eq!(order.details[0].ordered_qty, Some(5));
    }

    #[test]
    fn test_unparseable_quantity_in_strict_mode() {
        let lines = vec![
            OcrLine::new("123.456.789", [0.0, 100.0, 50.0, 110.0], 0),
            OcrLine::new("x,000", [60.0, 100.0, 110.0, 112.0], 0),
        ];
        let err = OrderParser::new(ExtractionConfig::strict())
            .extract(header(), &lines)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { .. }));
    }

    #[test]
    fn test_no_items() {
        let lines = vec![OcrLine::new("Ordine di acquisto", [0.0, 0.0, 100.0, 10.0], 0)];
        let order = OrderParser::default().extract(header(), &lines).unwrap();
        assert!(order.details.is_empty());
        assert_eq!(order.order_rif, None);
    }
}
