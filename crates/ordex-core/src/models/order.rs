//! Order data extracted from one purchase-order document.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An order reconstructed from OCR lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order number taken from the filename.
    pub order_number: u64,

    /// Order date taken from the filename.
    pub order_date: NaiveDate,

    /// Canonical `<order_number>_<date>.pdf` filename of the source.
    pub filename: String,

    /// Reference number found next to the reference marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_rif: Option<i64>,

    /// Item rows in OCR line order.
    pub details: Vec<ItemRow>,

    /// Location tags in OCR line order.
    pub locations: Vec<LocationTag>,

    /// Problems that did not stop extraction.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Order number, date and canonical filename of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeader {
    pub order_number: u64,
    pub order_date: NaiveDate,
    pub filename: String,
}

impl Order {
    /// Create an order with nothing extracted yet.
    pub fn new(header: OrderHeader) -> Self {
        Self {
            order_number: header.order_number,
            order_date: header.order_date,
            filename: header.filename,
            order_rif: None,
            details: Vec::new(),
            locations: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Label of the nearest location tag strictly before `line_index`.
    ///
    /// Tags are kept in line order, so the last qualifying tag wins.
    pub fn location_for(&self, line_index: usize) -> Option<&str> {
        self.locations
            .iter()
            .filter(|tag| tag.line_index < line_index)
            .last()
            .map(|tag| tag.label.as_str())
    }

    /// File stem of the canonical filename.
    pub fn stem(&self) -> &str {
        self.filename
            .strip_suffix(".pdf")
            .or_else(|| self.filename.strip_suffix(".PDF"))
            .unwrap_or(&self.filename)
    }

    /// Number of item rows without a quantity.
    pub fn missing_quantities(&self) -> usize {
        self.details.iter().filter(|d| d.ordered_qty.is_none()).count()
    }
}

/// One ordered article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    /// Concatenated digit tokens of the item code.
    pub item_code: String,

    /// Bounding box of the OCR line holding the code.
    pub bbox: [f32; 4],

    /// Zero-based page index.
    pub page: usize,

    /// Position of the code's line in the document's OCR lines.
    pub line_index: usize,

    /// Quantity read from the same visual row.
    pub ordered_qty: Option<i64>,

    /// The code length differs from the expected length.
    pub digit_warning: bool,
}

/// A location label applying to every later item row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTag {
    pub label: String,
    pub line_index: usize,
}
