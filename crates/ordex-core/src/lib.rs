//! Core library for purchase-order OCR processing.
//!
//! This crate provides:
//! - Order filename normalization and input discovery
//! - Page rasterization of scanned PDFs
//! - OCR engine adapters producing positioned text lines
//! - Rule-based extraction of references, locations, item codes and quantities
//! - Spreadsheet output (xlsx and csv)

pub mod error;
pub mod export;
pub mod input;
pub mod models;
pub mod ocr;
pub mod order;
pub mod pdf;
pub mod pipeline;

pub use error::{OrdexError, Result};
pub use export::{OutputRecord, SpreadsheetWriter};
pub use models::config::{OrdexConfig, Profile};
pub use models::order::{ItemRow, LocationTag, Order, OrderHeader};
pub use ocr::{OcrDocument, OcrLine, OcrService};
pub use order::{ExtractionResult, OrderExtractor, OrderParser};
pub use pipeline::OrderPipeline;
