//! Error types for the ordex-core library.

use thiserror::Error;

/// Main error type for the ordex library.
#[derive(Error, Debug)]
pub enum OrdexError {
    /// Input file discovery or filename error.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Order extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Spreadsheet output error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to locating and naming input documents.
#[derive(Error, Debug)]
pub enum InputError {
    /// The filename follows neither naming convention.
    #[error("cannot parse order filename '{filename}': {reason}")]
    Filename { filename: String, reason: String },

    /// The path has no usable file name component.
    #[error("path has no file name: {0}")]
    NoFileName(String),

    /// Invalid glob pattern for discovery.
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Renaming to the canonical filename failed.
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract a page image from the PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR engine could not be initialized.
    #[error("failed to initialize OCR engine: {0}")]
    Init(String),

    /// The engine process failed or returned an error status.
    #[error("OCR engine failed: {0}")]
    Engine(String),

    /// The engine output could not be parsed.
    #[error("invalid OCR output: {0}")]
    Output(String),

    /// Writing the page image for the engine failed.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to order field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No quantity line was found for an item code.
    #[error("no quantity found for item code {item_code} (page {page}, line {line_index})")]
    MissingQuantity {
        item_code: String,
        page: usize,
        line_index: usize,
    },

    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },
}

/// Errors related to writing spreadsheets.
#[derive(Error, Debug)]
pub enum ExportError {
    /// xlsx serialization failed.
    #[error("xlsx: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// csv serialization failed.
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error while writing output.
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the ordex library.
pub type Result<T> = std::result::Result<T, OrdexError>;
