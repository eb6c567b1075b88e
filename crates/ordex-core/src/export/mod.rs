//! Flattening orders into spreadsheet rows and writing them.

mod delimited;
mod xlsx;

pub use delimited::write_csv;
pub use xlsx::write_xlsx;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::ExportError;
use crate::models::config::{OutputConfig, OutputMode, SpreadsheetFormat};
use crate::models::order::Order;

/// Header of the article column.
pub const ARTICLE_COLUMN: &str = "Article No.";
/// Header of the quantity column.
pub const QUANTITY_COLUMN: &str = "Quantity";
/// Header of the reference column.
pub const RIF_COLUMN: &str = "rif";
/// Header of the optional digit warning column.
pub const DIGIT_WARNING_COLUMN: &str = "digit_warning";

const DIGIT_WARNING_TEXT: &str = "Digit count warning";

/// One spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    pub article_no: String,
    pub quantity: Option<i64>,
    /// `<order_number>/<order_rif><location>`.
    pub rif: String,
    pub digit_warning: bool,
}

/// Which optional columns a table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub digit_warning: bool,
    pub location: bool,
}

impl Columns {
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            digit_warning: config.include_digit_warning,
            location: config.include_location,
        }
    }

    /// Column headers in output order.
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = vec![ARTICLE_COLUMN, QUANTITY_COLUMN, RIF_COLUMN];
        if self.digit_warning {
            headers.push(DIGIT_WARNING_COLUMN);
        }
        headers
    }
}

impl OutputRecord {
    /// Text of the digit warning cell.
    pub fn digit_warning_text(&self) -> &'static str {
        if self.digit_warning { DIGIT_WARNING_TEXT } else { "" }
    }
}

/// Flatten the item rows of an order.
pub fn records(order: &Order, columns: Columns) -> Vec<OutputRecord> {
    let rif = order
        .order_rif
        .map(|rif| rif.to_string())
        .unwrap_or_default();

    order
        .details
        .iter()
        .map(|row| {
            let location = if columns.location {
                order.location_for(row.line_index).unwrap_or("")
            } else {
                ""
            };
            OutputRecord {
                article_no: row.item_code.clone(),
                quantity: row.ordered_qty,
                rif: format!("{}/{}{}", order.order_number, rif, location),
                digit_warning: row.digit_warning,
            }
        })
        .collect()
}

/// Spreadsheet path for an order.
///
/// Per-document output is named after the order's canonical filename; shared
/// output always goes to the same file.
pub fn output_path(config: &OutputConfig, order: &Order) -> PathBuf {
    let stem = match config.mode {
        OutputMode::PerDocument => order.stem(),
        OutputMode::Shared => config.shared_name.as_str(),
    };
    config
        .directory
        .join(format!("{}.{}", stem, config.format.extension()))
}

/// Path of the shared spreadsheet.
pub fn shared_path(config: &OutputConfig) -> PathBuf {
    config
        .directory
        .join(format!("{}.{}", config.shared_name, config.format.extension()))
}

/// Write records in the given format, replacing any existing file.
pub fn write_records(
    path: &Path,
    format: SpreadsheetFormat,
    columns: Columns,
    records: &[OutputRecord],
) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match format {
        SpreadsheetFormat::Xlsx => write_xlsx(path, columns, records)?,
        SpreadsheetFormat::Csv => write_csv(path, columns, records)?,
    }

    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

/// Collects rows across orders and writes them to one or many files.
pub struct SpreadsheetWriter {
    config: OutputConfig,
    columns: Columns,
    pending: Vec<OutputRecord>,
}

impl SpreadsheetWriter {
    pub fn new(config: OutputConfig) -> Self {
        let columns = Columns::from_config(&config);
        Self {
            config,
            columns,
            pending: Vec::new(),
        }
    }

    /// Add an order.
    ///
    /// Per-document output is written immediately and its path returned.
    /// Shared output is buffered until [`SpreadsheetWriter::finish`].
    pub fn add(&mut self, order: &Order) -> Result<Option<PathBuf>, ExportError> {
        let rows = records(order, self.columns);
        match self.config.mode {
            OutputMode::PerDocument => {
                let path = output_path(&self.config, order);
                write_records(&path, self.config.format, self.columns, &rows)?;
                Ok(Some(path))
            }
            OutputMode::Shared => {
                self.pending.extend(rows);
                Ok(None)
            }
        }
    }

    /// Write the shared spreadsheet, if any order was buffered.
    pub fn finish(self) -> Result<Option<PathBuf>, ExportError> {
        if self.config.mode != OutputMode::Shared || self.pending.is_empty() {
            return Ok(None);
        }
        let path = shared_path(&self.config);
        write_records(&path, self.config.format, self.columns, &self.pending)?;
        Ok(Some(path))
    }
}
