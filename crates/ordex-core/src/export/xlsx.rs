//! xlsx output.

use std::path::Path;

use rust_xlsxwriter::Workbook;

use super::{Columns, OutputRecord};
use crate::error::ExportError;

/// Write records to the first worksheet of a new workbook.
///
/// Quantities are numeric cells; a missing quantity leaves its cell blank.
pub fn write_xlsx(path: &Path, columns: Columns, records: &[OutputRecord]) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in columns.headers().into_iter().enumerate() {
        sheet.write_string(0, col as u16, header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &record.article_no)?;
        if let Some(qty) = record.quantity {
            sheet.write_number(row, 1, qty as f64)?;
        }
        sheet.write_string(row, 2, &record.rif)?;
        if columns.digit_warning && record.digit_warning {
            sheet.write_string(row, 3, record.digit_warning_text())?;
        }
    }

    workbook.save(path)?;
    Ok(())
}
