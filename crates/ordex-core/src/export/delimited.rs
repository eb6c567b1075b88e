//! CSV output.

use std::path::Path;

use super::{Columns, OutputRecord};
use crate::error::ExportError;

/// Write records as CSV with a header row.
pub fn write_csv(path: &Path, columns: Columns, records: &[OutputRecord]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(columns.headers())?;

    for record in records {
        let quantity = record.quantity.map(|q| q.to_string()).unwrap_or_default();
        let mut fields = vec![record.article_no.as_str(), quantity.as_str(), record.rif.as_str()];
        if columns.digit_warning {
            fields.push(record.digit_warning_text());
        }
        wtr.write_record(&fields)?;
    }

    wtr.flush()?;
    Ok(())
}
