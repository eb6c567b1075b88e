//! Filename conventions for order documents.
//!
//! Canonical documents are named `<order_number>_<YYYY-MM-DD>.pdf`. Files
//! exported from the ordering system arrive as space-separated names whose
//! second token ends in `-<order_number>` and whose last token is the date
//! as `DD-MM-YYYY`, e.g. `Ordine ACQ-4410 del 05-01-2024.pdf`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::InputError;
use crate::models::order::OrderHeader;

/// Length of `YYYY-MM-DD.pdf`.
const CANONICAL_DATE_SEGMENT_LEN: usize = 14;

/// Header parsed from a filename, plus whether it needs renaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    pub header: OrderHeader,
    /// The original name already follows the canonical convention.
    pub is_canonical: bool,
}

/// Parse a bare filename (no directory) under either naming convention.
pub fn parse_filename(filename: &str) -> Result<ParsedFilename, InputError> {
    let parts: Vec<&str> = filename.split('_').collect();
    if parts.len() == 2 && parts[1].chars().count() == CANONICAL_DATE_SEGMENT_LEN {
        let order_number = parse_order_number(filename, parts[0])?;
        let order_date = parse_date(filename, before_dot(parts[1]), "%Y-%m-%d")?;
        return Ok(ParsedFilename {
            header: OrderHeader {
                order_number,
                order_date,
                filename: filename.to_string(),
            },
            is_canonical: true,
        });
    }

    let tokens: Vec<&str> = filename.split(' ').collect();
    let number_token = tokens.get(1).ok_or_else(|| InputError::Filename {
        filename: filename.to_string(),
        reason: "expected at least two space-separated tokens".to_string(),
    })?;
    let order_number = parse_order_number(filename, number_token.rsplit('-').next().unwrap_or(""))?;
    let date_token = tokens.last().copied().unwrap_or("");
    let order_date = parse_date(filename, before_dot(date_token), "%d-%m-%Y")?;

    Ok(ParsedFilename {
        header: OrderHeader {
            order_number,
            order_date,
            filename: canonical_filename(order_number, order_date),
        },
        is_canonical: false,
    })
}

/// Canonical filename for an order.
pub fn canonical_filename(order_number: u64, order_date: NaiveDate) -> String {
    format!("{}_{}.pdf", order_number, order_date.format("%Y-%m-%d"))
}

/// Resolve a document path, renaming it to the canonical name when asked.
///
/// Returns the header and the path the document can be read from.
pub fn resolve(path: &Path, rename: bool) -> Result<(OrderHeader, PathBuf), InputError> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| InputError::NoFileName(path.display().to_string()))?;

    let parsed = parse_filename(filename)?;
    if parsed.is_canonical {
        debug!("{} is already canonical", filename);
        return Ok((parsed.header, path.to_path_buf()));
    }

    if !rename {
        debug!(
            "Leaving {} in place (canonical name would be {})",
            filename, parsed.header.filename
        );
        return Ok((parsed.header, path.to_path_buf()));
    }

    let target = path.with_file_name(&parsed.header.filename);
    if target.exists() {
        return Err(InputError::Rename {
            from: path.display().to_string(),
            to: target.display().to_string(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "target file exists"),
        });
    }
    fs::rename(path, &target).map_err(|source| InputError::Rename {
        from: path.display().to_string(),
        to: target.display().to_string(),
        source,
    })?;
    info!("Renamed {} -> {}", filename, parsed.header.filename);

    Ok((parsed.header, target))
}

fn before_dot(segment: &str) -> &str {
    segment.split('.').next().unwrap_or(segment)
}

fn parse_order_number(filename: &str, value: &str) -> Result<u64, InputError> {
    value.trim().parse().map_err(|_| InputError::Filename {
        filename: filename.to_string(),
        reason: format!("'{}' is not an order number", value),
    })
}

fn parse_date(filename: &str, value: &str, format: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(value, format).map_err(|e| InputError::Filename {
        filename: filename.to_string(),
        reason: format!("'{}' does not match {}: {}", value, format, e),
    })
}
