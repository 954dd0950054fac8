//! File naming and decoding for the two downloads the workflow produces:
//! the blank upload template and the server's error log.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};

use crate::error::ExportError;
use crate::types::ExportedFile;

/// MIME type of both downloads.
pub const CSV_MIME: &str = "text/csv";

/// Decode the base64 error log returned with a validation failure.
///
/// Line breaks and other ASCII whitespace inside the payload are ignored.
pub fn decode_error_log(encoded: &str) -> Result<Vec<u8>, ExportError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}

/// Decode an error log and name it `bulk-upload-errors-<timestamp>.csv`.
pub fn error_log_file(encoded: &str, now: DateTime<Utc>) -> Result<ExportedFile, ExportError> {
    Ok(ExportedFile {
        file_name: format!("bulk-upload-errors-{}.csv", file_timestamp(now)),
        mime: CSV_MIME,
        bytes: decode_error_log(encoded)?,
    })
}

/// Wrap the server's template as `student-bulk-template-<date>.csv`.
pub fn template_file(bytes: Vec<u8>, now: DateTime<Utc>) -> ExportedFile {
    ExportedFile {
        file_name: format!("student-bulk-template-{}.csv", now.format("%Y-%m-%d")),
        mime: CSV_MIME,
        bytes,
    }
}

/// ISO 8601 UTC timestamp with `:` and `.` swapped for `-`, safe in file names.
fn file_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}
