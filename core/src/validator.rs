//! Client-side gate run before any upload.
//!
//! Cheap shape checks only: extension and size. Content validation is
//! the backend's job.

use crate::error::SelectionError;

/// Largest accepted upload, in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Required file extension, compared case-insensitively.
pub const CSV_EXTENSION: &str = ".csv";

/// Check a candidate file's name and size.
pub fn validate_file(name: &str, size: u64) -> Result<(), SelectionError> {
    if !has_csv_extension(name) {
        return Err(SelectionError::NotCsv(name.to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(SelectionError::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

fn has_csv_extension(name: &str) -> bool {
    let suffix_len = CSV_EXTENSION.len();
    name.len() >= suffix_len
        && name
            .get(name.len() - suffix_len..)
            .is_some_and(|suffix| suffix.eq_ignore_ascii_case(CSV_EXTENSION))
}
