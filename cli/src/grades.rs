//! Grade scale files.
//!
//! A scale is a CSV with a header row: `min,max,grade` and an optional
//! `remark` column. Blank remarks are dropped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use enrol_core::GradeRange;

use crate::error::CliResult;

/// Read ranges from any CSV source.
pub fn read_ranges<R: Read>(reader: R) -> CliResult<Vec<GradeRange>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut ranges = Vec::new();
    for record in reader.deserialize::<GradeRange>() {
        let mut range = record?;
        range.remark = range.remark.filter(|r| !r.trim().is_empty());
        ranges.push(range);
    }
    Ok(ranges)
}

/// Read ranges from a file on disk.
pub fn read_ranges_file(path: &Path) -> CliResult<Vec<GradeRange>> {
    read_ranges(File::open(path)?)
}
