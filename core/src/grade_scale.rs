//! Grade-scale range editor checks.
//!
//! A grade scale maps score bands on a 0–100 scale to grade labels
//! (`70–100 → A`, `60–69 → B`, ...). The backend replaces a scale's ranges
//! wholesale, so the whole set is checked locally first and nothing is sent
//! unless every range is sound.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::SchoolApi;
use crate::error::GradeScaleError;

/// Lowest score a range may start at.
pub const MIN_SCORE: f64 = 0.0;

/// Highest score a range may end at.
pub const MAX_SCORE: f64 = 100.0;

/// One score band. Both bounds are inclusive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradeRange {
    pub min: f64,
    pub max: f64,
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl GradeRange {
    pub fn new(min: f64, max: f64, grade: impl Into<String>) -> Self {
        Self {
            min,
            max,
            grade: grade.into(),
            remark: None,
        }
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    fn overlaps(&self, other: &GradeRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    fn is_well_formed(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min >= MIN_SCORE
            && self.max <= MAX_SCORE
            && self.min <= self.max
    }
}

/// A structural problem in a set of ranges. Positions are 1-based rows.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RangeIssue {
    #[error("A grade scale needs at least one range")]
    Empty,

    #[error("Row {row}: grade label is empty")]
    MissingGrade { row: usize },

    #[error("Row {row}: bounds must be numbers")]
    NotFinite { row: usize },

    #[error("Row {row}: {min}–{max} falls outside 0–100")]
    OutOfBounds { row: usize, min: f64, max: f64 },

    #[error("Row {row}: minimum {min} is above maximum {max}")]
    Inverted { row: usize, min: f64, max: f64 },

    #[error("Rows {first} and {second} both use grade \"{grade}\"")]
    DuplicateGrade {
        first: usize,
        second: usize,
        grade: String,
    },

    #[error("Rows {first} and {second} overlap")]
    Overlap { first: usize, second: usize },
}

/// Check every range and every pair of ranges.
///
/// On success returns the ranges ordered highest band first, the order
/// the backend stores them in. On failure returns all problems found.
pub fn validate_ranges(ranges: &[GradeRange]) -> Result<Vec<GradeRange>, Vec<RangeIssue>> {
    if ranges.is_empty() {
        return Err(vec![RangeIssue::Empty]);
    }

    let mut issues = Vec::new();

    for (i, range) in ranges.iter().enumerate() {
        let row = i + 1;
        if range.grade.trim().is_empty() {
            issues.push(RangeIssue::MissingGrade { row });
        }
        if !range.min.is_finite() || !range.max.is_finite() {
            issues.push(RangeIssue::NotFinite { row });
            continue;
        }
        if range.min < MIN_SCORE || range.max > MAX_SCORE {
            issues.push(RangeIssue::OutOfBounds {
                row,
                min: range.min,
                max: range.max,
            });
        }
        if range.min > range.max {
            issues.push(RangeIssue::Inverted {
                row,
                min: range.min,
                max: range.max,
            });
        }
    }

    for (i, a) in ranges.iter().enumerate() {
        for (j, b) in ranges.iter().enumerate().skip(i + 1) {
            let grade = a.grade.trim();
            if !grade.is_empty() && grade.eq_ignore_ascii_case(b.grade.trim()) {
                issues.push(RangeIssue::DuplicateGrade {
                    first: i + 1,
                    second: j + 1,
                    grade: grade.to_string(),
                });
            }
            // Only well-formed ranges are compared for overlap.
            if a.is_well_formed() && b.is_well_formed() && a.overlaps(b) {
                issues.push(RangeIssue::Overlap {
                    first: i + 1,
                    second: j + 1,
                });
            }
        }
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    let mut sorted: Vec<GradeRange> = ranges
        .iter()
        .map(|r| GradeRange {
            grade: r.grade.trim().to_string(),
            ..r.clone()
        })
        .collect();
    sorted.sort_by(|a, b| b.min.total_cmp(&a.min));
    Ok(sorted)
}

/// Validate, then replace the scale's ranges on the server.
///
/// Returns the server's message and the ranges as sent.
pub async fn save_grade_scale<A: SchoolApi>(
    api: &A,
    scale_id: &str,
    ranges: &[GradeRange],
) -> Result<(String, Vec<GradeRange>), GradeScaleError> {
    if scale_id.trim().is_empty() {
        return Err(GradeScaleError::MissingScale);
    }
    let sorted = validate_ranges(ranges).map_err(GradeScaleError::Invalid)?;
    log::info!("Saving {} ranges to grade scale {}", sorted.len(), scale_id);
    let message = api.replace_grade_scale(scale_id, &sorted).await?;
    Ok((message, sorted))
}
