//! Terminal rendering of notices, previews, row errors and grade scales.

use std::io::{self, Write};

use enrol_core::{GradeRange, Notice, PreviewBatch, RangeIssue, ValidationFailure};

pub fn write_notice(out: &mut impl Write, notice: &Notice) -> io::Result<()> {
    writeln!(out, "{}", notice)
}

/// Preview rows as a table, followed by the batch summary and expiry.
pub fn write_preview(out: &mut impl Write, batch: &PreviewBatch) -> io::Result<()> {
    let rows: Vec<[String; 5]> = batch
        .preview_rows
        .iter()
        .map(|row| {
            [
                cell(&row.name),
                cell(&row.admission_no),
                cell(&row.session),
                row.placement(),
                cell(&row.parent_email),
            ]
        })
        .collect();
    write_table(
        out,
        ["Name", "Admission No", "Session", "Class", "Parent email"],
        &rows,
    )?;

    if let Some(summary) = &batch.summary {
        if summary.total_rows > batch.preview_rows.len() as u64 {
            writeln!(
                out,
                "   ... showing {} of {} rows",
                batch.preview_rows.len(),
                summary.total_rows
            )?;
        }
        writeln!(
            out,
            "📊 {} rows • {} session(s) • {} class(es)",
            summary.total_rows, summary.sessions, summary.classes
        )?;
    }
    writeln!(out, "   Batch: {}", batch.batch_id)?;
    if let Some(expires_at) = batch.expires_at {
        writeln!(out, "   Expires: {}", expires_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    }
    Ok(())
}

/// Per-cell validation errors, or a note when the server sent none.
pub fn write_row_errors(out: &mut impl Write, failure: &ValidationFailure) -> io::Result<()> {
    if failure.errors.is_empty() {
        return writeln!(out, "   (no row-level details were returned)");
    }
    let rows: Vec<[String; 3]> = failure
        .errors
        .iter()
        .map(|e| [e.row.to_string(), e.column.clone(), e.message.clone()])
        .collect();
    write_table(out, ["Row", "Column", "Problem"], &rows)
}

pub fn write_ranges(out: &mut impl Write, ranges: &[GradeRange]) -> io::Result<()> {
    let rows: Vec<[String; 4]> = ranges
        .iter()
        .map(|r| {
            [
                r.grade.clone(),
                r.min.to_string(),
                r.max.to_string(),
                cell(&r.remark),
            ]
        })
        .collect();
    write_table(out, ["Grade", "Min", "Max", "Remark"], &rows)
}

pub fn write_issues(out: &mut impl Write, issues: &[RangeIssue]) -> io::Result<()> {
    for issue in issues {
        writeln!(out, "   - {}", issue)?;
    }
    Ok(())
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn write_table<const N: usize>(
    out: &mut impl Write,
    headers: [&str; N],
    rows: &[[String; N]],
) -> io::Result<()> {
    let mut widths = headers.map(|h| h.chars().count());
    for row in rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(value, width)| format!("{:<width$}", value, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "   {}", line(headers.to_vec()))?;
    for row in rows {
        writeln!(out, "   {}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}
