//! Plain text rendering for audit reports.

use std::fmt::Write;

use crate::audit::{AuditReport, Category};

/// Render a report as one `<label>:\t<bytes>\t<percent>%` line per
/// non-zero category, in report order, ending with the file size.
pub fn to_text(report: &AuditReport) -> String {
    let mut output = String::new();
    for (category, bytes) in report.non_zero() {
        push_line(&mut output, report, category, bytes);
    }
    push_line(
        &mut output,
        report,
        Category::TotalFileSize,
        report.total_file_size(),
    );
    output
}

fn push_line(output: &mut String, report: &AuditReport, category: Category, bytes: i64) {
    // Writing to a String cannot fail.
    let _ = writeln!(
        output,
        "{}:\t{}\t{:.2}%",
        category.label(),
        bytes,
        report.percent_of_total(category)
    );
}
