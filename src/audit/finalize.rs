//! Closing steps of an audit: the cross-reference estimate and the
//! overhead bucket.

use super::category::Category;
use super::report::AuditReport;
use super::session::AuditSession;

/// Bytes per entry of a classic cross-reference table
/// (`nnnnnnnnnn ggggg n\r\n`).
pub const XREF_ENTRY_SIZE: i64 = 20;

impl<'a> AuditSession<'a> {
    /// Estimate the size of a classic cross-reference table when no
    /// cross-reference stream was counted.
    pub fn determine_xref_size(&mut self) {
        if self.has_xref_stream || self.tracker.get(Category::CrossReferenceTable) != 0 {
            return;
        }
        let estimate = XREF_ENTRY_SIZE * i64::from(self.highest_id);
        self.tracker.set(Category::CrossReferenceTable, estimate);
        log::debug!(
            "Estimated cross-reference table at {} bytes ({} entries)",
            estimate,
            self.highest_id
        );
    }

    /// Put every byte not attributed elsewhere into the overhead bucket and
    /// produce the report.
    pub fn finalize(mut self) -> AuditReport {
        let total = self.tracker.get(Category::TotalFileSize);
        let overhead = total - self.tracker.attributed_total();
        self.tracker.set(Category::DocumentOverhead, overhead);

        AuditReport {
            categories: self.tracker.snapshot(),
            highest_object_id: self.highest_id,
            has_xref_stream: self.has_xref_stream,
            attributions: self.take_attributions(),
            warnings: std::mem::take(&mut self.warnings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Object, ObjectId, PdfDocument};

    #[test]
    fn test_xref_fallback_uses_highest_id() {
        let mut doc = PdfDocument::new();
        doc.insert(ObjectId::new(42, 0), Object::Null);
        let mut session = AuditSession::new(&doc, false);
        session.walk();
        session.determine_xref_size();

        assert_eq!(session.tracker().get(Category::CrossReferenceTable), 840);
    }

    #[test]
    fn test_xref_stream_suppresses_estimate() {
        let doc = PdfDocument::new();
        let mut session = AuditSession::new(&doc, false);
        session.highest_id = 10;
        session.has_xref_stream = true;
        session.determine_xref_size();

        assert_eq!(session.tracker().get(Category::CrossReferenceTable), 0);
    }

    #[test]
    fn test_overhead_balances_total() {
        let mut doc = PdfDocument::new();
        doc.file_size = 1000;
        let mut session = AuditSession::new(&doc, false);
        session.tracker.add(Category::Images, 700);
        session.tracker.add(Category::ObjectCompressionSavings, -120);
        let report = session.finalize();

        assert_eq!(report.overhead(), 420);
        assert_eq!(report.accounted_total(), 1000);
    }

    #[test]
    fn test_overhead_may_go_negative() {
        let mut doc = PdfDocument::new();
        doc.file_size = 10;
        let mut session = AuditSession::new(&doc, false);
        session.tracker.add(Category::Fonts, 25);
        let report = session.finalize();

        assert_eq!(report.overhead(), -15);
        assert_eq!(report.accounted_total(), report.total_file_size());
    }
}
