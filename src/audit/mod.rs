//! Structural byte accounting.
//!
//! An audit attributes every byte of a PDF to one of a fixed set of
//! [`Category`] buckets. It runs in a fixed order of passes over one
//! [`AuditSession`]:
//!
//! 1. the generic pass classifies every indirect object by role;
//! 2. catalog piece info and web capture info;
//! 3. pages, last page first (contents, resources, thumbnails);
//! 4. name trees, outlines, the interactive form and the structure tree;
//! 5. the cross-reference estimate and the overhead bucket.
//!
//! An object reachable from several structures is counted once, by the
//! first pass that reaches it.
//!
//! # Example
//!
//! ```no_run
//! use pdfaudit::audit::{Auditor, Category};
//! use pdfaudit::parser::{load_file, AuditOptions};
//!
//! let options = AuditOptions::default();
//! let doc = load_file("document.pdf", &options)?;
//! let report = Auditor::new(options).audit(&doc);
//! println!("fonts: {} bytes", report.get(Category::Fonts));
//! # Ok::<(), pdfaudit::Error>(())
//! ```

mod category;
mod finalize;
mod ledger;
mod processors;
mod report;
mod session;
mod sizer;
mod walker;

pub use category::{Category, CategoryTracker};
pub use finalize::XREF_ENTRY_SIZE;
pub use ledger::DedupLedger;
pub use report::{Attribution, AuditReport, AuditWarning};
pub use session::AuditSession;
pub use sizer::{is_back_edge, scalar_size, Container, BACK_EDGES};
pub use walker::{classify, Role};

use crate::model::PdfDocument;
use crate::parser::AuditOptions;

/// Runs audits with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Auditor {
    options: AuditOptions,
}

impl Auditor {
    pub fn new(options: AuditOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AuditOptions {
        &self.options
    }

    /// Audit one document. Every call uses a fresh session.
    pub fn audit(&self, doc: &PdfDocument) -> AuditReport {
        let mut session = AuditSession::new(doc, self.options.collect_attributions);

        session.walk();
        session.process_catalog();
        session.determine_xref_size();

        let report = session.finalize();
        log::debug!(
            "Audit done: {} of {} bytes attributed, {} warnings",
            report.total_file_size() - report.overhead(),
            report.total_file_size(),
            report.warnings().len()
        );
        report
    }
}
