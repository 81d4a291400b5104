//! # pdfaudit
//!
//! Structural byte accounting for PDF files.
//!
//! This library attributes every byte of a PDF to a semantic category
//! (images, content streams, fonts, forms, annotations, structure info,
//! bookmarks, embedded files, cross-reference data, compression savings)
//! and reports the breakdown, with whatever cannot be attributed lumped
//! into a "Document Overhead" bucket.
//!
//! Sizes follow an approximate textual-encoding model. They are
//! reproducible across runs but are not the exact on-disk layout.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfaudit::{audit_file, render};
//!
//! fn main() -> pdfaudit::Result<()> {
//!     let report = audit_file("document.pdf")?;
//!     print!("{}", render::to_text(&report));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **At-most-once counting**: shared objects are attributed to the first
//!   structure that reaches them
//! - **Cycle safe**: parent back-links are never descended into
//! - **Reconciling totals**: categories always sum to the file size
//! - **Parallel batches**: uses Rayon to audit many files at once

pub mod audit;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use audit::{AuditReport, AuditWarning, Auditor, Category};
pub use detect::{is_pdf_bytes, sniff_bytes, sniff_path, PdfHeader};
pub use error::{Error, Result};
pub use model::{Dictionary, Object, ObjectId, PdfDocument, Stream};
pub use parser::AuditOptions;
pub use render::JsonFormat;

use std::path::{Path, PathBuf};

use rayon::prelude::*;

/// Audit a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfaudit::{audit_file, Category};
///
/// let report = audit_file("document.pdf").unwrap();
/// println!("Images: {}", report.get(Category::Images));
/// ```
pub fn audit_file<P: AsRef<Path>>(path: P) -> Result<AuditReport> {
    audit_file_with_options(path, &AuditOptions::default())
}

/// Audit a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfaudit::{audit_file_with_options, AuditOptions};
///
/// let options = AuditOptions::new().with_attributions(false);
/// let report = audit_file_with_options("document.pdf", &options).unwrap();
/// ```
pub fn audit_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &AuditOptions,
) -> Result<AuditReport> {
    let doc = parser::load_file(path, options)?;
    Ok(Auditor::new(options.clone()).audit(&doc))
}

/// Audit a PDF held in memory.
///
/// # Example
///
/// ```no_run
/// use pdfaudit::audit_bytes;
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let report = audit_bytes(&data).unwrap();
/// ```
pub fn audit_bytes(data: &[u8]) -> Result<AuditReport> {
    audit_bytes_with_options(data, &AuditOptions::default())
}

/// Audit a PDF held in memory with custom options.
pub fn audit_bytes_with_options(data: &[u8], options: &AuditOptions) -> Result<AuditReport> {
    let doc = parser::load_bytes(data, options)?;
    Ok(Auditor::new(options.clone()).audit(&doc))
}

/// Audit several files in parallel.
///
/// Results come back in input order. A failure on one file does not stop
/// the others.
pub fn audit_files<P: AsRef<Path> + Sync>(
    paths: &[P],
    options: &AuditOptions,
) -> Vec<(PathBuf, Result<AuditReport>)> {
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            (path.to_path_buf(), audit_file_with_options(path, options))
        })
        .collect()
}
