//! Error types for pdfaudit.

use std::io;
use thiserror::Error;

/// Result type alias for pdfaudit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an audit.
///
/// Problems inside an otherwise readable document (undecodable streams,
/// dangling references) are not errors; they surface as
/// [`AuditWarning`](crate::audit::AuditWarning)s on the report.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The parser could not read the document structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and could not be opened.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error while rendering a report.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
