//! PDF header sniffing.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Readers tolerate leading garbage before the header, up to this many bytes.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Information taken from the file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
    /// Byte offset of `%PDF-` in the file
    pub offset: usize,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Read the header of a file on disk.
pub fn sniff_path<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let file = File::open(path)?;
    let mut head = Vec::with_capacity(HEADER_SEARCH_WINDOW + PDF_MAGIC.len() + VERSION_LEN);
    file.take((HEADER_SEARCH_WINDOW + PDF_MAGIC.len() + VERSION_LEN) as u64)
        .read_to_end(&mut head)?;
    sniff_bytes(&head)
}

/// Locate and validate the `%PDF-x.y` header.
///
/// # Returns
/// * `Err(Error::UnknownFormat)` when no header is found in the search window
/// * `Err(Error::UnsupportedVersion)` when the version is not `d.d`
pub fn sniff_bytes(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW + PDF_MAGIC.len())];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let start = offset + PDF_MAGIC.len();
    let version_bytes = data
        .get(start..start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(version_bytes) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version, offset })
}

fn is_valid_version(version: &[u8]) -> bool {
    matches!(version, [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit())
}

/// Check if bytes start with a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    sniff_bytes(data).is_ok()
}
