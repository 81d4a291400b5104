//! Object model consumed by the audit engine.
//!
//! This module defines the typed view of a PDF's object graph. It is
//! independent of the parser that produced it, so documents can also be
//! assembled directly in memory.

mod document;
pub mod filter;
mod object;

pub use document::PdfDocument;
pub use filter::DecodeError;
pub use object::{Dictionary, Object, ObjectId, Stream};
