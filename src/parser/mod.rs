//! Document loading.

mod backend;
mod options;

pub use backend::{load_bytes, load_file};
pub use options::AuditOptions;
