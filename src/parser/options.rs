//! Audit options and configuration.

/// Options controlling how a document is loaded and audited.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// User password for encrypted documents
    pub password: Option<String>,

    /// Owner password for encrypted documents
    pub owner_password: Option<String>,

    /// Record which category every attributed object landed in
    pub collect_attributions: bool,

    /// Use this file size instead of the measured input length
    pub file_size: Option<u64>,
}

impl AuditOptions {
    /// Create new audit options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the owner password.
    pub fn with_owner_password(mut self, password: impl Into<String>) -> Self {
        self.owner_password = Some(password.into());
        self
    }

    /// Enable or disable the per-object attribution log.
    pub fn with_attributions(mut self, collect: bool) -> Self {
        self.collect_attributions = collect;
        self
    }

    /// Override the total file size used for the report.
    pub fn with_file_size(mut self, size: u64) -> Self {
        self.file_size = Some(size);
        self
    }

    /// True if any password was supplied.
    pub fn has_password(&self) -> bool {
        self.password.is_some() || self.owner_password.is_some()
    }
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            password: None,
            owner_password: None,
            collect_attributions: true,
            file_size: None,
        }
    }
}
