//! Audit results.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::model::ObjectId;

use super::category::Category;

/// Non-fatal problem met while auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditWarning {
    /// An object stream's payload could not be decoded; its decoded size
    /// was taken as zero.
    DecodeFailed { id: ObjectId, reason: String },

    /// A structural entry referenced an object that does not exist.
    UnresolvedReference { id: ObjectId },
}

impl fmt::Display for AuditWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditWarning::DecodeFailed { id, reason } => {
                write!(f, "could not decode object stream {} R: {}", id, reason)
            }
            AuditWarning::UnresolvedReference { id } => {
                write!(f, "reference {} R does not resolve", id)
            }
        }
    }
}

/// Where one indirect object's bytes were counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribution {
    /// The object
    pub id: ObjectId,

    /// Category credited, `None` for objects marked evaluated without
    /// being counted (page dictionaries)
    pub category: Option<Category>,

    /// Bytes this claim added; zero for objects folded into `parent`
    pub bytes: i64,

    /// Claim whose deep size absorbed this object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectId>,
}

/// Category breakdown of one document.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Bytes per category, every category present
    pub(crate) categories: BTreeMap<Category, i64>,

    /// Highest object number enumerated
    pub highest_object_id: u32,

    /// Whether a cross-reference stream was found
    pub has_xref_stream: bool,

    pub(crate) warnings: Vec<AuditWarning>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) attributions: Vec<Attribution>,
}

impl AuditReport {
    /// Bytes attributed to a category.
    pub fn get(&self, category: Category) -> i64 {
        self.categories.get(&category).copied().unwrap_or(0)
    }

    pub fn total_file_size(&self) -> i64 {
        self.get(Category::TotalFileSize)
    }

    pub fn overhead(&self) -> i64 {
        self.get(Category::DocumentOverhead)
    }

    /// Every category with its byte count, in report order.
    pub fn categories(&self) -> impl Iterator<Item = (Category, i64)> + '_ {
        self.categories.iter().map(|(c, v)| (*c, *v))
    }

    /// Categories with a non-zero count, excluding the file size itself.
    pub fn non_zero(&self) -> impl Iterator<Item = (Category, i64)> + '_ {
        self.categories()
            .filter(|(c, v)| *c != Category::TotalFileSize && *v != 0)
    }

    /// Sum of every category except the file size. Equals the file size.
    pub fn accounted_total(&self) -> i64 {
        Category::accounted().map(|c| self.get(c)).sum()
    }

    /// Share of the file size taken by a category, in percent.
    pub fn percent_of_total(&self, category: Category) -> f64 {
        let total = self.total_file_size();
        if total == 0 {
            return 0.0;
        }
        self.get(category) as f64 * 100.0 / total as f64
    }

    pub fn warnings(&self) -> &[AuditWarning] {
        &self.warnings
    }

    /// Per-object attribution log, empty unless collection was enabled.
    pub fn attributions(&self) -> &[Attribution] {
        &self.attributions
    }

    /// Category that counted a given object, if any.
    pub fn category_of(&self, id: ObjectId) -> Option<Category> {
        self.attributions
            .iter()
            .find(|a| a.id == id)
            .and_then(|a| a.category)
    }
}
