//! Accounting categories and the running totals kept per category.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// A byte-accounting bucket.
///
/// Variants are declared in report order, so ordered maps keyed by
/// `Category` iterate the way reports are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Images,
    ContentStreams,
    XObjectForms,
    Fonts,
    ColorSpaces,
    ExtGraphicStates,
    PatternInfo,
    ShadingInfo,
    LinkAnnotations,
    CommentsAnd3D,
    AcrobatForms,
    PieceInfo,
    Thumbnails,
    WebCaptureInfo,
    StructureInfo,
    Bookmarks,
    NamedDestinations,
    EmbeddedFiles,
    DocumentOverhead,
    /// Stored size minus decoded size of object streams; may be negative.
    ObjectCompressionSavings,
    CrossReferenceTable,
    TotalFileSize,
}

impl Category {
    /// Every category, in report order.
    pub const ALL: [Category; 22] = [
        Category::Images,
        Category::ContentStreams,
        Category::XObjectForms,
        Category::Fonts,
        Category::ColorSpaces,
        Category::ExtGraphicStates,
        Category::PatternInfo,
        Category::ShadingInfo,
        Category::LinkAnnotations,
        Category::CommentsAnd3D,
        Category::AcrobatForms,
        Category::PieceInfo,
        Category::Thumbnails,
        Category::WebCaptureInfo,
        Category::StructureInfo,
        Category::Bookmarks,
        Category::NamedDestinations,
        Category::EmbeddedFiles,
        Category::DocumentOverhead,
        Category::ObjectCompressionSavings,
        Category::CrossReferenceTable,
        Category::TotalFileSize,
    ];

    /// Fixed label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::ContentStreams => "Content Streams",
            Category::XObjectForms => "XObject Forms",
            Category::Fonts => "Fonts",
            Category::ColorSpaces => "Color Spaces",
            Category::ExtGraphicStates => "Extended Graphic States",
            Category::PatternInfo => "Pattern Info",
            Category::ShadingInfo => "Shading Info",
            Category::LinkAnnotations => "Link Annotations",
            Category::CommentsAnd3D => "Comments and 3D Content",
            Category::AcrobatForms => "Acrobat Forms",
            Category::PieceInfo => "Piece Info",
            Category::Thumbnails => "Thumbnails",
            Category::WebCaptureInfo => "Web Capture Info",
            Category::StructureInfo => "Structure Info",
            Category::Bookmarks => "Bookmarks",
            Category::NamedDestinations => "Named Destinations",
            Category::EmbeddedFiles => "Embedded Files",
            Category::DocumentOverhead => "Document Overhead",
            Category::ObjectCompressionSavings => "Object Compression Savings",
            Category::CrossReferenceTable => "Cross Reference Table",
            Category::TotalFileSize => "Total File Size",
        }
    }

    /// Look a category up by its label.
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Categories whose sum must equal the file size: everything except
    /// the total itself.
    pub fn accounted() -> impl Iterator<Item = Category> {
        Category::ALL
            .into_iter()
            .filter(|c| *c != Category::TotalFileSize)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Running byte count per category for one audit.
#[derive(Debug, Clone)]
pub struct CategoryTracker {
    totals: BTreeMap<Category, i64>,
}

impl CategoryTracker {
    /// Open every category at zero and record the measured file size.
    pub fn new(file_size: u64) -> Self {
        let mut totals: BTreeMap<Category, i64> = Category::ALL.into_iter().map(|c| (c, 0)).collect();
        totals.insert(Category::TotalFileSize, file_size as i64);
        Self { totals }
    }

    /// Accumulate `delta` bytes (negative for compression savings).
    pub fn add(&mut self, category: Category, delta: i64) {
        *self.totals.entry(category).or_insert(0) += delta;
    }

    pub(crate) fn set(&mut self, category: Category, value: i64) {
        self.totals.insert(category, value);
    }

    pub fn get(&self, category: Category) -> i64 {
        self.totals.get(&category).copied().unwrap_or(0)
    }

    /// Sum of every category except the file size and the overhead bucket.
    pub fn attributed_total(&self) -> i64 {
        Category::accounted()
            .filter(|c| *c != Category::DocumentOverhead)
            .map(|c| self.get(c))
            .sum()
    }

    /// Read-only copy of the totals.
    pub fn snapshot(&self) -> BTreeMap<Category, i64> {
        self.totals.clone()
    }
}
