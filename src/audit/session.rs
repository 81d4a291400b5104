//! State shared by every pass of one audit.

use crate::model::{Object, ObjectId, PdfDocument};

use super::category::{Category, CategoryTracker};
use super::ledger::DedupLedger;
use super::report::{Attribution, AuditWarning};

/// The claim currently being sized: objects absorbed by a deep descent are
/// credited to it.
#[derive(Debug, Clone, Copy)]
struct ClaimContext {
    category: Category,
    root: Option<ObjectId>,
}

/// Mutable state of a single audit run.
///
/// Owns the category totals and the dedup ledger; every pass borrows the
/// session mutably, so passes run strictly one after another. Independent
/// documents get independent sessions.
pub struct AuditSession<'a> {
    pub(crate) doc: &'a PdfDocument,
    pub(crate) tracker: CategoryTracker,
    pub(crate) ledger: DedupLedger,
    pub(crate) highest_id: u32,
    pub(crate) has_xref_stream: bool,
    pub(crate) warnings: Vec<AuditWarning>,
    attributions: Option<Vec<Attribution>>,
    context: Option<ClaimContext>,
}

impl<'a> AuditSession<'a> {
    /// Start an audit of `doc`.
    pub fn new(doc: &'a PdfDocument, collect_attributions: bool) -> Self {
        Self {
            doc,
            tracker: CategoryTracker::new(doc.file_size),
            ledger: DedupLedger::new(),
            highest_id: 0,
            has_xref_stream: false,
            warnings: Vec::new(),
            attributions: collect_attributions.then(Vec::new),
            context: None,
        }
    }

    pub fn tracker(&self) -> &CategoryTracker {
        &self.tracker
    }

    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    /// Credit `size` bytes of object `id` to `category`, unless the object
    /// was already counted.
    pub fn attribute(&mut self, id: ObjectId, category: Category, size: i64) {
        if !self.ledger.insert(id) {
            return;
        }
        self.credit(id, category, size);
    }

    /// Size indirect object `id` and credit it to `category`, unless it was
    /// already counted. The ledger is consulted before sizing, so a claim
    /// that loses the race never marks the object's descendants.
    pub fn claim(&mut self, id: ObjectId, category: Category, descend: bool) {
        if self.ledger.contains(id) {
            return;
        }
        if self.doc.get(id).is_none() {
            self.warn(AuditWarning::UnresolvedReference { id });
            return;
        }
        self.ledger.insert(id);

        let outer = self.context.replace(ClaimContext {
            category,
            root: Some(id),
        });
        let size = self.size_indirect(id, descend);
        self.context = outer;

        self.credit(id, category, size);
    }

    /// Claim an object found inline in a structure: references are claimed
    /// by id, direct objects are sized in place and added to the category.
    pub fn claim_object(&mut self, object: &Object, category: Category, descend: bool) {
        match object {
            Object::Reference(id) => self.claim(*id, category, descend),
            direct => self.add_sized(direct, category, descend),
        }
    }

    /// Size a direct object and add it to `category` without touching the
    /// ledger for the object itself.
    pub fn add_sized(&mut self, object: &Object, category: Category, descend: bool) {
        let outer = self.context.replace(ClaimContext {
            category,
            root: None,
        });
        let size = self.size(object, descend);
        self.context = outer;

        self.tracker.add(category, size);
        log::trace!("{} += {} (inline {})", category, size, object.kind());
    }

    /// Mark an object as evaluated without crediting any category.
    pub fn mark_evaluated(&mut self, id: ObjectId) {
        if self.ledger.insert(id) {
            self.log_attribution(id, None, 0, None);
        }
    }

    /// Called by the sizer when a deep descent absorbs `id` into the
    /// current claim.
    pub(crate) fn absorbed(&mut self, id: ObjectId) {
        let (category, parent) = match self.context {
            Some(ctx) => (Some(ctx.category), ctx.root),
            None => (None, None),
        };
        self.log_attribution(id, category, 0, parent);
    }

    pub(crate) fn warn(&mut self, warning: AuditWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn credit(&mut self, id: ObjectId, category: Category, size: i64) {
        self.tracker.add(category, size);
        log::trace!("{} += {} ({} R)", category, size, id);
        self.log_attribution(id, Some(category), size, None);
    }

    fn log_attribution(
        &mut self,
        id: ObjectId,
        category: Option<Category>,
        bytes: i64,
        parent: Option<ObjectId>,
    ) {
        if let Some(log) = self.attributions.as_mut() {
            log.push(Attribution {
                id,
                category,
                bytes,
                parent,
            });
        }
    }

    pub(crate) fn take_attributions(&mut self) -> Vec<Attribution> {
        self.attributions.take().unwrap_or_default()
    }
}
