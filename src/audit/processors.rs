//! Targeted passes over document structures the generic pass cannot
//! attribute on its own: pages, resources, name trees, outlines, forms,
//! the structure tree and the various page-piece dictionaries.
//!
//! Every processor goes through the session's claim methods, so objects
//! already counted by an earlier pass are skipped transparently.

use std::collections::HashSet;

use crate::model::{Dictionary, Object, ObjectId};

use super::category::Category;
use super::session::AuditSession;

/// Resource types routed to their own category, in claim order. A
/// shading or color space reached from a pattern or graphics state stays
/// with its own category.
const RESOURCE_ROUTES: &[(&[u8], Category)] = &[
    (b"Font", Category::Fonts),
    (b"Shading", Category::ShadingInfo),
    (b"Pattern", Category::PatternInfo),
    (b"ColorSpace", Category::ColorSpaces),
    (b"ExtGState", Category::ExtGraphicStates),
];

/// Name trees under the catalog's `/Names`, in claim order, with their
/// category and whether values are sized deeply.
const NAME_TREES: &[(&[u8], Category, bool)] = &[
    (b"URLS", Category::WebCaptureInfo, true),
    (b"IDS", Category::WebCaptureInfo, true),
    (b"EmbeddedFiles", Category::EmbeddedFiles, true),
    (b"Dests", Category::NamedDestinations, false),
];

impl<'a> AuditSession<'a> {
    /// Route a resource dictionary's font, color space, pattern, shading
    /// and graphics-state entries to their categories.
    ///
    /// An indirect sub-dictionary is claimed as a whole; a direct one has
    /// each of its indirect entries claimed individually.
    pub fn route_resources(&mut self, resources: &Object) {
        let doc = self.doc;
        let Some(resources) = doc.resolve_dict(resources) else {
            return;
        };

        for &(key, category) in RESOURCE_ROUTES {
            match resources.get(key) {
                Some(Object::Reference(id)) => self.claim(*id, category, true),
                Some(Object::Dictionary(entries)) => {
                    for (_, entry) in entries.iter() {
                        if let Object::Reference(id) = entry {
                            self.claim(*id, category, true);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Attribute a page's contents, resources, thumbnail and piece info,
    /// then mark the page dictionary itself as evaluated.
    pub fn process_page(&mut self, page: ObjectId) {
        let doc = self.doc;
        let Some(dict) = doc.get(page).and_then(|p| doc.resolve_dict(p)) else {
            return;
        };

        if let Some(contents) = dict.get(b"Contents") {
            self.claim_object(contents, Category::ContentStreams, true);
        }
        if let Some(resources) = dict.get(b"Resources") {
            self.route_resources(resources);
        }
        if let Some(thumb) = dict.get(b"Thumb") {
            self.claim_object(thumb, Category::Thumbnails, false);
        }
        self.process_piece_info(dict);

        self.mark_evaluated(page);
    }

    /// Every page, last page first.
    pub fn process_pages(&mut self) {
        let doc = self.doc;
        let pages = doc.pages();
        for &page in pages.iter().rev() {
            self.process_page(page);
        }
        log::debug!("Processed {} pages", pages.len());
    }

    /// `/PieceInfo` of a page, form or catalog.
    pub fn process_piece_info(&mut self, owner: &Dictionary) {
        if let Some(piece_info) = owner.get(b"PieceInfo") {
            self.claim_object(piece_info, Category::PieceInfo, true);
        }
    }

    /// `/SpiderInfo` of the catalog (web capture).
    pub fn process_spider_info(&mut self, owner: &Dictionary) {
        if let Some(spider_info) = owner.get(b"SpiderInfo") {
            self.claim_object(spider_info, Category::WebCaptureInfo, true);
        }
    }

    /// Walk the name trees under the catalog's `/Names` dictionary. Each
    /// entry adds its key bytes plus its value to the tree's category.
    pub fn process_name_trees(&mut self, names: &Object) {
        let doc = self.doc;
        let Some(names) = doc.resolve_dict(names) else {
            return;
        };

        for &(tree, category, descend) in NAME_TREES {
            let Some(root) = names.get(tree) else {
                continue;
            };
            let entries = doc.name_tree_entries(root);
            log::trace!(
                "Name tree {}: {} entries",
                String::from_utf8_lossy(tree),
                entries.len()
            );
            for (key, value) in entries {
                self.tracker.add(category, key.len() as i64);
                self.claim_object(value, category, descend);
            }
        }
    }

    /// Walk the outline tree through `/First` and `/Next`, counting each
    /// node's own dictionary.
    pub fn process_bookmarks(&mut self, outlines: &Object) {
        let doc = self.doc;
        let mut visited: HashSet<ObjectId> = HashSet::new();
        let mut pending: Vec<&Object> = vec![outlines];
        let mut nodes = 0usize;

        while let Some(node) = pending.pop() {
            if let Object::Reference(id) = node {
                if !visited.insert(*id) {
                    continue;
                }
            }
            let Some(dict) = doc.resolve_dict(node) else {
                continue;
            };

            self.claim_object(node, Category::Bookmarks, false);
            nodes += 1;

            // Siblings after the subtree.
            if let Some(next) = dict.get(b"Next") {
                pending.push(next);
            }
            if let Some(first) = dict.get(b"First") {
                pending.push(first);
            }
        }

        log::debug!("Counted {} outline nodes", nodes);
    }

    /// Route the form's default resources, then claim the form dictionary
    /// and everything reachable from it.
    pub fn process_acroform(&mut self, acroform: &Object) {
        let doc = self.doc;
        let Some(dict) = doc.resolve_dict(acroform) else {
            return;
        };
        if let Some(resources) = dict.get(b"DR") {
            self.route_resources(resources);
        }
        self.claim_object(acroform, Category::AcrobatForms, true);
    }

    /// Claim the structure tree root and everything reachable from it.
    pub fn process_struct_tree(&mut self, root: &Object) {
        self.claim_object(root, Category::StructureInfo, true);
    }

    /// A file attachment annotation: its embedded file stream goes to
    /// embedded files, the annotation itself to comments.
    pub fn process_file_attachment(&mut self, id: ObjectId, annotation: &Dictionary) {
        let doc = self.doc;
        let embedded = annotation
            .get(b"FS")
            .and_then(|fs| doc.resolve_dict(fs))
            .and_then(|fs| fs.get(b"EF"))
            .and_then(|ef| doc.resolve_dict(ef))
            .and_then(|ef| ef.get(b"F"));

        if let Some(file) = embedded {
            self.claim_object(file, Category::EmbeddedFiles, true);
        }
        self.claim(id, Category::CommentsAnd3D, true);
    }

    /// Catalog-level passes, in their fixed order.
    pub fn process_catalog(&mut self) {
        let doc = self.doc;
        let Some(catalog) = doc.catalog() else {
            log::debug!("No catalog; skipping structural passes");
            return;
        };

        self.process_piece_info(catalog);
        self.process_spider_info(catalog);
        self.process_pages();

        if let Some(names) = catalog.get(b"Names") {
            self.process_name_trees(names);
        }
        if let Some(outlines) = catalog.get(b"Outlines") {
            self.process_bookmarks(outlines);
        }
        if let Some(acroform) = catalog.get(b"AcroForm") {
            self.process_acroform(acroform);
        }
        if let Some(struct_tree) = catalog.get(b"StructTreeRoot") {
            self.process_struct_tree(struct_tree);
        }
    }
}
