//! Document-level types.

use std::collections::{BTreeMap, HashSet};

use super::object::{Dictionary, Object, ObjectId};

/// A parsed PDF document: the indirect-object table plus trailer.
#[derive(Debug, Clone, Default)]
pub struct PdfDocument {
    /// Indirect objects, enumerated in ascending id order
    objects: BTreeMap<ObjectId, Object>,

    /// Trailer dictionary
    pub trailer: Dictionary,

    /// Measured size of the source file in bytes
    pub file_size: u64,

    /// PDF version from the header (e.g., "1.7")
    pub version: String,
}

impl PdfDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an indirect object, replacing any previous definition.
    pub fn insert(&mut self, id: ObjectId, object: impl Into<Object>) {
        self.objects.insert(id, object.into());
    }

    /// Store an object under the next free object number.
    pub fn add_object(&mut self, object: impl Into<Object>) -> ObjectId {
        let id = ObjectId::new(self.max_object_number() + 1, 0);
        self.insert(id, object);
        id
    }

    /// Look up an indirect object.
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    /// Enumerate every indirect object in table order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects.iter().map(|(id, obj)| (*id, obj))
    }

    /// Number of indirect objects in the table.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Highest object number present in the table.
    pub fn max_object_number(&self) -> u32 {
        self.objects.keys().next_back().map_or(0, |id| id.number)
    }

    /// Follow a reference to its target. Direct objects resolve to
    /// themselves; dangling references resolve to `None`.
    pub fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        let mut current = object;
        // Reference chains are legal but short; bound them anyway.
        for _ in 0..32 {
            match current {
                Object::Reference(id) => current = self.get(*id)?,
                other => return Some(other),
            }
        }
        None
    }

    /// Resolve an object and view it as a dictionary. Streams expose their
    /// dictionary.
    pub fn resolve_dict<'a>(&'a self, object: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(object)? {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    /// The document catalog (`/Root` in the trailer).
    pub fn catalog(&self) -> Option<&Dictionary> {
        self.resolve_dict(self.trailer.get(b"Root")?)
    }

    /// Page dictionaries in document order, by walking the page tree.
    pub fn pages(&self) -> Vec<ObjectId> {
        let mut pages = Vec::new();
        let Some(root) = self.catalog().and_then(|c| c.get(b"Pages")) else {
            return pages;
        };

        let mut visited = HashSet::new();
        let mut stack: Vec<&Object> = vec![root];
        while let Some(node) = stack.pop() {
            let Some(id) = node.as_reference() else {
                continue;
            };
            if !visited.insert(id) {
                continue;
            }
            let Some(dict) = self.resolve_dict(node) else {
                continue;
            };

            match dict.get(b"Kids").and_then(|k| self.resolve(k)) {
                Some(Object::Array(kids)) if !dict.type_is(b"Page") => {
                    // Push in reverse so pages pop in document order.
                    stack.extend(kids.iter().rev());
                }
                _ => pages.push(id),
            }
        }

        pages
    }

    /// Number of pages reachable from the page tree.
    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// Flatten a name tree into its (key, value) leaf entries, in tree
    /// order. Values are returned as stored: references stay references.
    pub fn name_tree_entries<'a>(&'a self, root: &'a Object) -> Vec<(&'a [u8], &'a Object)> {
        let mut entries = Vec::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<&Object> = vec![root];

        while let Some(node) = stack.pop() {
            if let Some(id) = node.as_reference() {
                if !visited.insert(id) {
                    continue;
                }
            }
            let Some(dict) = self.resolve_dict(node) else {
                continue;
            };

            if let Some(Object::Array(names)) = dict.get(b"Names").and_then(|n| self.resolve(n)) {
                for pair in names.chunks_exact(2) {
                    if let Object::String(key) = &pair[0] {
                        entries.push((key.as_slice(), &pair[1]));
                    }
                }
            }

            if let Some(Object::Array(kids)) = dict.get(b"Kids").and_then(|k| self.resolve(k)) {
                stack.extend(kids.iter().rev());
            }
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Object {
        Object::name(n)
    }

    fn doc_with_pages(page_count: usize) -> PdfDocument {
        let mut doc = PdfDocument::new();
        let pages_id = ObjectId::new(1, 0);
        let mut kids = Vec::new();
        for i in 0..page_count {
            let page_id = ObjectId::new(10 + i as u32, 0);
            doc.insert(
                page_id,
                Dictionary::new()
                    .with("Type", name("Page"))
                    .with("Parent", pages_id),
            );
            kids.push(Object::Reference(page_id));
        }
        doc.insert(
            pages_id,
            Dictionary::new()
                .with("Type", name("Pages"))
                .with("Kids", kids)
                .with("Count", page_count as i64),
        );
        let catalog = doc.add_object(
            Dictionary::new()
                .with("Type", name("Catalog"))
                .with("Pages", pages_id),
        );
        doc.trailer.set("Root", catalog);
        doc
    }

    #[test]
    fn test_pages_in_order() {
        let doc = doc_with_pages(3);
        let pages = doc.pages();
        assert_eq!(
            pages,
            vec![ObjectId::new(10, 0), ObjectId::new(11, 0), ObjectId::new(12, 0)]
        );
    }

    #[test]
    fn test_page_tree_cycle_terminates() {
        let mut doc = doc_with_pages(1);
        // Make the page tree point back at itself.
        doc.insert(
            ObjectId::new(1, 0),
            Dictionary::new()
                .with("Type", name("Pages"))
                .with(
                    "Kids",
                    vec![Object::Reference(ObjectId::new(1, 0)), Object::Reference(ObjectId::new(10, 0))],
                ),
        );
        assert_eq!(doc.pages(), vec![ObjectId::new(10, 0)]);
    }

    #[test]
    fn test_resolve_dangling_reference() {
        let doc = PdfDocument::new();
        assert!(doc.resolve(&Object::Reference(ObjectId::new(99, 0))).is_none());
        assert_eq!(doc.resolve(&Object::Integer(3)), Some(&Object::Integer(3)));
    }

    #[test]
    fn test_name_tree_entries_with_kids() {
        let mut doc = PdfDocument::new();
        let leaf_a = doc.add_object(Dictionary::new().with(
            "Names",
            vec![Object::string("a"), Object::Integer(1), Object::string("b"), Object::Integer(2)],
        ));
        let leaf_b = doc.add_object(
            Dictionary::new().with("Names", vec![Object::string("c"), Object::Integer(3)]),
        );
        let root = Object::Dictionary(
            Dictionary::new().with("Kids", vec![Object::Reference(leaf_a), Object::Reference(leaf_b)]),
        );

        let keys: Vec<&[u8]> = doc.name_tree_entries(&root).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"a".as_slice(), b"b".as_slice(), b"c".as_slice()]);
    }
}
