//! Approximate serialized size of objects.
//!
//! Sizes follow a simple textual-encoding model (`true` is 4 bytes, a
//! reference is `id gen R`, a stream adds `stream`/`endstream`, ...). They
//! are reproducible, not byte-exact.

use crate::model::{Dictionary, Object, ObjectId};

use super::session::AuditSession;

/// `[` `]` plus a separator.
const ARRAY_OVERHEAD: i64 = 3;
/// `<<` `>>`.
const DICT_OVERHEAD: i64 = 4;
/// `stream\n` ... `\nendstream`.
const STREAM_OVERHEAD: i64 = 17;

/// Which dictionary a key lives in, for back-edge matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// A plain dictionary object
    Dictionary,
    /// The dictionary of a stream
    StreamDictionary,
}

/// Keys that point back toward an ancestor: page tree and outline
/// `/Parent`, structure element and annotation `/P`. Values behind these
/// keys are sized as reference tokens only, never descended into.
pub const BACK_EDGES: &[(Container, &[u8])] = &[
    (Container::Dictionary, b"Parent"),
    (Container::Dictionary, b"P"),
    (Container::StreamDictionary, b"Parent"),
    (Container::StreamDictionary, b"P"),
];

/// True if `key` inside a `container` is a back-edge.
pub fn is_back_edge(container: Container, key: &[u8]) -> bool {
    BACK_EDGES.iter().any(|&(c, k)| c == container && k == key)
}

fn decimal_len(value: u64) -> i64 {
    value.to_string().len() as i64
}

/// Length of the `id gen R` token.
pub fn reference_len(id: ObjectId) -> i64 {
    decimal_len(id.number as u64) + 1 + decimal_len(id.generation as u64) + 2
}

/// Length of the `id gen obj ` header of an indirect definition.
pub fn header_len(id: ObjectId) -> i64 {
    decimal_len(id.number as u64) + 1 + decimal_len(id.generation as u64) + 5
}

/// Size of a scalar. Returns `None` for composites and references.
pub fn scalar_size(object: &Object) -> Option<i64> {
    let size = match object {
        Object::Null => 0,
        Object::Boolean(true) => 4,
        Object::Boolean(false) => 5,
        Object::Integer(i) => i.to_string().len() as i64,
        Object::Real(r) => format!("{:.5}", r).len() as i64,
        // Escapes and non-ASCII names are not accounted for.
        Object::Name(name) => name.len() as i64 + 1,
        Object::String(bytes) => bytes.len() as i64,
        Object::Array(_) | Object::Dictionary(_) | Object::Stream(_) | Object::Reference(_) => {
            return None
        }
    };
    Some(size)
}

impl<'a> AuditSession<'a> {
    /// Size of `object`. With `descend`, references to objects not yet in
    /// the ledger also add the referenced object's full size; each
    /// referenced id is entered in the ledger when first seen.
    ///
    /// Referenced objects are sized from a worklist, so long reference
    /// chains do not grow the stack.
    pub fn size(&mut self, object: &Object, descend: bool) -> i64 {
        let mut pending = Vec::new();
        let mut size = self.size_body(object, descend, &mut pending);

        let doc = self.doc;
        while let Some(id) = pending.pop() {
            match doc.get(id) {
                Some(target) => size += header_len(id) + self.size_body(target, true, &mut pending),
                None => log::debug!("Skipping size of missing object {} R", id),
            }
        }
        size
    }

    /// Size of the indirect object `id` as defined in the file: its
    /// `id gen obj ` header plus its body. Unresolvable ids size to zero.
    pub fn size_indirect(&mut self, id: ObjectId, descend: bool) -> i64 {
        let doc = self.doc;
        match doc.get(id) {
            Some(object) => header_len(id) + self.size(object, descend),
            None => {
                log::debug!("Skipping size of missing object {} R", id);
                0
            }
        }
    }

    /// Size of one object without the targets of its references; targets
    /// to descend into are queued on `pending`.
    fn size_body(&mut self, object: &Object, descend: bool, pending: &mut Vec<ObjectId>) -> i64 {
        if let Some(size) = scalar_size(object) {
            return size;
        }
        match object {
            Object::Array(items) => {
                let mut size = ARRAY_OVERHEAD;
                for item in items {
                    size += self.size_entry(item, descend, pending);
                }
                size
            }
            Object::Dictionary(dict) => {
                self.size_dict(dict, Container::Dictionary, descend, pending)
            }
            Object::Stream(stream) => {
                STREAM_OVERHEAD
                    + self.size_dict(&stream.dict, Container::StreamDictionary, descend, pending)
                    + stream.raw_len() as i64
            }
            Object::Reference(id) => {
                self.queue(*id, descend, pending);
                reference_len(*id)
            }
            _ => 0,
        }
    }

    fn size_dict(
        &mut self,
        dict: &Dictionary,
        container: Container,
        descend: bool,
        pending: &mut Vec<ObjectId>,
    ) -> i64 {
        let mut size = DICT_OVERHEAD;
        for (key, value) in dict.iter() {
            size += key.len() as i64 + 1;
            let follow = descend && !is_back_edge(container, key);
            size += self.size_entry(value, follow, pending);
        }
        size
    }

    /// An array element or dictionary value: references cost their token
    /// (plus the target when descending), direct values cost their size
    /// plus one separator.
    fn size_entry(&mut self, value: &Object, descend: bool, pending: &mut Vec<ObjectId>) -> i64 {
        match value {
            Object::Reference(id) => {
                self.queue(*id, descend, pending);
                reference_len(*id)
            }
            direct => self.size_body(direct, descend, pending) + 1,
        }
    }

    fn queue(&mut self, id: ObjectId, descend: bool, pending: &mut Vec<ObjectId>) {
        if descend && self.ledger.insert(id) {
            self.absorbed(id);
            pending.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PdfDocument, Stream};

    fn sized(object: &Object) -> i64 {
        let doc = PdfDocument::new();
        let mut session = AuditSession::new(&doc, false);
        session.size(object, true)
    }

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(sized(&Object::Null), 0);
        assert_eq!(sized(&Object::Boolean(true)), 4);
        assert_eq!(sized(&Object::Boolean(false)), 5);
        assert_eq!(sized(&Object::Integer(12345)), 5);
        assert_eq!(sized(&Object::Integer(-7)), 2);
        assert_eq!(sized(&Object::Real(1.0)), 7);
        assert_eq!(sized(&Object::Real(-0.5)), 8);
        assert_eq!(sized(&Object::name("Font")), 5);
        assert_eq!(sized(&Object::string("abc")), 3);
    }

    #[test]
    fn test_direct_array() {
        // 3 + (1+1) + (4+1)
        let array = Object::Array(vec![Object::Integer(1), Object::Boolean(true)]);
        assert_eq!(sized(&array), 10);
    }

    #[test]
    fn test_direct_dictionary() {
        // 4 + "/Type"(5) + "/Font"(5) + 1
        let dict = Object::Dictionary(Dictionary::new().with("Type", Object::name("Font")));
        assert_eq!(sized(&dict), 15);
    }

    #[test]
    fn test_stream_size() {
        // 17 + empty dict 4 + payload 10
        let stream = Object::Stream(Stream::new(Dictionary::new(), vec![0; 10]));
        assert_eq!(sized(&stream), 31);
    }

    #[test]
    fn test_reference_token_lengths() {
        assert_eq!(reference_len(ObjectId::new(12, 0)), 6); // "12 0 R"
        assert_eq!(header_len(ObjectId::new(12, 0)), 9); // "12 0 obj "
    }

    #[test]
    fn test_shallow_reference_is_pure() {
        let mut doc = PdfDocument::new();
        let target = doc.add_object(Object::Integer(123456));
        let mut session = AuditSession::new(&doc, false);

        let array = Object::Array(vec![Object::Reference(target)]);
        assert_eq!(session.size(&array, false), 3 + 5);
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn test_deep_reference_counts_target_once() {
        let mut doc = PdfDocument::new();
        let target = doc.add_object(Object::Integer(123456));
        let mut session = AuditSession::new(&doc, false);

        let array = Object::Array(vec![Object::Reference(target), Object::Reference(target)]);
        // 3 + two tokens of "1 0 R" + target header "1 0 obj " (8) + 6 digits
        assert_eq!(session.size(&array, true), 3 + 5 + 5 + 8 + 6);
        assert!(session.ledger().contains(target));
    }

    #[test]
    fn test_parent_cycle_is_not_descended() {
        let mut doc = PdfDocument::new();
        let parent = ObjectId::new(1, 0);
        let child = ObjectId::new(2, 0);
        doc.insert(
            parent,
            Dictionary::new().with("Kids", vec![Object::Reference(child)]),
        );
        doc.insert(child, Dictionary::new().with("Parent", parent));

        let mut session = AuditSession::new(&doc, false);
        let child_size = session.size_indirect(child, true);

        // "2 0 obj " (8) + << >> (4) + "/Parent" (7) + "1 0 R" (5)
        assert_eq!(child_size, 24);
        assert!(!session.ledger().contains(parent));
    }

    #[test]
    fn test_non_parent_cycle_terminates() {
        let mut doc = PdfDocument::new();
        let a = ObjectId::new(1, 0);
        let b = ObjectId::new(2, 0);
        doc.insert(a, Dictionary::new().with("Next", b));
        doc.insert(b, Dictionary::new().with("Prev", a));

        let mut session = AuditSession::new(&doc, false);
        session.ledger.insert(a);
        let size = session.size_indirect(a, true);

        // a: 8 + 4 + "/Next"(5) + "2 0 R"(5) ; b: 8 + 4 + "/Prev"(5) + "1 0 R"(5)
        assert_eq!(size, 22 + 22);
    }

    #[test]
    fn test_long_reference_chain() {
        let mut doc = PdfDocument::new();
        let length = 200_000u32;
        for number in 1..=length {
            let next = ObjectId::new(number + 1, 0);
            let entry = if number < length {
                Dictionary::new().with("Next", next)
            } else {
                Dictionary::new()
            };
            doc.insert(ObjectId::new(number, 0), entry);
        }

        let mut session = AuditSession::new(&doc, false);
        let first = ObjectId::new(1, 0);
        session.ledger.insert(first);
        let size = session.size_indirect(first, true);

        assert_eq!(session.ledger().len(), length as usize);
        assert!(size > 20 * length as i64);
    }

    #[test]
    fn test_back_edge_table() {
        assert!(is_back_edge(Container::Dictionary, b"Parent"));
        assert!(is_back_edge(Container::StreamDictionary, b"P"));
        assert!(!is_back_edge(Container::Dictionary, b"Kids"));
    }
}
