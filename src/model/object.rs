//! Typed PDF objects.
//!
//! A closed set of object kinds mirroring the COS object model. Indirect
//! objects live in the document table keyed by [`ObjectId`]; anywhere else
//! they appear as [`Object::Reference`] tokens.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::filter::{self, DecodeError};

/// Identity of an indirect object: (object number, generation number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ObjectId {
    /// Object number
    pub number: u32,
    /// Generation number
    pub generation: u16,
}

impl ObjectId {
    /// Create a new object id.
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl From<(u32, u16)> for ObjectId {
    fn from((number, generation): (u32, u16)) -> Self {
        Self { number, generation }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.generation)
    }
}

/// A PDF object.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Name(Vec<u8>),
    String(Vec<u8>),
    Array(Vec<Object>),
    Dictionary(Dictionary),
    Stream(Stream),
    /// Token pointing at an indirect object.
    Reference(ObjectId),
}

impl Object {
    /// Build a name object.
    pub fn name(name: impl AsRef<[u8]>) -> Self {
        Object::Name(name.as_ref().to_vec())
    }

    /// Build a string object.
    pub fn string(bytes: impl AsRef<[u8]>) -> Self {
        Object::String(bytes.as_ref().to_vec())
    }

    /// Short name of the object kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Boolean(_) => "boolean",
            Object::Integer(_) => "integer",
            Object::Real(_) => "real",
            Object::Name(_) => "name",
            Object::String(_) => "string",
            Object::Array(_) => "array",
            Object::Dictionary(_) => "dictionary",
            Object::Stream(_) => "stream",
            Object::Reference(_) => "reference",
        }
    }

    pub fn as_name(&self) -> Option<&[u8]> {
        match self {
            Object::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            Object::Reference(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Object::Stream(stream) => Some(stream),
            _ => None,
        }
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Boolean(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Integer(value)
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::Real(value)
    }
}

impl From<ObjectId> for Object {
    fn from(id: ObjectId) -> Self {
        Object::Reference(id)
    }
}

impl From<Dictionary> for Object {
    fn from(dict: Dictionary) -> Self {
        Object::Dictionary(dict)
    }
}

impl From<Stream> for Object {
    fn from(stream: Stream) -> Self {
        Object::Stream(stream)
    }
}

impl From<Vec<Object>> for Object {
    fn from(items: Vec<Object>) -> Self {
        Object::Array(items)
    }
}

/// A PDF dictionary. Keys are unique; iteration is in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: BTreeMap<Vec<u8>, Object>,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    pub fn set(&mut self, key: impl AsRef<[u8]>, value: impl Into<Object>) {
        self.entries.insert(key.as_ref().to_vec(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl AsRef<[u8]>, value: impl Into<Object>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &[u8]) -> Option<&Object> {
        self.entries.get(key)
    }

    pub fn has(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Object)> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name value stored under `key`, if the entry exists and is a name.
    pub fn get_name(&self, key: &[u8]) -> Option<&[u8]> {
        self.get(key).and_then(Object::as_name)
    }

    /// True when `/Type` is the given name.
    pub fn type_is(&self, type_name: &[u8]) -> bool {
        self.get_name(b"Type") == Some(type_name)
    }

    /// True when `/Subtype` is the given name.
    pub fn subtype_is(&self, subtype: &[u8]) -> bool {
        self.get_name(b"Subtype") == Some(subtype)
    }
}

impl<K: AsRef<[u8]>, V: Into<Object>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (key, value) in iter {
            dict.set(key, value);
        }
        dict
    }
}

/// A PDF stream: dictionary plus the payload as stored in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    /// Stream dictionary
    pub dict: Dictionary,
    /// Encoded payload bytes, exactly as stored
    pub content: Vec<u8>,
    /// Payload already decoded by the parser, when it did so
    decoded: Option<Vec<u8>>,
}

impl Stream {
    /// Create a stream from its dictionary and encoded payload.
    pub fn new(dict: Dictionary, content: Vec<u8>) -> Self {
        Self {
            dict,
            content,
            decoded: None,
        }
    }

    /// Attach a payload that was already decoded upstream.
    pub fn with_decoded(mut self, decoded: Vec<u8>) -> Self {
        self.decoded = Some(decoded);
        self
    }

    /// Length of the encoded payload.
    pub fn raw_len(&self) -> usize {
        self.content.len()
    }

    /// Length of the decoded payload.
    pub fn decoded_len(&self) -> Result<usize, DecodeError> {
        match &self.decoded {
            Some(data) => Ok(data.len()),
            None => filter::decode(&self.dict, &self.content).map(|data| data.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_type_checks() {
        let dict = Dictionary::new()
            .with("Type", Object::name("XObject"))
            .with("Subtype", Object::name("Image"));

        assert!(dict.type_is(b"XObject"));
        assert!(dict.subtype_is(b"Image"));
        assert!(!dict.subtype_is(b"Form"));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_dictionary_keys_are_unique() {
        let mut dict = Dictionary::new();
        dict.set("Count", 1i64);
        dict.set("Count", 2i64);

        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get(b"Count"), Some(&Object::Integer(2)));
    }

    #[test]
    fn test_type_is_ignores_non_names() {
        let dict = Dictionary::new().with("Type", Object::string("Font"));
        assert!(!dict.type_is(b"Font"));
    }

    #[test]
    fn test_stream_predecoded_payload() {
        let stream = Stream::new(Dictionary::new(), vec![1, 2, 3]).with_decoded(vec![0; 10]);
        assert_eq!(stream.raw_len(), 3);
        assert_eq!(stream.decoded_len().unwrap(), 10);
    }

    #[test]
    fn test_object_id_display() {
        assert_eq!(ObjectId::new(12, 0).to_string(), "12 0");
    }
}
