//! Generic pass over every indirect object.
//!
//! Each object is classified by its structural role on first sight and
//! claimed for the matching category. Objects with no recognisable role are
//! left to the structural processors or, failing those, to the overhead.

use crate::model::{Dictionary, Object, ObjectId};

use super::category::Category;
use super::report::AuditWarning;
use super::session::AuditSession;

/// First names of color-space arrays.
const COLOR_SPACE_FAMILIES: &[&[u8]] = &[
    b"ICCBased",
    b"Indexed",
    b"Separation",
    b"DeviceN",
    b"Lab",
    b"CalGray",
    b"CalRGB",
];

/// Markup annotation subtypes, counted with 3D content as comments.
const MARKUP_SUBTYPES: &[&[u8]] = &[
    b"Text",
    b"FreeText",
    b"Line",
    b"Square",
    b"Circle",
    b"Polygon",
    b"PolyLine",
    b"Highlight",
    b"Underline",
    b"Squiggly",
    b"Stamp",
    b"Caret",
    b"Ink",
    b"Redact",
];

/// Structural role of an indirect object, in claim priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    ImageXObject,
    FormXObject,
    ObjectStream,
    XRefStream,
    ColorSpace,
    ExtGState,
    Font,
    FileSpec,
    LinkAnnotation,
    FileAttachment,
    Comment,
    Unclassified,
}

/// Classify an object. The first matching role wins.
pub fn classify(object: &Object) -> Role {
    match object {
        Object::Stream(stream) => classify_stream(&stream.dict),
        Object::Array(items) => match items.first().and_then(Object::as_name) {
            Some(family) if COLOR_SPACE_FAMILIES.iter().any(|f| *f == family) => Role::ColorSpace,
            _ => Role::Unclassified,
        },
        Object::Dictionary(dict) => classify_dict(dict),
        _ => Role::Unclassified,
    }
}

fn classify_stream(dict: &Dictionary) -> Role {
    if dict.subtype_is(b"Image") {
        Role::ImageXObject
    } else if dict.subtype_is(b"Form") {
        Role::FormXObject
    } else if dict.type_is(b"ObjStm") {
        Role::ObjectStream
    } else if dict.type_is(b"XRef") {
        Role::XRefStream
    } else {
        Role::Unclassified
    }
}

fn classify_dict(dict: &Dictionary) -> Role {
    if dict.type_is(b"ExtGState") {
        return Role::ExtGState;
    }
    if dict.type_is(b"Font") {
        return Role::Font;
    }
    // Writers disagree on the capitalisation.
    if dict.type_is(b"FileSpec") || dict.type_is(b"Filespec") {
        return Role::FileSpec;
    }
    match dict.get_name(b"Subtype") {
        Some(b"Link") => Role::LinkAnnotation,
        Some(b"FileAttachment") => Role::FileAttachment,
        Some(b"3D") => Role::Comment,
        Some(subtype) if MARKUP_SUBTYPES.iter().any(|m| *m == subtype) => Role::Comment,
        _ => Role::Unclassified,
    }
}

impl<'a> AuditSession<'a> {
    /// Run the generic pass over the whole object table.
    pub fn walk(&mut self) {
        let doc = self.doc;
        for (id, object) in doc.objects() {
            self.visit_once(id, object);
        }
        log::debug!(
            "Generic pass done: {} objects counted, highest id {}",
            self.ledger.len(),
            self.highest_id
        );
    }

    /// Classify one indirect object and claim it for its category.
    pub fn visit_once(&mut self, id: ObjectId, object: &Object) {
        self.highest_id = self.highest_id.max(id.number);
        if self.ledger.contains(id) {
            return;
        }

        match classify(object) {
            Role::ImageXObject => self.claim(id, Category::Images, true),
            Role::FormXObject => {
                self.claim(id, Category::XObjectForms, false);
                if let Some(dict) = object.as_stream().map(|s| &s.dict) {
                    if let Some(resources) = dict.get(b"Resources") {
                        self.route_resources(resources);
                    }
                    self.process_piece_info(dict);
                }
            }
            Role::ObjectStream => self.record_object_stream(id, object),
            Role::XRefStream => {
                self.has_xref_stream = true;
                self.claim(id, Category::CrossReferenceTable, false);
            }
            Role::ColorSpace => self.claim(id, Category::ColorSpaces, true),
            Role::ExtGState => self.claim(id, Category::ExtGraphicStates, true),
            Role::Font => self.claim(id, Category::Fonts, true),
            Role::FileSpec => self.claim(id, Category::EmbeddedFiles, true),
            Role::LinkAnnotation => self.claim(id, Category::LinkAnnotations, false),
            Role::FileAttachment => {
                if let Some(dict) = object.as_dict() {
                    self.process_file_attachment(id, dict);
                }
            }
            Role::Comment => self.claim(id, Category::CommentsAnd3D, true),
            Role::Unclassified => {}
        }
    }

    /// An object stream contributes its stored size minus its decoded
    /// size; the members are counted through their own roles.
    fn record_object_stream(&mut self, id: ObjectId, object: &Object) {
        let Some(stream) = object.as_stream() else {
            return;
        };
        let stored = self.size_indirect(id, false);
        let decoded = match stream.decoded_len() {
            Ok(len) => len as i64,
            Err(e) => {
                self.warn(AuditWarning::DecodeFailed {
                    id,
                    reason: e.to_string(),
                });
                0
            }
        };
        self.attribute(id, Category::ObjectCompressionSavings, stored - decoded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PdfDocument, Stream};

    fn name(n: &str) -> Object {
        Object::name(n)
    }

    fn stream_with(key: &str, value: &str) -> Object {
        Object::Stream(Stream::new(Dictionary::new().with(key, name(value)), vec![0; 4]))
    }

    #[test]
    fn test_classify_streams() {
        assert_eq!(classify(&stream_with("Subtype", "Image")), Role::ImageXObject);
        assert_eq!(classify(&stream_with("Subtype", "Form")), Role::FormXObject);
        assert_eq!(classify(&stream_with("Type", "ObjStm")), Role::ObjectStream);
        assert_eq!(classify(&stream_with("Type", "XRef")), Role::XRefStream);
        assert_eq!(classify(&stream_with("Type", "Metadata")), Role::Unclassified);
    }

    #[test]
    fn test_classify_color_space_arrays() {
        let icc = Object::Array(vec![name("ICCBased"), Object::Reference(ObjectId::new(3, 0))]);
        assert_eq!(classify(&icc), Role::ColorSpace);

        let rect = Object::Array(vec![Object::Integer(0), Object::Integer(0)]);
        assert_eq!(classify(&rect), Role::Unclassified);

        let pattern = Object::Array(vec![name("Pattern")]);
        assert_eq!(classify(&pattern), Role::Unclassified);
    }

    #[test]
    fn test_classify_dictionaries() {
        let dict = |k: &str, v: &str| Object::Dictionary(Dictionary::new().with(k, name(v)));

        assert_eq!(classify(&dict("Type", "Font")), Role::Font);
        assert_eq!(classify(&dict("Type", "ExtGState")), Role::ExtGState);
        assert_eq!(classify(&dict("Type", "Filespec")), Role::FileSpec);
        assert_eq!(classify(&dict("Subtype", "Link")), Role::LinkAnnotation);
        assert_eq!(classify(&dict("Subtype", "FileAttachment")), Role::FileAttachment);
        assert_eq!(classify(&dict("Subtype", "3D")), Role::Comment);
        assert_eq!(classify(&dict("Subtype", "Ink")), Role::Comment);
        assert_eq!(classify(&dict("Subtype", "Widget")), Role::Unclassified);
    }

    #[test]
    fn test_type_wins_over_subtype() {
        let font = Object::Dictionary(
            Dictionary::new()
                .with("Type", name("Font"))
                .with("Subtype", name("Type1")),
        );
        assert_eq!(classify(&font), Role::Font);
    }

    #[test]
    fn test_object_stream_savings() {
        let mut doc = PdfDocument::new();
        let id = doc.add_object(
            Stream::new(Dictionary::new().with("Type", name("ObjStm")), vec![0; 40])
                .with_decoded(vec![b' '; 100]),
        );
        let mut session = AuditSession::new(&doc, false);
        session.walk();

        // stored: "1 0 obj " (8) + 17 + dict (4 + 5 + 7 + 1) + 40 = 82
        assert_eq!(session.tracker().get(Category::ObjectCompressionSavings), 82 - 100);
        assert!(session.ledger().contains(id));
    }

    #[test]
    fn test_undecodable_object_stream_warns() {
        let mut doc = PdfDocument::new();
        let id = doc.add_object(Stream::new(
            Dictionary::new()
                .with("Type", name("ObjStm"))
                .with("Filter", name("RunLengthDecode")),
            vec![0; 10],
        ));
        let mut session = AuditSession::new(&doc, false);
        session.walk();

        assert!(session.tracker().get(Category::ObjectCompressionSavings) > 0);
        assert!(matches!(
            session.warnings.as_slice(),
            [AuditWarning::DecodeFailed { id: warned, .. }] if *warned == id
        ));
    }

    #[test]
    fn test_lzw_object_stream_decodes() {
        let mut doc = PdfDocument::new();
        doc.add_object(Stream::new(
            Dictionary::new()
                .with("Type", name("ObjStm"))
                .with("Filter", name("LZWDecode")),
            vec![0x80, 0x0B, 0x60, 0x50, 0x22, 0x0C, 0x0C, 0x85, 0x01],
        ));
        let mut session = AuditSession::new(&doc, false);
        session.walk();

        // stored: 8 + 17 + dict (4 + 5 + 7 + 1 + 7 + 10 + 1) + 9 = 69, decoded: 10
        assert_eq!(session.tracker().get(Category::ObjectCompressionSavings), 69 - 10);
        assert!(session.warnings.is_empty());
    }

    #[test]
    fn test_xref_stream_sets_flag() {
        let mut doc = PdfDocument::new();
        doc.add_object(stream_with("Type", "XRef"));
        let mut session = AuditSession::new(&doc, false);
        session.walk();

        assert!(session.has_xref_stream);
        assert!(session.tracker().get(Category::CrossReferenceTable) > 0);
    }

    #[test]
    fn test_highest_id_counts_every_object() {
        let mut doc = PdfDocument::new();
        doc.insert(ObjectId::new(3, 0), Object::Integer(1));
        doc.insert(ObjectId::new(17, 0), Object::Integer(2));
        let mut session = AuditSession::new(&doc, false);
        session.walk();

        assert_eq!(session.highest_id, 17);
    }

    #[test]
    fn test_image_descends_into_smask() {
        let mut doc = PdfDocument::new();
        let smask = doc.add_object(Stream::new(Dictionary::new(), vec![0; 8]));
        let image = doc.add_object(Stream::new(
            Dictionary::new()
                .with("Subtype", name("Image"))
                .with("SMask", smask),
            vec![0; 32],
        ));
        let mut session = AuditSession::new(&doc, true);
        session.visit_once(image, doc.get(image).unwrap());

        let smask_size = session.size_indirect(smask, false);
        let image_size = session.size_indirect(image, false);
        assert_eq!(session.tracker().get(Category::Images), image_size + smask_size);
        assert!(session.ledger().contains(smask));
    }
}
