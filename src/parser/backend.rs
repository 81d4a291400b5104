//! PDF backend: loads documents with lopdf and converts them into the
//! crate's own object model.
//!
//! Documents are only ever built here; the audit engine can also be
//! exercised against documents assembled in memory.

use std::collections::HashSet;
use std::path::Path;

use lopdf::xref::XrefEntry;
use lopdf::{Document as LopdfDocument, Reader};

use crate::detect::sniff_bytes;
use crate::error::{Error, Result};
use crate::model::{Dictionary, Object, ObjectId, PdfDocument, Stream};

use super::options::AuditOptions;

/// Load a document from a file path.
pub fn load_file<P: AsRef<Path>>(path: P, options: &AuditOptions) -> Result<PdfDocument> {
    let data = std::fs::read(path.as_ref())?;
    load_bytes(&data, options)
}

/// Load a document from an in-memory byte slice.
pub fn load_bytes(data: &[u8], options: &AuditOptions) -> Result<PdfDocument> {
    let header = sniff_bytes(data)?;

    let raw = LopdfDocument::load_mem(data).map_err(|e| match e {
        lopdf::Error::Decryption(_) => Error::Encrypted,
        _ => Error::from(e),
    })?;

    // Note: lopdf 0.34 only tries the empty password
    if options.has_password() {
        log::warn!("Password was provided but decryption with a password is not supported");
    }
    if raw.is_encrypted() {
        log::warn!("Document is encrypted; sizes reflect the encrypted payloads");
    }

    let mut doc = PdfDocument::new();
    doc.version = header.version;
    doc.file_size = options.file_size.unwrap_or(data.len() as u64);
    doc.trailer = convert_dictionary(&raw.trailer);

    let reader = stored_reader(&raw, data);

    for (&(number, generation), object) in &raw.objects {
        let id = ObjectId::new(number, generation);
        let mut converted = convert_object(object);

        if let Object::Stream(stream) = &mut converted {
            if let Some(restored) = restore_object_stream(&reader, id, stream) {
                *stream = restored;
            }
        }

        doc.insert(id, converted);
    }

    recover_dropped_objects(&raw, &reader, &mut doc);

    log::debug!(
        "Loaded PDF {} with {} indirect objects ({} bytes)",
        doc.version,
        doc.object_count(),
        doc.file_size
    );

    Ok(doc)
}

/// Convert a `lopdf::Object` into the crate's [`Object`].
fn convert_object(obj: &lopdf::Object) -> Object {
    match obj {
        lopdf::Object::Null => Object::Null,
        lopdf::Object::Boolean(b) => Object::Boolean(*b),
        lopdf::Object::Integer(i) => Object::Integer(*i),
        lopdf::Object::Real(r) => Object::Real(f64::from(*r)),
        lopdf::Object::Name(n) => Object::Name(n.clone()),
        lopdf::Object::String(bytes, _) => Object::String(bytes.clone()),
        lopdf::Object::Array(items) => Object::Array(items.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => Object::Dictionary(convert_dictionary(dict)),
        lopdf::Object::Stream(stream) => Object::Stream(Stream::new(
            convert_dictionary(&stream.dict),
            stream.content.clone(),
        )),
        lopdf::Object::Reference((number, generation)) => {
            Object::Reference(ObjectId::new(*number, *generation))
        }
    }
}

fn convert_dictionary(dict: &lopdf::Dictionary) -> Dictionary {
    dict.iter()
        .map(|(key, value)| (key.clone(), convert_object(value)))
        .collect()
}

/// A reader over the file bytes that resolves objects through the loaded
/// cross-reference table, for re-reading objects as they are stored.
fn stored_reader<'a>(raw: &LopdfDocument, file: &'a [u8]) -> Reader<'a> {
    let mut document = LopdfDocument::new();
    document.reference_table = raw.reference_table.clone();
    Reader {
        buffer: file,
        document,
    }
}

/// Re-read indirect object `id` from the file. Stream payloads are sliced
/// by `/Length`, direct or indirect.
fn read_stored(reader: &Reader, id: ObjectId) -> Option<lopdf::Object> {
    reader
        .get_object((id.number, id.generation), &mut HashSet::new())
        .map_err(|e| log::debug!("Could not re-read object {}: {}", id, e))
        .ok()
}

/// lopdf inflates object streams while loading so it can read their
/// members, dropping `/Filter` on the way. Put the stored dictionary and
/// bytes back so the stream is sized as it sits in the file, keeping the
/// inflated bytes as its decoded payload.
fn restore_object_stream(reader: &Reader, id: ObjectId, stream: &Stream) -> Option<Stream> {
    if !stream.dict.type_is(b"ObjStm") || stream.dict.has(b"Filter") {
        return None;
    }

    let stored = match read_stored(reader, id) {
        Some(lopdf::Object::Stream(stored)) if stored.start_position.is_none() => {
            Stream::new(convert_dictionary(&stored.dict), stored.content)
        }
        // No usable /Length: fall back to scanning for `endstream`.
        _ => {
            let offset = match reader.document.reference_table.get(id.number)? {
                XrefEntry::Normal { offset, .. } => *offset as usize,
                _ => return None,
            };
            let Some(bytes) = stored_stream_bytes(reader.buffer, offset) else {
                log::debug!("Could not locate stored bytes of object stream {}", id);
                return None;
            };
            Stream::new(stream.dict.clone(), bytes.to_vec())
        }
    };

    Some(stored.with_decoded(stream.content.clone()))
}

/// lopdf silently drops object streams it cannot decode, along with their
/// members. Re-read every such in-use entry from the file so its stored
/// bytes are still accounted for; without a decoded payload the audit
/// reports it as undecodable.
fn recover_dropped_objects(raw: &LopdfDocument, reader: &Reader, doc: &mut PdfDocument) {
    for (&number, entry) in &raw.reference_table.entries {
        let XrefEntry::Normal { generation, .. } = *entry else {
            continue;
        };
        if raw.objects.contains_key(&(number, generation)) {
            continue;
        }

        let id = ObjectId::new(number, generation);
        if let Some(object) = read_stored(reader, id) {
            log::warn!("Recovered object {} R that the parser dropped", id);
            doc.insert(id, convert_object(&object));
        }
    }
}

/// Slice the payload between `stream` and `endstream` of the object that
/// starts at `offset`.
fn stored_stream_bytes(file: &[u8], offset: usize) -> Option<&[u8]> {
    let tail = file.get(offset..)?;
    let keyword = find(tail, b"stream")?;

    let mut start = keyword + b"stream".len();
    if tail.get(start) == Some(&b'\r') {
        start += 1;
    }
    if tail.get(start) == Some(&b'\n') {
        start += 1;
    }

    let mut end = start + find(tail.get(start..)?, b"endstream")?;
    if end > start && tail[end - 1] == b'\n' {
        end -= 1;
    }
    if end > start && tail[end - 1] == b'\r' {
        end -= 1;
    }

    tail.get(start..end)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn build_pdf() -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content_id = doc.add_object(lopdf::Stream::new(
            dictionary! {},
            b"BT /F1 12 Tf 72 720 Td (Hi) Tj ET".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            lopdf::Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_load_bytes_converts_objects() {
        let data = build_pdf();
        let doc = load_bytes(&data, &AuditOptions::default()).unwrap();

        assert_eq!(doc.file_size, data.len() as u64);
        assert_eq!(doc.version, "1.5");
        assert_eq!(doc.page_count(), 1);
        assert!(doc
            .objects()
            .any(|(_, obj)| obj.as_dict().is_some_and(|d| d.type_is(b"Font"))));
    }

    #[test]
    fn test_load_bytes_file_size_override() {
        let data = build_pdf();
        let options = AuditOptions::new().with_file_size(1_000_000);
        let doc = load_bytes(&data, &options).unwrap();
        assert_eq!(doc.file_size, 1_000_000);
    }

    #[test]
    fn test_load_rejects_non_pdf() {
        let result = load_bytes(b"hello world, not a pdf", &AuditOptions::default());
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_convert_real_and_reference() {
        assert_eq!(convert_object(&lopdf::Object::Real(1.5)), Object::Real(1.5));
        assert_eq!(
            convert_object(&lopdf::Object::Reference((7, 1))),
            Object::Reference(ObjectId::new(7, 1))
        );
    }

    #[test]
    fn test_stored_stream_bytes() {
        let file = b"junk 5 0 obj\n<< /Type /ObjStm /N 1 >>\nstream\r\nABCDEF\r\nendstream\nendobj";
        assert_eq!(stored_stream_bytes(file, 5), Some(b"ABCDEF".as_slice()));
    }
}
