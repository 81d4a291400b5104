//! Stream filter decoding.
//!
//! Filters are decoded through lopdf (Flate and LZW with their predictors,
//! ASCII85). lopdf has no ASCIIHex decoder, so that one lives here. Anything
//! else is reported as a [`DecodeError`] and left to the caller.

use std::io::Read;

use flate2::read::ZlibDecoder;
use thiserror::Error;

use super::object::{Dictionary, Object};

/// Failure to produce a stream's decoded payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The filter is not one this crate can decode.
    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// The filter is known but the data is invalid for it.
    #[error("{filter} data is corrupt: {message}")]
    Corrupt { filter: String, message: String },

    /// `/Filter` is neither a name nor an array of names.
    #[error("malformed /Filter entry")]
    MalformedFilter,
}

/// Decode `data` through the filter chain declared in `dict`.
pub fn decode(dict: &Dictionary, data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let filters = filter_names(dict)?;
    let params = decode_params(dict, filters.len());

    let mut current = data.to_vec();
    for (name, params) in filters.iter().zip(params) {
        current = apply(full_name(name), params, &current)?;
    }
    Ok(current)
}

fn filter_names(dict: &Dictionary) -> Result<Vec<&[u8]>, DecodeError> {
    match dict.get(b"Filter") {
        None | Some(Object::Null) => Ok(Vec::new()),
        Some(Object::Name(name)) => Ok(vec![name.as_slice()]),
        Some(Object::Array(items)) => items
            .iter()
            .map(|item| item.as_name().ok_or(DecodeError::MalformedFilter))
            .collect(),
        Some(_) => Err(DecodeError::MalformedFilter),
    }
}

/// `/DecodeParms` for each filter in the chain.
fn decode_params(dict: &Dictionary, count: usize) -> Vec<Option<&Dictionary>> {
    match dict.get(b"DecodeParms") {
        Some(Object::Dictionary(params)) => (0..count)
            .map(|i| (i == 0).then_some(params))
            .collect(),
        Some(Object::Array(items)) => (0..count)
            .map(|i| items.get(i).and_then(Object::as_dict))
            .collect(),
        _ => vec![None; count],
    }
}

/// Inline images use abbreviated filter names; some writers leak them
/// into streams.
fn full_name(name: &[u8]) -> &[u8] {
    match name {
        b"Fl" => b"FlateDecode",
        b"LZW" => b"LZWDecode",
        b"A85" => b"ASCII85Decode",
        b"AHx" => b"ASCIIHexDecode",
        b"RL" => b"RunLengthDecode",
        b"CCF" => b"CCITTFaxDecode",
        b"DCT" => b"DCTDecode",
        other => other,
    }
}

fn apply(name: &[u8], params: Option<&Dictionary>, data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    match name {
        b"ASCIIHexDecode" => ascii_hex(data),
        b"FlateDecode" => {
            // lopdf logs corrupt zlib data and keeps the partial output.
            check_zlib(data)?;
            through_lopdf(name, params, data)
        }
        other => through_lopdf(other, params, data),
    }
}

fn through_lopdf(
    name: &[u8],
    params: Option<&Dictionary>,
    data: &[u8],
) -> Result<Vec<u8>, DecodeError> {
    let mut dict = lopdf::Dictionary::new();
    dict.set("Filter", lopdf::Object::Name(name.to_vec()));
    if let Some(params) = params {
        dict.set("DecodeParms", lopdf::Object::Dictionary(to_lopdf_dict(params)));
    }

    let filter = String::from_utf8_lossy(name).into_owned();
    lopdf::Stream::new(dict, data.to_vec())
        .decompressed_content()
        .map_err(|e| match e {
            lopdf::Error::Type => DecodeError::UnsupportedFilter(filter),
            other => DecodeError::Corrupt {
                filter,
                message: other.to_string(),
            },
        })
}

fn check_zlib(data: &[u8]) -> Result<(), DecodeError> {
    if data.is_empty() {
        return Ok(());
    }
    let mut sink = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut sink)
        .map(|_| ())
        .map_err(|e| DecodeError::Corrupt {
            filter: "FlateDecode".to_string(),
            message: e.to_string(),
        })
}

fn to_lopdf_dict(dict: &Dictionary) -> lopdf::Dictionary {
    dict.iter()
        .map(|(key, value)| (key.to_vec(), to_lopdf(value)))
        .collect()
}

fn to_lopdf(object: &Object) -> lopdf::Object {
    match object {
        Object::Null | Object::Stream(_) => lopdf::Object::Null,
        Object::Boolean(b) => lopdf::Object::Boolean(*b),
        Object::Integer(i) => lopdf::Object::Integer(*i),
        Object::Real(r) => lopdf::Object::Real(*r as f32),
        Object::Name(name) => lopdf::Object::Name(name.clone()),
        Object::String(bytes) => lopdf::Object::String(bytes.clone(), lopdf::StringFormat::Literal),
        Object::Array(items) => lopdf::Object::Array(items.iter().map(to_lopdf).collect()),
        Object::Dictionary(dict) => lopdf::Object::Dictionary(to_lopdf_dict(dict)),
        Object::Reference(id) => lopdf::Object::Reference((id.number, id.generation)),
    }
}

fn ascii_hex(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut high: Option<u8> = None;

    for &byte in data {
        if byte == b'>' {
            break;
        }
        if byte.is_ascii_whitespace() {
            continue;
        }
        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => {
                return Err(DecodeError::Corrupt {
                    filter: "ASCIIHexDecode".to_string(),
                    message: format!("invalid hex digit 0x{:02x}", byte),
                })
            }
        };
        match high.take() {
            Some(h) => out.push((h << 4) | nibble),
            None => high = Some(nibble),
        }
    }

    // An odd trailing digit behaves as if followed by 0.
    if let Some(h) = high {
        out.push(h << 4);
    }

    Ok(out)
}
