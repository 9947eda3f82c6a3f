//! PDF text string decoding and encoding
//!
//! Field names, tooltips and values arrive as raw PDF string bytes with no
//! declared encoding. Decoding never fails: the worst case is a lossy string.

use lopdf::{Object, StringFormat};

const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Decode raw PDF string bytes.
///
/// Tries UTF-16BE (when the byte-order mark is present), then UTF-8, then a
/// single-byte Latin-1 mapping.
pub fn decode_pdf_text(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&UTF16BE_BOM) {
        if let Some(decoded) = decode_utf16be(body) {
            return decoded;
        }
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn decode_utf16be(body: &[u8]) -> Option<String> {
    if body.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

/// Render an object that should carry text (string or name) as a `String`.
pub fn object_text(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_pdf_text(bytes)),
        Object::Name(name) => Some(decode_pdf_text(name)),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(f) => Some(f.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Encode text as a PDF string object.
///
/// ASCII stays a literal string; anything else becomes UTF-16BE with a BOM so
/// viewers don't fall back to PDFDocEncoding.
pub fn text_object(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = UTF16BE_BOM.to_vec();
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
