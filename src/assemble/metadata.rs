//! Info dictionary of the combined document.
//!
//! Text values are written as plain literals when they are ASCII and as
//! UTF-16BE with a byte order mark otherwise, which is how PDF readers expect
//! non-Latin text strings.

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::config::Metadata;

/// Value written to the Creator and Producer entries.
pub const PRODUCER: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Write a fresh Info dictionary to `doc`.
///
/// User-supplied fields are set only when present. Creator, Producer and both
/// dates are always set, using `now` for the dates.
pub fn write_info(doc: &mut Document, metadata: &Metadata, now: DateTime<Utc>) {
    let mut info = Dictionary::new();

    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Keywords", &metadata.keywords),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            info.set(key, text(value));
        }
    }

    info.set("Creator", text(PRODUCER));
    info.set("Producer", text(PRODUCER));

    let date = format_pdf_date(now);
    info.set("CreationDate", text(&date));
    info.set("ModDate", text(&date));

    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);
}

/// Read the user-facing fields back from the Info dictionary.
pub fn read_info(doc: &Document) -> Metadata {
    let Some(info) = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_dictionary(id))
        .ok()
    else {
        return Metadata::default();
    };

    let field = |key: &[u8]| match info.get(key) {
        Ok(Object::String(bytes, _)) => decode_text(bytes),
        _ => None,
    };

    Metadata::new(
        field(b"Title"),
        field(b"Author"),
        field(b"Subject"),
        field(b"Keywords"),
    )
}

const UTF16_BOM: [u8; 2] = [0xfe, 0xff];

fn text(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = UTF16_BOM.to_vec();
    bytes.extend(value.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a PDF text string. Without a byte order mark the bytes are read as
/// UTF-8, falling back to Latin-1.
fn decode_text(bytes: &[u8]) -> Option<String> {
    if let Some(utf16) = bytes.strip_prefix(&UTF16_BOM) {
        let units = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units).collect::<Result<String, _>>().ok();
    }

    Some(match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    })
}

/// PDF date string, `D:YYYYMMDDHHmmSS+00'00'`.
pub fn format_pdf_date(time: DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%S+00'00'").to_string()
}
