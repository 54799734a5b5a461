//! Field decoding, encoding, and size measurement.

use std::borrow::Cow;

use encoding_rs::Encoding;

/// Decodes raw field bytes; malformed sequences become U+FFFD.
pub fn decode_field(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

pub(crate) fn encode_field<'a>(encoding: &'static Encoding, text: &'a str) -> Cow<'a, [u8]> {
    let (bytes, _, _) = encoding.encode(text);
    bytes
}

/// Approximate serialized size of a record: the encoded length of its fields
/// joined with commas.
///
/// Quoting and the real delimiter are ignored, as is the line terminator.
/// Part boundaries depend on this exact measure.
pub fn approx_record_size(encoding: &'static Encoding, fields: &[String]) -> u64 {
    let separators = fields.len().saturating_sub(1);
    let content: usize = fields
        .iter()
        .map(|field| encode_field(encoding, field).len())
        .sum();
    (content + separators) as u64
}

/// Replaces every line feed inside a field with a single space.
pub(crate) fn flatten_newlines(field: String) -> String {
    if field.contains('\n') {
        field.replace('\n', " ")
    } else {
        field
    }
}
