//! Output character-encoding transcoding.

use encoding_rs::Encoding;

/// Look up an encoding by its WHATWG label (`"UTF-8"`, `"ISO-8859-1"`, ...).
pub fn lookup(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Encode UTF-8 text into `encoding`; unmappable characters become numeric
/// character references.
pub fn transcode(text: &str, encoding: &'static Encoding) -> Vec<u8> {
    let (bytes, _, _) = encoding.encode(text);
    bytes.into_owned()
}
