/// Opening token of the XML declaration.
pub const XML_DECLARATION: &str = "<?xml version";

/// U+FEFF as read in either byte order.
const BYTE_ORDER_MARKS: [char; 2] = ['\u{FEFF}', '\u{FFFE}'];

/// Strip byte-order marks and anything in front of the XML declaration.
///
/// If the declaration is missing the text is returned as-is (minus BOMs);
/// truncating it would hide the real reason the document is invalid.
/// Applying this twice yields the same result as applying it once.
pub fn normalize(text: &str) -> &str {
    let text = strip_bom(text);
    match text.find(XML_DECLARATION) {
        Some(offset) => &text[offset..],
        None => text,
    }
}

/// Remove leading byte-order-mark code points.
pub fn strip_bom(text: &str) -> &str {
    text.trim_start_matches(BYTE_ORDER_MARKS)
}
