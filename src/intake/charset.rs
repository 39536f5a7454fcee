use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

use crate::core::InvalidDocumentReason;

/// Detect the character encoding of a raw document.
///
/// Looks at the whole buffer: byte-order mark first, then the BOM-less
/// UTF-16 signature of an XML prolog, then UTF-8 well-formedness, and only
/// then the statistical detector. A statistical guess is accepted only if it
/// decodes the entire buffer without malformed sequences or control
/// characters (other than tab, CR and LF); there is no fallback default.
pub fn detect_charset(bytes: &[u8]) -> Result<&'static Encoding, InvalidDocumentReason> {
    if bytes.is_empty() {
        return Err(InvalidDocumentReason::EncodingUndetermined);
    }

    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return Ok(encoding);
    }

    if let Some(encoding) = utf16_signature(bytes) {
        return Ok(encoding);
    }

    if bytes.is_ascii() || std::str::from_utf8(bytes).is_ok() {
        return Ok(UTF_8);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, false);

    let (text, had_errors) = guess.decode_without_bom_handling(bytes);
    if had_errors || text.chars().any(is_stray_control) {
        tracing::debug!(encoding = guess.name(), "charset guess rejected");
        return Err(InvalidDocumentReason::EncodingUndetermined);
    }

    Ok(guess)
}

/// C0 controls other than tab and line breaks, and all C1 controls. Single-byte
/// encodings decode any byte, so these are what give binary noise away.
fn is_stray_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// `<?` encoded as UTF-16 without a byte-order mark.
fn utf16_signature(bytes: &[u8]) -> Option<&'static Encoding> {
    match bytes {
        [b'<', 0, b'?', 0, ..] => Some(UTF_16LE),
        [0, b'<', 0, b'?', ..] => Some(UTF_16BE),
        _ => None,
    }
}

/// Decode with the detected encoding. A leading BOM is kept as U+FEFF so the
/// normalizer sees the same text regardless of encoding.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}
