//! Document intake: raw bytes in, classified [`ValidationRequest`] out.
//!
//! The pipeline runs in a fixed order and never retries:
//!
//! 1. charset detection ([`detect_charset`])
//! 2. decoding, then rejection of blank or non-CII/UBL input
//! 3. normalization: BOM and pre-prolog garbage removal ([`normalize`])
//! 4. syntax sniffing ([`detect_syntax`])
//! 5. profile lookup ([`detect_profile`])

mod charset;
mod normalize;
#[cfg(feature = "pdf")]
mod pdf;
mod profile;
mod syntax;

pub use charset::{decode, detect_charset};
pub use normalize::{XML_DECLARATION, normalize, strip_bom};
#[cfg(feature = "pdf")]
pub use pdf::{extract_embedded_xml, is_pdf};
pub use profile::{detect_profile, extract_profile_id};
pub use syntax::{detect_syntax, is_cii, is_ubl};

use crate::core::{InvalidDocumentReason, ProfileKind, ValidationRequest, ValidatorError};

/// Classify a raw document.
///
/// Fails with [`ValidatorError::InvalidDocument`] for blank input, an
/// undeterminable encoding, an unrecognized dialect or malformed XML, and
/// with [`ValidatorError::UnknownProfile`] when the profile identifier is
/// missing or unsupported. No rule engine is involved at this point.
pub fn classify(bytes: &[u8]) -> Result<ValidationRequest, ValidatorError> {
    #[cfg(feature = "pdf")]
    let unwrapped;
    #[cfg(feature = "pdf")]
    let bytes = if is_pdf(bytes) {
        unwrapped = extract_embedded_xml(bytes)?;
        unwrapped.as_slice()
    } else {
        bytes
    };

    let charset = detect_charset(bytes)?;
    let decoded = decode(bytes, charset);

    if decoded.trim().is_empty() {
        return Err(InvalidDocumentReason::Blank.into());
    }
    if !is_cii(&decoded) && !is_ubl(&decoded) {
        return Err(InvalidDocumentReason::UnrecognizedSyntax.into());
    }

    let text = normalize(&decoded);
    let syntax = detect_syntax(text).ok_or(InvalidDocumentReason::UnrecognizedSyntax)?;

    let profile = match extract_profile_id(text, syntax)? {
        None => {
            return Err(ValidatorError::UnknownProfile(
                "no profile identifier found".into(),
            ));
        }
        Some(id) => ProfileKind::from_urn(&id).ok_or(ValidatorError::UnknownProfile(id))?,
    };

    tracing::debug!(
        charset = charset.name(),
        %syntax,
        %profile,
        "classified document"
    );

    Ok(ValidationRequest::new(
        syntax,
        profile,
        charset,
        text.to_string(),
    ))
}
