use std::sync::LazyLock;

use regex::Regex;

use crate::core::SyntaxKind;

static CII_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[<:]CrossIndustryInvoice").expect("static regex"));

static UBL_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[<:](Invoice|CreditNote)").expect("static regex"));

/// Sniff the syntax from the root element name, ignoring namespace prefixes.
///
/// This is a textual probe, not a parse: it accepts documents that turn out
/// to be malformed later. CII is checked first because CII documents also
/// contain `ram:Invoice…` element names.
pub fn detect_syntax(text: &str) -> Option<SyntaxKind> {
    if text.trim().is_empty() {
        return None;
    }
    if is_cii(text) {
        return Some(SyntaxKind::Cii);
    }
    if is_ubl(text) {
        return Some(SyntaxKind::Ubl);
    }
    None
}

pub fn is_cii(text: &str) -> bool {
    CII_ROOT.is_match(text)
}

pub fn is_ubl(text: &str) -> bool {
    UBL_ROOT.is_match(text)
}
