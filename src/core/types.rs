use std::fmt;

use serde::{Serialize, Serializer};

pub use encoding_rs::Encoding;
use encoding_rs::{UTF_16BE, UTF_16LE};

/// The XML syntax (dialect) an invoice document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SyntaxKind {
    /// UN/CEFACT Cross Industry Invoice (`rsm:CrossIndustryInvoice`).
    #[serde(rename = "CII")]
    Cii,
    /// OASIS Universal Business Language 2.1 (`Invoice` / `CreditNote`).
    #[serde(rename = "UBL")]
    Ubl,
}

impl SyntaxKind {
    pub const ALL: [SyntaxKind; 2] = [SyntaxKind::Cii, SyntaxKind::Ubl];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cii => "CII",
            Self::Ubl => "UBL",
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conformance profile declared inside the document.
///
/// CII carries it in `GuidelineSpecifiedDocumentContextParameter/ID`,
/// UBL in `cbc:CustomizationID` (BT-24).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileKind {
    /// Plain EN 16931 core invoice.
    En16931,
    /// Factur-X / ZUGFeRD Extended (CII only).
    FacturXExtended,
    /// Peppol BIS Billing 3.0 (UBL only).
    Peppol30,
    /// German XRechnung 3.0 CIUS.
    XRechnung30,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 4] = [
        ProfileKind::En16931,
        ProfileKind::FacturXExtended,
        ProfileKind::Peppol30,
        ProfileKind::XRechnung30,
    ];

    /// The canonical specification identifier for this profile.
    pub fn urn(&self) -> &'static str {
        match self {
            Self::En16931 => "urn:cen.eu:en16931:2017",
            Self::FacturXExtended => {
                "urn:cen.eu:en16931:2017#conformant#urn:factur-x.eu:1p0:extended"
            }
            Self::Peppol30 => {
                "urn:cen.eu:en16931:2017#compliant#urn:fdc:peppol.eu:2017:poacc:billing:3.0"
            }
            Self::XRechnung30 => {
                "urn:cen.eu:en16931:2017#compliant#urn:xeinkauf.de:kosit:xrechnung_3.0"
            }
        }
    }

    /// Stable profile name used in result metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Self::En16931 => "EN16931",
            Self::FacturXExtended => "FACTURX_EXTENDED",
            Self::Peppol30 => "PEPPOL_30",
            Self::XRechnung30 => "XRECHNUNG_30",
        }
    }

    /// Look up a profile by its exact identifier. Unknown identifiers yield `None`.
    pub fn from_urn(urn: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.urn() == urn)
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.urn())
    }
}

impl Serialize for ProfileKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A classified document, ready for validator dispatch.
///
/// Only the intake pipeline builds these, so `syntax` and `profile` always
/// describe the `text` they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    syntax: SyntaxKind,
    profile: ProfileKind,
    charset: &'static Encoding,
    text: String,
}

impl ValidationRequest {
    pub(crate) fn new(
        syntax: SyntaxKind,
        profile: ProfileKind,
        charset: &'static Encoding,
        text: String,
    ) -> Self {
        Self {
            syntax,
            profile,
            charset,
            text,
        }
    }

    pub fn syntax(&self) -> SyntaxKind {
        self.syntax
    }

    pub fn profile(&self) -> ProfileKind {
        self.profile
    }

    /// The encoding the raw bytes were decoded with.
    pub fn charset(&self) -> &'static Encoding {
        self.charset
    }

    /// The decoded, normalized document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Re-encode the document for the rule engine, in the encoding it arrived in.
    ///
    /// The bytes always match the document's own XML declaration. UTF-16 is
    /// written with a leading BOM since `encoding_rs` only encodes to
    /// ASCII-compatible encodings.
    pub fn encoded(&self) -> (Vec<u8>, &'static Encoding) {
        let charset = self.charset;
        if charset == UTF_16LE || charset == UTF_16BE {
            let to_bytes: fn(u16) -> [u8; 2] = if charset == UTF_16LE {
                u16::to_le_bytes
            } else {
                u16::to_be_bytes
            };
            let mut bytes = Vec::with_capacity(2 * (self.text.len() + 1));
            for unit in std::iter::once(0xFEFF).chain(self.text.encode_utf16()) {
                bytes.extend_from_slice(&to_bytes(unit));
            }
            return (bytes, charset);
        }

        let (bytes, used, _) = charset.encode(&self.text);
        (bytes.into_owned(), used)
    }
}
