use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;

use crate::core::{InvalidDocumentReason, ProfileKind, SyntaxKind};

/// Where the profile identifier lives, per syntax.
#[derive(Debug, Clone, Copy)]
enum ProfileQuery {
    /// `ExchangedDocumentContext/GuidelineSpecifiedDocumentContextParameter/ID`
    Cii,
    /// `CustomizationID` anywhere
    Ubl,
}

impl ProfileQuery {
    fn for_syntax(syntax: SyntaxKind) -> Self {
        match syntax {
            SyntaxKind::Cii => Self::Cii,
            SyntaxKind::Ubl => Self::Ubl,
        }
    }

    /// Match on local names only, so any namespace prefix is accepted.
    fn matches(&self, parents: &[Vec<u8>], name: &[u8]) -> bool {
        match self {
            Self::Cii => {
                let n = parents.len();
                name == b"ID"
                    && n >= 2
                    && parents[n - 2].as_slice() == b"ExchangedDocumentContext"
                    && parents[n - 1].as_slice() == b"GuidelineSpecifiedDocumentContextParameter"
            }
            Self::Ubl => name == b"CustomizationID",
        }
    }
}

/// Determine the profile of a document whose syntax is already known.
///
/// `Ok(None)` means the identifier is missing, empty, or not one we support.
/// `Err` is reserved for text that is not well-formed XML.
pub fn detect_profile(
    text: &str,
    syntax: SyntaxKind,
) -> Result<Option<ProfileKind>, InvalidDocumentReason> {
    Ok(extract_profile_id(text, syntax)?.and_then(|id| ProfileKind::from_urn(&id)))
}

/// Extract the raw profile identifier (first match in document order).
///
/// The whole document is parsed, so malformed XML is reported even when the
/// identifier appears before the defect. DTDs are never processed and only
/// the five predefined entities and character references are expanded.
pub fn extract_profile_id(
    text: &str,
    syntax: SyntaxKind,
) -> Result<Option<String>, InvalidDocumentReason> {
    let query = ProfileQuery::for_syntax(syntax);
    let mut reader = NsReader::from_str(text);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut saw_root = false;
    let mut capture: Option<(usize, String)> = None;
    let mut found: Option<String> = None;

    loop {
        let (namespace, event) = reader.read_resolved_event().map_err(malformed)?;
        if let ResolveResult::Unknown(prefix) = namespace {
            return Err(InvalidDocumentReason::MalformedXml(format!(
                "unbound namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            )));
        }

        match event {
            Event::Start(ref e) => {
                saw_root = true;
                let name = e.local_name().as_ref().to_vec();
                if found.is_none() && capture.is_none() && query.matches(&path, &name) {
                    capture = Some((path.len(), String::new()));
                }
                path.push(name);
            }
            Event::Empty(ref e) => {
                saw_root = true;
                if found.is_none() && capture.is_none() && query.matches(&path, e.local_name().as_ref())
                {
                    found = Some(String::new());
                }
            }
            Event::Text(ref e) => {
                if let Some((_, buf)) = capture.as_mut() {
                    buf.push_str(&e.unescape().map_err(malformed)?);
                }
            }
            Event::CData(ref e) => {
                if let Some((_, buf)) = capture.as_mut() {
                    let data = std::str::from_utf8(e).map_err(|err| {
                        InvalidDocumentReason::MalformedXml(format!("CDATA is not UTF-8: {err}"))
                    })?;
                    buf.push_str(data);
                }
            }
            Event::End(_) => {
                path.pop();
                if capture.as_ref().is_some_and(|(depth, _)| *depth == path.len()) {
                    found = capture.take().map(|(_, buf)| buf);
                }
            }
            Event::DocType(_) => {
                tracing::debug!("ignoring DOCTYPE declaration during profile lookup");
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(InvalidDocumentReason::MalformedXml(
            "document has no root element".into(),
        ));
    }
    if !path.is_empty() {
        return Err(InvalidDocumentReason::MalformedXml(
            "unexpected end of document".into(),
        ));
    }

    Ok(found.filter(|id| !id.is_empty()))
}

fn malformed(e: quick_xml::Error) -> InvalidDocumentReason {
    InvalidDocumentReason::MalformedXml(e.to_string())
}
