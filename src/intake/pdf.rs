use lopdf::{Dictionary, Document, Object};

use crate::core::InvalidDocumentReason;

/// `true` if the bytes look like a PDF file (Factur-X / ZUGFeRD hybrid invoice).
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

/// Pull the embedded invoice XML out of a PDF/A-3 hybrid invoice.
///
/// Looks in the `Names > EmbeddedFiles` tree first, then in the catalog's
/// `AF` array. The XML is returned as raw bytes; its encoding is detected
/// by the regular intake pipeline afterwards.
pub fn extract_embedded_xml(pdf_bytes: &[u8]) -> Result<Vec<u8>, InvalidDocumentReason> {
    let doc = Document::load_mem(pdf_bytes)
        .map_err(|e| InvalidDocumentReason::NoEmbeddedInvoice(format!("failed to load PDF: {e}")))?;

    let xml = via_names(&doc).or_else(|_| via_af(&doc)).map_err(|e| {
        tracing::debug!(reason = %e, "no embedded invoice in PDF");
        InvalidDocumentReason::NoEmbeddedInvoice(e)
    })?;

    tracing::debug!(size = xml.len(), "extracted embedded invoice XML from PDF");
    Ok(xml)
}

fn via_names(doc: &Document) -> Result<Vec<u8>, String> {
    let catalog = doc.catalog().map_err(|e| e.to_string())?;
    let names = resolve_dict(doc, catalog.get(b"Names").map_err(|e| e.to_string())?)?;
    let embedded = resolve_dict(doc, names.get(b"EmbeddedFiles").map_err(|e| e.to_string())?)?;

    let entries = embedded
        .get(b"Names")
        .map_err(|e| e.to_string())?
        .as_array()
        .map_err(|e| e.to_string())?;

    // [name1, filespec1, name2, filespec2, ...]
    for pair in entries.chunks_exact(2) {
        let name = obj_to_string(&pair[0]).unwrap_or_default();
        if is_invoice_filename(&name) {
            return file_content(doc, resolve_dict(doc, &pair[1])?);
        }
    }

    Err("no invoice XML in EmbeddedFiles name tree".to_string())
}

fn via_af(doc: &Document) -> Result<Vec<u8>, String> {
    let catalog = doc.catalog().map_err(|e| e.to_string())?;
    let files = catalog
        .get(b"AF")
        .map_err(|e| e.to_string())?
        .as_array()
        .map_err(|e| e.to_string())?;

    for obj in files {
        let filespec = resolve_dict(doc, obj)?;
        let name = filespec
            .get(b"UF")
            .or_else(|_| filespec.get(b"F"))
            .ok()
            .and_then(obj_to_string)
            .unwrap_or_default();

        if is_invoice_filename(&name) {
            return file_content(doc, filespec);
        }
    }

    Err("no invoice XML in AF array".to_string())
}

fn file_content(doc: &Document, filespec: &Dictionary) -> Result<Vec<u8>, String> {
    let ef = resolve_dict(doc, filespec.get(b"EF").map_err(|e| e.to_string())?)?;
    let f = ef.get(b"F").map_err(|e| e.to_string())?;
    let stream = resolve_obj(doc, f)?.as_stream().map_err(|e| e.to_string())?;

    // decompressed_content() fails on streams without a Filter
    Ok(stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone()))
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Dictionary, String> {
    match obj {
        Object::Reference(id) => doc.get_dictionary(*id).map_err(|e| e.to_string()),
        Object::Dictionary(d) => Ok(d),
        _ => Err("expected dictionary or reference".to_string()),
    }
}

fn resolve_obj<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object, String> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).map_err(|e| e.to_string()),
        other => Ok(other),
    }
}

fn obj_to_string(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Attachment names the hybrid formats prescribe. Factur-X 1.0 uses
/// `factur-x.xml`, ZUGFeRD 2.x `zugferd-invoice.xml` or `xrechnung.xml`,
/// ZUGFeRD 1.0 `ZUGFeRD-invoice.xml`.
const INVOICE_FILENAMES: [&str; 3] = ["factur-x.xml", "zugferd-invoice.xml", "xrechnung.xml"];

fn is_invoice_filename(name: &str) -> bool {
    INVOICE_FILENAMES
        .iter()
        .any(|known| name.eq_ignore_ascii_case(known))
}
