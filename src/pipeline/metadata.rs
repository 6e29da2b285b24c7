use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime};
use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::models::{DocumentMetadata, UNKNOWN_LABEL};

const DATA_URI_PREFIX: &str = "data:application/pdf;base64,";

/// Derive structural metadata from a base64-encoded check PDF.
///
/// Total: a payload that fails to decode or parse yields the sentinel
/// record instead of an error, so a broken file never blocks downstream
/// comparison flow.
pub fn extract_document_metadata(payload: &str) -> DocumentMetadata {
    match try_extract(payload) {
        Ok(metadata) => metadata,
        Err(reason) => {
            tracing::debug!(%reason, "Document metadata unavailable, using sentinel");
            DocumentMetadata::unknown()
        }
    }
}

fn try_extract(payload: &str) -> Result<DocumentMetadata, String> {
    let encoded = payload.strip_prefix(DATA_URI_PREFIX).unwrap_or(payload);
    let bytes = BASE64.decode(encoded.trim()).map_err(|e| e.to_string())?;
    let doc = Document::load_mem(&bytes).map_err(|e| e.to_string())?;

    let pages = doc.get_pages();

    // Checks are single-page; report the first page's extent.
    let dimensions = pages
        .values()
        .next()
        .and_then(|&id| page_dimensions(&doc, id))
        .map(|(w, h)| format!("{}x{}", w.round() as i64, h.round() as i64))
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string());

    let info = info_dictionary(&doc);

    Ok(DocumentMetadata {
        file_size: format!("{:.2} KB", bytes.len() as f64 / 1024.0),
        dimensions,
        page_count: pages.len(),
        creator: info.and_then(|d| text_entry(d, b"Creator")),
        producer: info.and_then(|d| text_entry(d, b"Producer")),
        creation_date: info
            .and_then(|d| text_entry(d, b"CreationDate"))
            .and_then(|s| parse_pdf_date(&s)),
    })
}

/// Resolve the document Info dictionary from the trailer, if present.
fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// MediaBox extent of a page, following the Parent chain for inherited
/// boxes.
fn page_dimensions(doc: &Document, page_id: ObjectId) -> Option<(f64, f64)> {
    let mut dict = doc.get_object(page_id).ok()?.as_dict().ok()?;
    loop {
        if let Ok(media_box) = dict.get(b"MediaBox") {
            return media_box_extent(doc, media_box);
        }
        match dict.get(b"Parent").ok()? {
            Object::Reference(id) => dict = doc.get_object(*id).ok()?.as_dict().ok()?,
            _ => return None,
        }
    }
}

fn media_box_extent(doc: &Document, media_box: &Object) -> Option<(f64, f64)> {
    let values = match media_box {
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Array(a) => a,
            _ => return None,
        },
        Object::Array(a) => a,
        _ => return None,
    };
    if values.len() != 4 {
        return None;
    }

    let mut bounds = [0f64; 4];
    for (slot, object) in bounds.iter_mut().zip(values) {
        *slot = match object {
            Object::Integer(v) => *v as f64,
            Object::Real(v) => *v as f64,
            _ => return None,
        };
    }
    Some(((bounds[2] - bounds[0]).abs(), (bounds[3] - bounds[1]).abs()))
}

fn text_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => {
            let text = String::from_utf8_lossy(bytes).trim().to_string();
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    }
}

/// Parse a PDF date string ("D:YYYYMMDDHHMMSS..." with optional timezone
/// suffix). A date-only string resolves to midnight.
fn parse_pdf_date(raw: &str) -> Option<NaiveDateTime> {
    let digits: String = raw
        .trim_start_matches("D:")
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.len() >= 14 {
        NaiveDateTime::parse_from_str(&digits[..14], "%Y%m%d%H%M%S").ok()
    } else if digits.len() >= 8 {
        NaiveDate::parse_from_str(&digits[..8], "%Y%m%d")
            .ok()?
            .and_hms_opt(0, 0, 0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate a valid PDF with an Info dictionary using lopdf.
    fn make_test_pdf(creator: Option<&str>) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::Stream;

        let mut doc = Document::with_version("1.4");

        let content = Stream::new(dictionary! {}, b"BT ET".to_vec());
        let content_id = doc.add_object(content);

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(Object::Dictionary(ref mut dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(creator) = creator {
            let info_id = doc.add_object(dictionary! {
                "Creator" => Object::string_literal(creator),
                "Producer" => Object::string_literal("lopdf test"),
                "CreationDate" => Object::string_literal("D:20240115093000+00'00'"),
            });
            doc.trailer.set("Info", info_id);
        }

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    fn encode(bytes: &[u8]) -> String {
        BASE64.encode(bytes)
    }

    #[test]
    fn extracts_dimensions_and_page_count() {
        let payload = encode(&make_test_pdf(None));
        let meta = extract_document_metadata(&payload);
        assert_eq!(meta.page_count, 1);
        assert_eq!(meta.dimensions, "612x792");
        assert!(meta.file_size.ends_with(" KB"));
    }

    #[test]
    fn extracts_info_dictionary_fields() {
        let payload = encode(&make_test_pdf(Some("CheckWriter 2.1")));
        let meta = extract_document_metadata(&payload);
        assert_eq!(meta.creator.as_deref(), Some("CheckWriter 2.1"));
        assert_eq!(meta.producer.as_deref(), Some("lopdf test"));
        let created = meta.creation_date.unwrap();
        assert_eq!(created.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 09:30");
    }

    #[test]
    fn strips_data_uri_prefix() {
        let payload = format!("data:application/pdf;base64,{}", encode(&make_test_pdf(None)));
        let meta = extract_document_metadata(&payload);
        assert_eq!(meta.page_count, 1);
    }

    #[test]
    fn malformed_payload_yields_sentinel() {
        let meta = extract_document_metadata("definitely not base64!!!");
        assert!(meta.is_unknown());
        assert_eq!(meta.dimensions, "unknown");
        assert_eq!(meta.page_count, 0);
    }

    #[test]
    fn valid_base64_of_garbage_yields_sentinel() {
        let payload = encode(b"not a pdf at all");
        let meta = extract_document_metadata(&payload);
        assert!(meta.is_unknown());
    }

    #[test]
    fn pdf_date_without_time_resolves_to_midnight() {
        let parsed = parse_pdf_date("D:20240201").unwrap();
        assert_eq!(parsed.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn unparsable_pdf_date_is_none() {
        assert!(parse_pdf_date("last Tuesday").is_none());
    }
}
