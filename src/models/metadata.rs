use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Label used when a document's structure cannot be read.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Structural facts about a check document, derived fresh on every
/// comparison and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Human-readable size, e.g. "12.40 KB".
    pub file_size: String,
    /// First-page dimensions in points, e.g. "612x792".
    pub dimensions: String,
    pub page_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<NaiveDateTime>,
}

impl DocumentMetadata {
    /// Sentinel returned when decoding or structural parsing fails.
    pub fn unknown() -> Self {
        Self {
            file_size: UNKNOWN_LABEL.to_string(),
            dimensions: UNKNOWN_LABEL.to_string(),
            page_count: 0,
            creator: None,
            producer: None,
            creation_date: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.file_size == UNKNOWN_LABEL && self.page_count == 0
    }
}

/// Derived metadata for both sides of a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonMetadata {
    pub template: DocumentMetadata,
    pub verified: DocumentMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_has_zero_pages() {
        let m = DocumentMetadata::unknown();
        assert_eq!(m.file_size, "unknown");
        assert_eq!(m.dimensions, "unknown");
        assert_eq!(m.page_count, 0);
        assert!(m.is_unknown());
    }

    #[test]
    fn optional_fields_omitted_when_absent() {
        let json = serde_json::to_string(&DocumentMetadata::unknown()).unwrap();
        assert!(!json.contains("creator"));
        assert!(!json.contains("producer"));
    }
}
