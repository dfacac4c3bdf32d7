use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::highlight::HighlightRecord;

/// Cover image attached to every uploaded highlight.
pub const BLINKIST_IMAGE_URL: &str =
    "https://upload.wikimedia.org/wikipedia/en/c/ca/Blinkist_logo.png";

/// Author recorded on every uploaded highlight.
pub const BLINKIST_AUTHOR: &str = "Blinkist";

/// A highlight already stored in Readwise.
///
/// Only `text` is interpreted; every other field the API returns is kept
/// as-is in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteHighlight {
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteHighlight {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extra: Map::new(),
        }
    }
}

/// One page of the Readwise highlight listing.
#[derive(Debug, Clone, Deserialize)]
pub struct HighlightPage {
    pub results: Vec<RemoteHighlight>,
    /// URL of the next page, `None` once the listing is exhausted.
    pub next: Option<String>,
}

/// Kind of source a Readwise highlight comes from.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Book,
}

/// A highlight in the shape the Readwise create endpoint accepts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadPayload {
    pub text: String,
    pub title: String,
    pub image_url: String,
    pub source_type: SourceType,
    pub author: String,
}

impl From<&HighlightRecord> for UploadPayload {
    fn from(record: &HighlightRecord) -> Self {
        Self {
            text: record.text.clone(),
            title: record.source_title.clone(),
            image_url: BLINKIST_IMAGE_URL.to_string(),
            source_type: SourceType::Book,
            author: BLINKIST_AUTHOR.to_string(),
        }
    }
}

/// Body of a batch upload request.
#[derive(Debug, Clone, Serialize)]
pub struct UploadBatch<'a> {
    pub highlights: &'a [UploadPayload],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_from_record() {
        let record = HighlightRecord::new("Deep Work", "Rule #1", "Focus is a skill.");
        let payload = UploadPayload::from(&record);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["text"], "Focus is a skill.");
        assert_eq!(json["title"], "Deep Work");
        assert_eq!(json["source_type"], "book");
        assert_eq!(json["author"], "Blinkist");
        assert_eq!(json["image_url"], BLINKIST_IMAGE_URL);
    }

    #[test]
    fn test_remote_highlight_keeps_unknown_fields() {
        let json = r#"{"id": 42, "text": "  A passage ", "book_id": 7, "note": ""}"#;
        let remote: RemoteHighlight = serde_json::from_str(json).unwrap();

        assert_eq!(remote.text, "  A passage ");
        assert_eq!(remote.extra["id"], 42);
        assert_eq!(remote.extra["book_id"], 7);
    }

    #[test]
    fn test_highlight_page_null_next() {
        let json = r#"{"count": 1, "next": null, "previous": null, "results": [{"text": "x"}]}"#;
        let page: HighlightPage = serde_json::from_str(json).unwrap();

        assert!(page.next.is_none());
        assert_eq!(page.results.len(), 1);
    }
}
