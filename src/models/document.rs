use serde::{Deserialize, Serialize};

/// A single page (slide) of a deck: index plus all visible text.
///
/// Produced by an external source adapter; immutable once constructed.
/// Indices are 1-based and expected to be in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub index: u32,
    pub text: String,
}

/// An ordered sequence of pages. Empty documents are legal — an original
/// deck may simply not have been provided.
///
/// Wire shape matches the source-adapter contract:
/// `{"slides": [{"index": 1, "text": "..."}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub slides: Vec<Page>,
}

impl Document {
    pub fn new(slides: Vec<Page>) -> Self {
        Self { slides }
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.slides.len()
    }

    /// Render the document as indented JSON for use as inference context.
    pub fn to_context_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{\"slides\": []}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_page_doc() -> Document {
        Document::new(vec![
            Page {
                index: 1,
                text: "Executive Summary".into(),
            },
            Page {
                index: 2,
                text: "EBITDA Bridge\nMargin: 25%".into(),
            },
        ])
    }

    #[test]
    fn deserializes_adapter_shape() {
        let doc: Document =
            serde_json::from_str(r#"{"slides": [{"index": 1, "text": "Title"}]}"#).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.slides[0].index, 1);
        assert_eq!(doc.slides[0].text, "Title");
    }

    #[test]
    fn missing_slides_field_is_empty_document() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn context_json_round_trips() {
        let doc = two_page_doc();
        let json = doc.to_context_json();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
