use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Implementation status assigned to a comment by the Evaluate stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Implemented,
    PartiallyImplemented,
    NotImplemented,
    Unclear,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Implemented => "implemented",
            Self::PartiallyImplemented => "partially_implemented",
            Self::NotImplemented => "not_implemented",
            Self::Unclear => "unclear",
        }
    }
}

impl std::str::FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "implemented" => Ok(Self::Implemented),
            "partially_implemented" => Ok(Self::PartiallyImplemented),
            "not_implemented" => Ok(Self::NotImplemented),
            "unclear" => Ok(Self::Unclear),
            other => Err(format!("unknown comment status: {other}")),
        }
    }
}

/// One requested change, extracted from document annotations or an email.
///
/// `slide_refs` is empty when the referenced slide cannot be determined.
/// `status`, `reason`, and `suggestion` are absent until the Evaluate stage
/// runs; no extraction stage may set them. IDs are only meaningful within a
/// single run — compilation reassigns them sequentially as `C1, C2, …`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub slide_refs: BTreeSet<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CommentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Comment {
    /// A pre-evaluation comment: text and slide refs only.
    pub fn candidate(id: impl Into<String>, text: impl Into<String>, refs: &[u32]) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            slide_refs: refs.iter().copied().collect(),
            status: None,
            reason: None,
            suggestion: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_wire_form_is_snake_case() {
        let json = serde_json::to_string(&CommentStatus::PartiallyImplemented).unwrap();
        assert_eq!(json, "\"partially_implemented\"");
        let back: CommentStatus = serde_json::from_str("\"not_implemented\"").unwrap();
        assert_eq!(back, CommentStatus::NotImplemented);
    }

    #[test]
    fn status_rejects_unknown_value() {
        assert!(serde_json::from_str::<CommentStatus>("\"done\"").is_err());
        assert!(CommentStatus::from_str("done").is_err());
    }

    #[test]
    fn candidate_has_no_evaluation_fields() {
        let c = Comment::candidate("E1", "Change chart color to green", &[4]);
        assert!(c.status.is_none());
        assert!(c.reason.is_none());
        assert!(c.suggestion.is_none());
        assert!(c.slide_refs.contains(&4));
    }

    #[test]
    fn slide_refs_deduplicate_and_sort() {
        let c = Comment::candidate("E1", "Fix footer", &[7, 3, 7]);
        let refs: Vec<u32> = c.slide_refs.iter().copied().collect();
        assert_eq!(refs, vec![3, 7]);
    }

    #[test]
    fn evaluation_fields_omitted_from_json_when_absent() {
        let c = Comment::candidate("C1", "Fix footer", &[]);
        let json = serde_json::to_string(&c).unwrap();
        assert!(!json.contains("status"));
        assert!(!json.contains("reason"));
        assert!(!json.contains("suggestion"));
    }
}
