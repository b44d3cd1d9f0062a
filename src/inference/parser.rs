use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::InferenceError;
use crate::models::{Comment, CommentStatus, Fact};
use crate::pipeline::tick_tie::normalize;

/// Extract the JSON payload from a completion, with or without code fences.
pub fn extract_json_block(response: &str) -> Result<String, InferenceError> {
    if let Some(fence_start) = response.find("```json") {
        let content_start = fence_start + 7;
        let fence_end = response[content_start..]
            .find("```")
            .ok_or_else(|| InferenceError::MalformedCompletion("unclosed JSON fence".into()))?;
        return Ok(response[content_start..content_start + fence_end]
            .trim()
            .to_string());
    }

    let trimmed = response.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed.to_string());
    }

    // No fence and no leading brace — salvage the outermost object if any.
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(trimmed[start..=end].to_string()),
        _ => Err(InferenceError::MalformedCompletion(
            "no JSON object in completion".into(),
        )),
    }
}

/// Parse a stage completion against its declared schema.
pub fn parse_stage<T: DeserializeOwned>(response: &str) -> Result<T, InferenceError> {
    let json = extract_json_block(response)?;
    serde_json::from_str(&json).map_err(|e| InferenceError::SchemaValidation(e.to_string()))
}

// ──────────────────────────────────────────────
// Stage schemas
// ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DetectResponse {
    pub has_internal_comments: bool,
}

#[derive(Debug, Deserialize)]
pub struct CommentsResponse {
    pub comments: Vec<RawComment>,
}

/// Comment as the backend emits it: refs may arrive as floats, evaluation
/// fields may or may not be present.
#[derive(Debug, Deserialize)]
pub struct RawComment {
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub slide_refs: Vec<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FactsResponse {
    pub facts: Vec<RawFact>,
}

#[derive(Debug, Deserialize)]
pub struct RawFact {
    #[serde(default)]
    pub id: Option<String>,
    pub metric_label: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    pub raw_value_str: String,
    #[serde(default)]
    pub unit: Option<String>,
    pub page: i64,
    #[serde(default)]
    pub source_text: Option<String>,
}

// ──────────────────────────────────────────────
// Conversions into the domain model
// ──────────────────────────────────────────────

/// Convert floating slide refs to a clean set of positive page numbers.
/// Anything non-positive or fractional is dropped — an unresolvable
/// reference becomes an empty set, never an error.
fn clean_slide_refs(refs: &[f64]) -> std::collections::BTreeSet<u32> {
    refs.iter()
        .filter(|r| r.is_finite() && **r >= 1.0 && r.fract() == 0.0 && **r <= u32::MAX as f64)
        .map(|r| *r as u32)
        .collect()
}

/// Lenient conversion for extraction stages: evaluation fields are discarded
/// (extraction never sets status), empty-text items are dropped.
pub fn candidates_from(response: CommentsResponse) -> Vec<Comment> {
    response
        .comments
        .into_iter()
        .enumerate()
        .filter(|(_, raw)| !raw.text.trim().is_empty())
        .map(|(i, raw)| Comment {
            id: raw.id.unwrap_or_else(|| format!("E{}", i + 1)),
            text: raw.text.trim().to_string(),
            slide_refs: clean_slide_refs(&raw.slide_refs),
            status: None,
            reason: None,
            suggestion: None,
        })
        .collect()
}

/// Strict conversion for the Evaluate stage: every item must carry a valid
/// status. A missing or unknown status is a schema violation — fatal for
/// the track.
pub fn evaluated_from(response: CommentsResponse) -> Result<Vec<Comment>, InferenceError> {
    response
        .comments
        .into_iter()
        .map(|raw| {
            let status: CommentStatus = raw
                .status
                .as_deref()
                .ok_or_else(|| {
                    InferenceError::SchemaValidation(format!(
                        "evaluated comment {:?} is missing status",
                        raw.id
                    ))
                })?
                .parse()
                .map_err(InferenceError::SchemaValidation)?;

            // A fully implemented comment needs no further action.
            let suggestion = match status {
                CommentStatus::Implemented => None,
                _ => raw.suggestion.filter(|s| !s.trim().is_empty()),
            };

            Ok(Comment {
                id: raw.id.unwrap_or_default(),
                text: raw.text.trim().to_string(),
                slide_refs: clean_slide_refs(&raw.slide_refs),
                status: Some(status),
                reason: raw.reason.filter(|r| !r.trim().is_empty()),
                suggestion,
            })
        })
        .collect()
}

/// Lenient conversion for fact extraction: items with no usable page or
/// value are dropped rather than failing the track; a parseable raw literal
/// overrides a disagreeing backend-supplied value.
pub fn facts_from(response: FactsResponse) -> Vec<Fact> {
    response
        .facts
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            if raw.page < 1 || raw.page > u32::MAX as i64 {
                return None;
            }
            let (value, unit) = normalize::reconcile(raw.value, raw.unit, &raw.raw_value_str)?;
            Some(Fact {
                id: raw.id.unwrap_or_else(|| format!("F{}", i + 1)),
                metric_label: raw.metric_label,
                entity: raw.entity,
                metric: raw.metric.unwrap_or_else(|| "other_metric".to_string()),
                period: raw.period,
                scenario: raw.scenario,
                value,
                raw_value_str: raw.raw_value_str,
                unit,
                page: raw.page as u32,
                source_text: raw.source_text.unwrap_or_default(),
            })
        })
        .collect()
}
