//! Deterministic post-processing around the Compile and Evaluate stages.
//!
//! The inference backend decides what is a duplicate and what must be split;
//! the controller never trusts its numbering. IDs are reassigned here so the
//! sequential-ID invariant holds unconditionally.

use crate::inference::InferenceError;
use crate::models::Comment;

/// Reassign IDs sequentially as `C1, C2, …`, preserving order.
pub fn renumber(comments: Vec<Comment>) -> Vec<Comment> {
    comments
        .into_iter()
        .enumerate()
        .map(|(i, mut c)| {
            c.id = format!("C{}", i + 1);
            c
        })
        .collect()
}

/// True when IDs read `C1, C2, …` with no gaps or repeats.
pub fn ids_sequential(comments: &[Comment]) -> bool {
    comments
        .iter()
        .enumerate()
        .all(|(i, c)| c.id == format!("C{}", i + 1))
}

/// Check the Evaluate output against the compiled list it was given.
///
/// Evaluation may only add status/reason/suggestion — it must return exactly
/// the compiled IDs. The evaluated list is reordered to match the compiled
/// order; anything missing, invented, or duplicated is a shape violation,
/// fatal for the track.
pub fn validate_evaluated(
    compiled: &[Comment],
    evaluated: Vec<Comment>,
) -> Result<Vec<Comment>, InferenceError> {
    if evaluated.len() != compiled.len() {
        return Err(InferenceError::SchemaValidation(format!(
            "evaluate returned {} comments for {} compiled",
            evaluated.len(),
            compiled.len()
        )));
    }

    let mut remaining = evaluated;
    let mut ordered = Vec::with_capacity(compiled.len());
    for comment in compiled {
        let pos = remaining
            .iter()
            .position(|e| e.id == comment.id)
            .ok_or_else(|| {
                InferenceError::SchemaValidation(format!(
                    "evaluate output is missing comment {}",
                    comment.id
                ))
            })?;
        let mut evaluated = remaining.swap_remove(pos);
        if evaluated.status.is_none() {
            return Err(InferenceError::SchemaValidation(format!(
                "evaluated comment {} has no status",
                evaluated.id
            )));
        }
        // Anchoring survives evaluation even if the backend dropped it.
        if evaluated.slide_refs.is_empty() {
            evaluated.slide_refs = comment.slide_refs.clone();
        }
        ordered.push(evaluated);
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommentStatus;

    fn candidates(n: usize) -> Vec<Comment> {
        (0..n)
            .map(|i| Comment::candidate(format!("E{}", i + 1), format!("comment {i}"), &[]))
            .collect()
    }

    fn evaluated(id: &str, status: CommentStatus) -> Comment {
        Comment {
            status: Some(status),
            reason: Some("checked".into()),
            ..Comment::candidate(id, "text", &[])
        }
    }

    #[test]
    fn renumber_assigns_sequential_ids() {
        let renumbered = renumber(candidates(3));
        let ids: Vec<&str> = renumbered.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "C2", "C3"]);
        assert!(ids_sequential(&renumbered));
    }

    #[test]
    fn renumber_discards_prior_ids() {
        let mut input = candidates(2);
        input[0].id = "C7".into();
        input[1].id = "E3".into();
        assert!(ids_sequential(&renumber(input)));
    }

    #[test]
    fn ids_sequential_rejects_gaps() {
        let mut comments = renumber(candidates(3));
        comments[1].id = "C5".into();
        assert!(!ids_sequential(&comments));
    }

    #[test]
    fn validate_reorders_to_compiled_order() {
        let compiled = renumber(candidates(2));
        let out = validate_evaluated(
            &compiled,
            vec![
                evaluated("C2", CommentStatus::NotImplemented),
                evaluated("C1", CommentStatus::Implemented),
            ],
        )
        .unwrap();
        assert_eq!(out[0].id, "C1");
        assert_eq!(out[1].id, "C2");
    }

    #[test]
    fn validate_rejects_missing_comment() {
        let compiled = renumber(candidates(2));
        let result = validate_evaluated(
            &compiled,
            vec![
                evaluated("C1", CommentStatus::Implemented),
                evaluated("C3", CommentStatus::Unclear),
            ],
        );
        assert!(matches!(result, Err(InferenceError::SchemaValidation(_))));
    }

    #[test]
    fn validate_rejects_count_mismatch() {
        let compiled = renumber(candidates(2));
        let result = validate_evaluated(&compiled, vec![evaluated("C1", CommentStatus::Unclear)]);
        assert!(matches!(result, Err(InferenceError::SchemaValidation(_))));
    }

    #[test]
    fn validate_restores_dropped_slide_refs() {
        let compiled = renumber(vec![Comment::candidate("E1", "fix chart", &[4])]);
        let out =
            validate_evaluated(&compiled, vec![evaluated("C1", CommentStatus::Implemented)])
                .unwrap();
        assert!(out[0].slide_refs.contains(&4));
    }
}
