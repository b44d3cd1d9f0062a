//! Human-readable coverage summary, written the way a banker would read it
//! in a reply email.

use crate::models::{Comment, CommentStatus, TickTieReport};

/// Render the full review summary.
///
/// `show_comments` toggles the comment sections off for tick-and-tie-only
/// runs.
pub fn format_summary(
    tags: &[Comment],
    email_comments: &[Comment],
    tick_tie: Option<&TickTieReport>,
    show_comments: bool,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    if show_comments {
        push_coverage_section(&mut lines, "Document tags", tags);
        push_coverage_section(&mut lines, "Email comments", email_comments);
    }

    if let Some(report) = tick_tie {
        push_tick_tie_section(&mut lines, report);
    }

    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn with_status(comments: &[Comment], status: CommentStatus) -> Vec<&Comment> {
    comments
        .iter()
        .filter(|c| c.status == Some(status))
        .collect()
}

fn push_coverage_section(lines: &mut Vec<String>, title: &str, comments: &[Comment]) {
    if comments.is_empty() {
        lines.push(format!("{title}: no comments found."));
        lines.push(String::new());
        return;
    }

    let implemented = with_status(comments, CommentStatus::Implemented);
    let partial = with_status(comments, CommentStatus::PartiallyImplemented);
    let missed = with_status(comments, CommentStatus::NotImplemented);
    let unclear = with_status(comments, CommentStatus::Unclear);

    lines.push(format!("{title} — coverage summary:"));
    lines.push(format!("- Implemented: {}", implemented.len()));
    lines.push(format!("- Partially implemented: {}", partial.len()));
    lines.push(format!("- Not implemented: {}", missed.len()));
    lines.push(format!("- Unclear: {}", unclear.len()));
    lines.push(String::new());

    push_detail_block(lines, "Partially implemented:", &partial, true);
    push_detail_block(lines, "Not implemented:", &missed, true);
    push_detail_block(lines, "Unclear / needs human review:", &unclear, false);
}

fn push_detail_block(
    lines: &mut Vec<String>,
    heading: &str,
    comments: &[&Comment],
    with_suggestion: bool,
) {
    if comments.is_empty() {
        return;
    }
    lines.push(heading.to_string());
    for c in comments {
        lines.push(format!("- {} (slides {}): {}", c.id, slide_list(c), c.text));
        if let Some(reason) = &c.reason {
            lines.push(format!("  Reason: {reason}"));
        }
        if with_suggestion {
            if let Some(suggestion) = &c.suggestion {
                lines.push(format!("  Suggestion: {suggestion}"));
            }
        }
    }
    lines.push(String::new());
}

fn slide_list(comment: &Comment) -> String {
    if comment.slide_refs.is_empty() {
        return "unknown".to_string();
    }
    comment
        .slide_refs
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_tick_tie_section(lines: &mut Vec<String>, report: &TickTieReport) {
    lines.push("Tick-and-tie:".to_string());
    lines.push(format!("- Consistent metrics: {}", report.ties_out.len()));
    lines.push(format!("- Discrepancies to check: {}", report.check.len()));
    lines.push(String::new());

    if !report.ties_out.is_empty() {
        lines.push("Ties out:".to_string());
        for tie in &report.ties_out {
            let pages = tie
                .pages
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!(
                "- {}: {} (pages {pages})",
                tie.metric_label, tie.canonical_value
            ));
        }
        lines.push(String::new());
    }

    if !report.check.is_empty() {
        lines.push("Check:".to_string());
        for item in &report.check {
            lines.push(format!("- {}: {}", item.metric_label, item.reason));
            for value in &item.values_by_page {
                lines.push(format!("  Page {}: {}", value.page, value.value));
            }
        }
        lines.push(String::new());
    }
}
