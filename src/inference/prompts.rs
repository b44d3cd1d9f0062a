//! Stage instructions and context builders for the review pipeline.
//!
//! Instructions are sent as the system message; the structured context for
//! the stage is sent as the final user turn, after the track's accumulated
//! prior exchanges.

use crate::models::{Comment, Document};

pub const DETECT_INSTRUCTIONS: &str = r#"
You are checking whether a slide deck contains internal reviewer annotations
inside the document itself, as opposed to client-ready content.

You are given a structured representation of the deck: an array of slides,
each with an index and all visible text. An internal annotation is any text
that clearly reads as reviewer feedback, edit instructions, or placeholders
(callouts, shapes with revision text, TODOs) rather than final content.

Look through every slide. If you find no obvious internal annotations, set
has_internal_comments to false.

Respond with a single JSON object:
{"has_internal_comments": boolean}
"#;

pub const EXTRACT_TAGS_INSTRUCTIONS: &str = r#"
You are given only the original slide deck as structured data. Compile a
thorough list of ALL reviewer annotations embedded in the document itself
(callouts, shapes with revision text, TODOs, placeholders).

Rules:
- Use only the deck provided here. Ignore any email; it is handled separately.
- Multiple annotations on one slide are distinct comments; they usually appear
  as separate shapes, numbered lists, or sentences split by periods or commas.
- An annotation shape applies to the content directly beneath it (a shape
  reading "change color to green" over a chart of blue bars means: make those
  bars green).
- Infer slide numbers from phrases like "page 5" or "slide 7", from slide
  titles, or from the slide the annotation sits on. Use an empty array when
  the slide genuinely cannot be determined.
- If an annotation is just a person's name with no actionable request, leave
  it out.

Respond with a single JSON object:
{"comments": [{"id": "E1", "text": "...", "slide_refs": [5]}]}
"#;

pub const RESCAN_INSTRUCTIONS: &str = r#"
You are doing a second pass over the same deck. You are given the deck and
existing_comments, the list already extracted in the first pass.

Find additional actionable comments or requested changes that are not yet
covered by existing_comments. An item is covered if it clearly refers to the
same requested change, even phrased differently, or is a minor rephrasing or
clarification of something already captured. Output only genuinely new items.

Rules:
- Include every distinct actionable item not covered by existing_comments.
- Do not drop vague items: if something is ambiguous but clearly implies a
  requested change, include it.
- Give each new item a fresh temporary ID ("E1", "E2", ...); do not reuse IDs
  from existing_comments — everything is renumbered later.
- Infer slide_refs from the slide each annotation sits on.

Respond with a single JSON object:
{"comments": [{"id": "E1", "text": "...", "slide_refs": [5]}]}
"#;

pub const COMPILE_INSTRUCTIONS: &str = r#"
You are consolidating candidate comment lists into a single clean checklist.

Your job:
- Merge the candidate lists provided.
- Remove duplicates: two comments are duplicates when they clearly refer to
  the same underlying requested change, even if the phrasing differs. Keep
  the more specific or clearer version; if both are equally clear, keep
  either. If one is more detailed, merge into one comment preserving all
  important detail.
- Unless two comments are clearly the same requested change, keep both. When
  unsure, treat them as separate and keep both.
- If a comment bundles two or more distinct edits (line breaks, multiple
  sentences, multiple distinct asks), split it into separate comments so each
  final comment covers exactly one edit.
- Reassign IDs sequentially as "C1", "C2", "C3", ...
- Each final comment has standalone text and slide_refs (may be empty when
  truly unknown).

Respond with a single JSON object:
{"comments": [{"id": "C1", "text": "...", "slide_refs": [5]}]}
"#;

pub const EVALUATE_INSTRUCTIONS: &str = r#"
You are given a compiled list of reviewer comments plus the original and
revised versions of the deck. For each comment, compare the two versions and
determine its implementation status:
- implemented
- partially_implemented
- not_implemented
- unclear

Rules:
- A comment usually applies to the part of the slide it sits over, but it may
  also concern the page as a whole — check both before deciding.
- Provide a short reason explaining each decision.
- Provide a suggestion for further edits when the comment is not fully
  implemented; leave it empty when the status is implemented.
- Return every comment you were given, keeping its id, text, and slide_refs.

Respond with a single JSON object:
{"comments": [{"id": "C1", "text": "...", "slide_refs": [5],
               "status": "implemented", "reason": "...", "suggestion": "..."}]}
"#;

pub const EXTRACT_EMAIL_INSTRUCTIONS: &str = r#"
You are extracting a clean list of actionable comments from a reviewer email.

The email contains feedback such as page edits, slide references, formatting
requests, and data corrections. A comment is actionable if it requests a
change, correction, deletion, addition, reordering, or check.

Rules:
- Treat each discrete requested change as a separate item; never combine
  separate comments into one.
- Write each comment as a single crisp standalone sentence, preserving the
  meaning (you may rewrite for clarity).
- Convert slide mentions like "slide 5", "page 12", or "on 7" into integer
  slide_refs; use an empty array when no slide can be determined.
- Ignore polite phrases and non-actionable commentary.

Respond with a single JSON object:
{"comments": [{"id": "E1", "text": "...", "slide_refs": [5]}]}
"#;

pub const EXTRACT_FACTS_INSTRUCTIONS: &str = r#"
You are helping with a tick-and-tie consistency check on a financial slide
deck. You are given the full revised deck as structured data (slides with
index and text) and the reviewer email as a hint of which metrics matter:
if the email mentions a metric, check the whole deck carefully for it.

Scan all slides and extract every numeric statement that looks like a
financial or operational metric worth checking for consistency across pages:
revenue, growth rates, volumes, EBITDA and margins, EPS, share price,
valuation multiples, leverage, net debt, cash, capex, and the like.

For each fact:
- id: unique string like "F1", "F2", ...
- metric_label: short human-readable label ("2026E Apple revenue growth").
- entity: company or entity name when clearly implied, else null.
- metric: normalized snake_case name ("revenue_growth", "ebitda_margin");
  use a reasonable generic name like "other_metric" when unsure.
- period: time period like "2026E", "FY26", "Q4 2025", else null.
- scenario: label like "base", "upside", "reported", "pro_forma" when
  implied, else null.
- value: normalized number — "6%" becomes 0.06; "12.5x" becomes 12.5;
  "$1.2bn" becomes 1200000000 when the magnitude is clear, otherwise the
  literal decimal with the unit conveying the scale.
- raw_value_str: the value exactly as written on the slide.
- unit: short label like "pct", "usd", "usd_mn", "usd_bn", "x", "shares";
  null when unclear.
- page: the slide index where the fact appears.
- source_text: the line or short snippet around the value.

Rules:
- Only extract facts meaningful to check across pages; ignore trivial
  one-off counts ("3 key pillars").
- If the same metric appears several times on one slide, keep the single
  clearest occurrence — never emit duplicates.
- Capture slightly more rather than too few, but not every random number.
- Hard limit: at most 100 facts across the whole deck. When near the limit,
  prefer covering more distinct metrics over repeated captures of one.

Respond with a single JSON object:
{"facts": [{"id": "F1", "metric_label": "...", "entity": null, "metric": "...",
            "period": null, "scenario": null, "value": 0.06,
            "raw_value_str": "6%", "unit": "pct", "page": 3,
            "source_text": "..."}]}
"#;

// ──────────────────────────────────────────────
// Context builders
// ──────────────────────────────────────────────

pub fn document_input(document: &Document) -> String {
    format!("Document:\n{}", document.to_context_json())
}

pub fn rescan_input(document: &Document, existing: &[Comment]) -> String {
    format!(
        "Document:\n{}\n\nexisting_comments:\n{}",
        document.to_context_json(),
        comments_json(existing)
    )
}

pub fn compile_input(candidates: &[Comment]) -> String {
    format!("Candidate comments:\n{}", comments_json(candidates))
}

pub fn evaluate_input(compiled: &[Comment], original: &Document, revised: &Document) -> String {
    format!(
        "Compiled comments:\n{}\n\nOriginal document:\n{}\n\nRevised document:\n{}",
        comments_json(compiled),
        original.to_context_json(),
        revised.to_context_json()
    )
}

pub fn email_input(email_text: &str) -> String {
    format!("email_text:\n{email_text}")
}

pub fn facts_input(revised: &Document, email_text: &str) -> String {
    format!(
        "Revised document:\n{}\n\nemail_text:\n{}",
        revised.to_context_json(),
        email_text
    )
}

fn comments_json(comments: &[Comment]) -> String {
    serde_json::to_string_pretty(comments).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;

    #[test]
    fn every_instruction_declares_its_schema() {
        for instructions in [
            DETECT_INSTRUCTIONS,
            EXTRACT_TAGS_INSTRUCTIONS,
            RESCAN_INSTRUCTIONS,
            COMPILE_INSTRUCTIONS,
            EVALUATE_INSTRUCTIONS,
            EXTRACT_EMAIL_INSTRUCTIONS,
            EXTRACT_FACTS_INSTRUCTIONS,
        ] {
            assert!(instructions.contains("JSON object"), "missing schema note");
        }
    }

    #[test]
    fn rescan_input_includes_existing_comments() {
        let doc = Document::new(vec![Page {
            index: 1,
            text: "Title".into(),
        }]);
        let existing = vec![Comment::candidate("E1", "Fix the footer", &[1])];
        let input = rescan_input(&doc, &existing);
        assert!(input.contains("existing_comments"));
        assert!(input.contains("Fix the footer"));
    }

    #[test]
    fn evaluate_input_carries_both_documents() {
        let original = Document::new(vec![Page {
            index: 1,
            text: "blue bars".into(),
        }]);
        let revised = Document::new(vec![Page {
            index: 1,
            text: "green bars".into(),
        }]);
        let input = evaluate_input(&[], &original, &revised);
        assert!(input.contains("blue bars"));
        assert!(input.contains("green bars"));
    }
}
