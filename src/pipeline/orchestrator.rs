//! Runs the three review tracks over one document/email pair and assembles
//! the final report.
//!
//! Tracks build their own transcripts from the same read-only inputs, so
//! they run concurrently; the orchestrator waits for all of them. A failed
//! track is reported absent with a stage-tagged failure entry — the other
//! tracks still report. Nothing survives across runs.

use tracing::{info_span, warn};
use uuid::Uuid;

use super::comments::CommentPipeline;
use super::tick_tie::TickTieEngine;
use super::TrackError;
use crate::inference::ReviewInference;
use crate::models::{Document, ReviewReport, Track, TrackFailure};

#[derive(Debug, Clone)]
pub struct ReviewRequest<'a> {
    pub email_text: &'a str,
    pub original: &'a Document,
    pub revised: &'a Document,
    /// Maximum absolute difference between normalized values before a
    /// metric group is flagged.
    pub tolerance: f64,
    pub run_tick_tie: bool,
}

pub fn run_review<I>(inference: &I, request: &ReviewRequest<'_>) -> ReviewReport
where
    I: ReviewInference + ?Sized,
{
    let run_id = Uuid::new_v4();
    let _span = info_span!("review_run", run_id = %run_id).entered();

    let (tags, email, tick) = std::thread::scope(|scope| {
        let tags = scope.spawn(|| {
            CommentPipeline::new(inference).run_tag_track(request.original, request.revised)
        });
        let email = scope.spawn(|| {
            CommentPipeline::new(inference).run_email_track(
                request.email_text,
                request.original,
                request.revised,
            )
        });
        let tick = scope.spawn(|| {
            request.run_tick_tie.then(|| {
                TickTieEngine::new(inference).run(
                    request.revised,
                    request.email_text,
                    request.tolerance,
                )
            })
        });

        (
            tags.join().expect("tag track panicked"),
            email.join().expect("email track panicked"),
            tick.join().expect("tick-tie track panicked"),
        )
    });

    let mut report = ReviewReport::default();
    let mut failures = Vec::new();

    match tags {
        Ok(list) => report.tags = Some(list),
        Err(e) => failures.push(record_failure(Track::Tags, e)),
    }
    match email {
        Ok(list) => report.email_comments = Some(list),
        Err(e) => failures.push(record_failure(Track::EmailComments, e)),
    }
    match tick {
        None => {}
        Some(Ok(tick_tie)) => report.tick_tie = Some(tick_tie),
        Some(Err(e)) => failures.push(record_failure(Track::TickTie, e)),
    }

    report.failures = failures;
    report
}

fn record_failure(track: Track, error: TrackError) -> TrackFailure {
    warn!(track = track.as_str(), stage = error.stage.as_str(),
          error = %error.source, "review track failed");
    TrackFailure {
        track,
        stage: error.stage.as_str().to_string(),
        message: error.source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Stage;
    use crate::models::{Comment, Fact};
    use crate::pipeline::comments::tests::{doc, StubInference};

    fn fact(id: &str, value: f64, raw: &str, page: u32) -> Fact {
        Fact {
            id: id.into(),
            metric_label: "2026E Apple revenue growth".into(),
            entity: Some("Apple".into()),
            metric: "revenue_growth".into(),
            period: Some("2026E".into()),
            scenario: None,
            value,
            raw_value_str: raw.into(),
            unit: Some("pct".into()),
            page,
            source_text: String::new(),
        }
    }

    fn request<'a>(
        original: &'a Document,
        revised: &'a Document,
        run_tick_tie: bool,
    ) -> ReviewRequest<'a> {
        ReviewRequest {
            email_text: "Please fix the margin on slide 2.",
            original,
            revised,
            tolerance: 0.0005,
            run_tick_tie,
        }
    }

    #[test]
    fn all_tracks_report_independently() {
        let stub = StubInference {
            detect: true,
            primary: vec![Comment::candidate("E1", "Make the bars green", &[4])],
            email: vec![Comment::candidate("E1", "Fix the margin on slide 2", &[2])],
            facts: vec![fact("F1", 0.06, "6%", 3), fact("F2", 0.055, "5.5%", 12)],
            ..Default::default()
        };
        let original = doc();
        let revised = doc();

        let report = run_review(&stub, &request(&original, &revised, true));

        let tags = report.tags.expect("tag track");
        let email = report.email_comments.expect("email track");
        let tick = report.tick_tie.expect("tick-tie track");

        assert_eq!(tags.len(), 1);
        assert_eq!(email.len(), 1);
        // Independent tracks both start numbering at C1 — never merged.
        assert_eq!(tags[0].id, "C1");
        assert_eq!(email[0].id, "C1");
        assert_eq!(tick.check.len(), 1);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn tick_tie_absent_when_not_requested() {
        let stub = StubInference::default();
        let original = doc();
        let revised = doc();

        let report = run_review(&stub, &request(&original, &revised, false));
        assert!(report.tick_tie.is_none());
        assert!(report.failures.is_empty());
        // The facts stage never ran.
        assert!(!stub
            .calls
            .lock()
            .unwrap()
            .contains(&Stage::ExtractFacts));
    }

    #[test]
    fn failed_track_is_absent_but_others_still_report() {
        let stub = StubInference {
            detect: true,
            primary: vec![Comment::candidate("E1", "Fix footer", &[])],
            email: vec![Comment::candidate("E1", "Fix the margin", &[2])],
            fail_at: Some(Stage::Rescan),
            ..Default::default()
        };
        let original = doc();
        let revised = doc();

        let report = run_review(&stub, &request(&original, &revised, false));

        assert!(report.tags.is_none());
        assert!(report.email_comments.is_some());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].track, Track::Tags);
        assert_eq!(report.failures[0].stage, "rescan");
        assert!(report.has_results());
    }

    #[test]
    fn every_track_failing_still_returns_a_report() {
        let stub = StubInference {
            detect: true,
            primary: vec![Comment::candidate("E1", "Fix footer", &[])],
            email: vec![Comment::candidate("E1", "Fix margin", &[])],
            facts: vec![fact("F1", 0.06, "6%", 3)],
            fail_at: Some(Stage::Extract),
            ..Default::default()
        };
        let original = doc();
        let revised = doc();

        let report = run_review(&stub, &request(&original, &revised, true));
        assert!(report.tags.is_none());
        assert!(report.email_comments.is_none());
        // Tick-tie does not pass through Extract and still succeeds.
        assert!(report.tick_tie.is_some());
        assert_eq!(report.failures.len(), 2);
    }
}
