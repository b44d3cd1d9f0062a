pub mod grouping;
pub mod normalize;

use std::collections::BTreeSet;

use tracing::{info_span, warn};

use super::TrackError;
use crate::inference::{ReviewInference, Stage, Transcript};
use crate::models::{Document, Fact, MetricKey, TickTieReport};

/// Hard cap on facts per run.
pub const FACT_CAP: usize = 100;

/// The tick-and-tie consistency engine: fact extraction via the inference
/// capability, then deterministic dedup, cap enforcement, grouping, and
/// tolerance comparison.
pub struct TickTieEngine<'a, I: ReviewInference + ?Sized> {
    inference: &'a I,
}

impl<'a, I: ReviewInference + ?Sized> TickTieEngine<'a, I> {
    pub fn new(inference: &'a I) -> Self {
        Self { inference }
    }

    pub fn run(
        &self,
        revised: &Document,
        email_text: &str,
        tolerance: f64,
    ) -> Result<TickTieReport, TrackError> {
        let _span = info_span!("tick_tie", pages = revised.page_count()).entered();

        if revised.is_empty() {
            return Ok(TickTieReport::default());
        }

        let mut transcript = Transcript::new();
        let facts = self
            .inference
            .extract_facts(&mut transcript, revised, email_text)
            .map_err(|e| TrackError::new(Stage::ExtractFacts, e))?;

        let facts = dedup_verbatim(facts);
        let facts = truncate_with_diversity(facts, FACT_CAP);

        self.inference
            .compare(&facts, tolerance)
            .map_err(|e| TrackError::new(Stage::Compare, e))
    }
}

/// Drop facts restating the same literal for the same metric on the same
/// page; the first occurrence is kept.
pub fn dedup_verbatim(facts: Vec<Fact>) -> Vec<Fact> {
    let mut seen: BTreeSet<(u32, MetricKey, String)> = BTreeSet::new();
    facts
        .into_iter()
        .filter(|f| seen.insert((f.page, f.key(), f.raw_value_str.clone())))
        .collect()
}

/// Enforce the fact cap, preferring breadth across distinct metrics over
/// repeated captures of one: facts are taken round-robin across metric keys
/// in first-appearance order, then restored to extraction order.
pub fn truncate_with_diversity(facts: Vec<Fact>, cap: usize) -> Vec<Fact> {
    if facts.len() <= cap {
        return facts;
    }
    warn!(
        total = facts.len(),
        cap, "fact cap exceeded; truncating with metric diversity"
    );

    let mut by_key: Vec<(MetricKey, Vec<(usize, &Fact)>)> = Vec::new();
    for (i, fact) in facts.iter().enumerate() {
        let key = fact.key();
        match by_key.iter_mut().find(|(k, _)| *k == key) {
            Some((_, bucket)) => bucket.push((i, fact)),
            None => by_key.push((key, vec![(i, fact)])),
        }
    }

    let mut picked: Vec<usize> = Vec::with_capacity(cap);
    let mut round = 0;
    while picked.len() < cap {
        let mut took_any = false;
        for (_, bucket) in &by_key {
            if let Some((i, _)) = bucket.get(round) {
                picked.push(*i);
                took_any = true;
                if picked.len() == cap {
                    break;
                }
            }
        }
        if !took_any {
            break;
        }
        round += 1;
    }

    picked.sort_unstable();
    let picked: BTreeSet<usize> = picked.into_iter().collect();
    facts
        .into_iter()
        .enumerate()
        .filter(|(i, _)| picked.contains(i))
        .map(|(_, f)| f)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(id: &str, metric: &str, value: f64, raw: &str, page: u32) -> Fact {
        Fact {
            id: id.into(),
            metric_label: metric.replace('_', " "),
            entity: None,
            metric: metric.into(),
            period: None,
            scenario: None,
            value,
            raw_value_str: raw.into(),
            unit: None,
            page,
            source_text: String::new(),
        }
    }

    #[test]
    fn dedup_collapses_verbatim_repeats_on_one_page() {
        let facts = vec![
            fact("F1", "revenue", 100.0, "$100mm", 2),
            fact("F2", "revenue", 100.0, "$100mm", 2),
            fact("F3", "revenue", 100.0, "$100mm", 5),
        ];
        let deduped = dedup_verbatim(facts);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].id, "F1");
        assert_eq!(deduped[1].page, 5);
    }

    #[test]
    fn dedup_keeps_differing_literals_on_one_page() {
        let facts = vec![
            fact("F1", "revenue", 100.0, "$100mm", 2),
            fact("F2", "revenue", 110.0, "$110mm", 2),
        ];
        assert_eq!(dedup_verbatim(facts).len(), 2);
    }

    #[test]
    fn truncation_noop_under_cap() {
        let facts = vec![fact("F1", "revenue", 100.0, "$100mm", 2)];
        assert_eq!(truncate_with_diversity(facts.clone(), 100), facts);
    }

    #[test]
    fn truncation_keeps_every_metric_represented() {
        // 10 metrics x 3 captures each, cap 10: one fact per metric survives.
        let mut facts = Vec::new();
        for m in 0..10 {
            for p in 0..3u32 {
                facts.push(fact(
                    &format!("F{m}_{p}"),
                    &format!("metric_{m}"),
                    1.0,
                    "1",
                    p + 1,
                ));
            }
        }
        let truncated = truncate_with_diversity(facts, 10);
        assert_eq!(truncated.len(), 10);
        let metrics: BTreeSet<String> = truncated.iter().map(|f| f.metric.clone()).collect();
        assert_eq!(metrics.len(), 10);
    }

    #[test]
    fn truncation_preserves_extraction_order() {
        let mut facts = Vec::new();
        for m in 0..5 {
            for p in 0..4u32 {
                facts.push(fact(
                    &format!("F{m}_{p}"),
                    &format!("metric_{m}"),
                    1.0,
                    "1",
                    p + 1,
                ));
            }
        }
        let truncated = truncate_with_diversity(facts.clone(), 7);
        assert_eq!(truncated.len(), 7);
        let positions: Vec<usize> = truncated
            .iter()
            .map(|f| facts.iter().position(|o| o.id == f.id).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }
}
