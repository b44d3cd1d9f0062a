//! Deterministic grouping and tolerance comparison over extracted facts.
//!
//! Facts sharing a `MetricKey` form one metric group. Groups supported by a
//! single distinct page are dropped; every other group lands in exactly one
//! of `ties_out` (all pairwise differences within tolerance) or `check`.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{CheckItem, Fact, MetricKey, PageValue, TickTieReport, TieOut};

/// Classify every metric group spanning two or more pages.
pub fn compare_facts(facts: &[Fact], tolerance: f64) -> TickTieReport {
    let mut report = TickTieReport::default();

    for group in group_facts(facts).into_values() {
        let pages: BTreeSet<u32> = group.iter().map(|f| f.page).collect();
        if pages.len() < 2 {
            continue;
        }

        let label = group_label(&group);

        if let Some((a, b)) = unit_clash(&group) {
            // Unknown whether these denote the same metric; never compared
            // numerically. Surfaced for review rather than dropped.
            let reason = format!(
                "{label} is stated in mixed units across pages ({a} vs {b}); \
                 flagged in case these do not refer to the same metric."
            );
            report.check.push(CheckItem {
                metric_label: label,
                values_by_page: values_by_page(&group),
                reason,
            });
            continue;
        }

        let (min_fact, max_fact) = extremes(&group);
        if max_fact.value - min_fact.value <= tolerance {
            report.ties_out.push(TieOut {
                metric_label: label,
                canonical_value: canonical_value(&group),
                pages: pages.into_iter().collect(),
            });
        } else {
            let reason = format!(
                "{label} appears as {} on page {} and {} on page {}.",
                min_fact.display_value(),
                min_fact.page,
                max_fact.display_value(),
                max_fact.page
            );
            report.check.push(CheckItem {
                metric_label: label,
                values_by_page: values_by_page(&group),
                reason,
            });
        }
    }

    report
}

/// Group facts by key. `BTreeMap` keeps the output order deterministic;
/// facts within a group keep extraction order.
pub fn group_facts(facts: &[Fact]) -> BTreeMap<MetricKey, Vec<&Fact>> {
    let mut groups: BTreeMap<MetricKey, Vec<&Fact>> = BTreeMap::new();
    for fact in facts {
        groups.entry(fact.key()).or_default().push(fact);
    }
    groups
}

/// The most complete label in the group: longest wins.
fn group_label(group: &[&Fact]) -> String {
    group
        .iter()
        .max_by_key(|f| f.metric_label.len())
        .map(|f| f.metric_label.clone())
        .unwrap_or_default()
}

/// Two facts carrying different known units cannot be compared numerically.
/// Unknown (`None`) units are not treated as a clash.
fn unit_clash(group: &[&Fact]) -> Option<(String, String)> {
    let known: BTreeSet<&str> = group.iter().filter_map(|f| f.unit.as_deref()).collect();
    let mut iter = known.into_iter();
    match (iter.next(), iter.next()) {
        (Some(a), Some(b)) => Some((a.to_string(), b.to_string())),
        _ => None,
    }
}

/// Min- and max-valued facts. All pairwise differences are within tolerance
/// exactly when the extremes are.
fn extremes<'a>(group: &[&'a Fact]) -> (&'a Fact, &'a Fact) {
    let mut min = group[0];
    let mut max = group[0];
    for &fact in group {
        if fact.value < min.value {
            min = fact;
        }
        if fact.value > max.value {
            max = fact;
        }
    }
    (min, max)
}

/// Representative value for a consistent group: the most frequent on-slide
/// literal, earliest page on ties.
fn canonical_value(group: &[&Fact]) -> String {
    let mut counts: BTreeMap<String, (usize, u32)> = BTreeMap::new();
    for fact in group {
        let entry = counts
            .entry(fact.display_value())
            .or_insert((0, fact.page));
        entry.0 += 1;
        entry.1 = entry.1.min(fact.page);
    }
    counts
        .into_iter()
        .min_by_key(|(_, (count, first_page))| (std::cmp::Reverse(*count), *first_page))
        .map(|(value, _)| value)
        .unwrap_or_default()
}

fn values_by_page(group: &[&Fact]) -> Vec<PageValue> {
    let mut values: Vec<PageValue> = group
        .iter()
        .map(|f| PageValue {
            page: f.page,
            value: f.display_value(),
        })
        .collect();
    values.sort_by_key(|v| v.page);
    values
}
