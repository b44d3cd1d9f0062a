use serde::{Deserialize, Serialize};

/// One numeric statement extracted from the revised deck.
///
/// Created by fact extraction and immutable afterwards. `value` is the
/// normalized decimal (`"6%"` → 0.06), `raw_value_str` the literal as it
/// appears on the slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub metric_label: String,
    pub entity: Option<String>,
    pub metric: String,
    pub period: Option<String>,
    pub scenario: Option<String>,
    pub value: f64,
    pub raw_value_str: String,
    pub unit: Option<String>,
    pub page: u32,
    pub source_text: String,
}

impl Fact {
    /// Grouping key for tick-and-tie comparison.
    pub fn key(&self) -> MetricKey {
        MetricKey {
            entity: self.entity.clone(),
            metric: self.metric.clone(),
            period: self.period.clone(),
            scenario: self.scenario.clone(),
        }
    }

    /// Human-readable form of the value, preferring the on-slide literal.
    pub fn display_value(&self) -> String {
        if self.raw_value_str.trim().is_empty() {
            format_value(self.value)
        } else {
            self.raw_value_str.clone()
        }
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Identity of a metric group: `(entity?, metric, period?, scenario?)`.
///
/// Null fields are distinct values, not wildcards — a fact with no period
/// never groups with one that has `"2026E"`. Facts distinguished by an
/// explicit scenario (upside vs. base) are separate groups by construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricKey {
    pub entity: Option<String>,
    pub metric: String,
    pub period: Option<String>,
    pub scenario: Option<String>,
}

/// A metric stated consistently (within tolerance) on two or more pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieOut {
    pub metric_label: String,
    pub canonical_value: String,
    pub pages: Vec<u32>,
}

/// One page's value for an inconsistent metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageValue {
    pub page: u32,
    pub value: String,
}

/// A metric stated inconsistently across pages, with a short explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckItem {
    pub metric_label: String,
    pub values_by_page: Vec<PageValue>,
    pub reason: String,
}

/// Tick-and-tie verdict: every metric group spanning two or more pages lands
/// in exactly one of the two buckets. Single-page groups are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickTieReport {
    #[serde(default)]
    pub ties_out: Vec<TieOut>,
    #[serde(default)]
    pub check: Vec<CheckItem>,
}

impl TickTieReport {
    pub fn is_empty(&self) -> bool {
        self.ties_out.is_empty() && self.check.is_empty()
    }
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
    fn key_distinguishes_null_from_populated() {
        let bare = fact("F1", "revenue_growth", 0.06, "6%", 3);
        let mut with_period = bare.clone();
        with_period.period = Some("2026E".into());
        assert_ne!(bare.key(), with_period.key());
    }

    #[test]
    fn key_groups_identical_null_fields() {
        let a = fact("F1", "revenue_growth", 0.06, "6%", 3);
        let b = fact("F2", "revenue_growth", 0.055, "5.5%", 12);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn display_value_prefers_raw_literal() {
        let f = fact("F1", "revenue_growth", 0.06, "6%", 3);
        assert_eq!(f.display_value(), "6%");
    }

    #[test]
    fn display_value_falls_back_to_normalized() {
        let f = fact("F1", "net_debt", 1_200_000_000.0, "", 5);
        assert_eq!(f.display_value(), "1200000000");
    }

    #[test]
    fn empty_report_serializes_both_buckets() {
        let json = serde_json::to_string(&TickTieReport::default()).unwrap();
        assert!(json.contains("ties_out"));
        assert!(json.contains("check"));
    }
}
