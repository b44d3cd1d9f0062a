use uuid::Uuid;

use super::Stage;

/// Optional tracing metadata threaded alongside inference calls.
///
/// Carries a workflow identifier and a source label; has no effect on
/// pipeline behavior.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub workflow_id: String,
    pub source: Option<String>,
}

impl TraceContext {
    pub fn new(source: &str) -> Self {
        Self {
            workflow_id: format!("wf_{}", Uuid::new_v4().simple()),
            source: Some(source.to_string()),
        }
    }
}

/// One completed stage call: what was sent and what came back.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub stage: Stage,
    pub input: String,
    pub output: String,
}

/// The accumulating conversation of one track.
///
/// Append-only and strictly ordered: every stage call is issued with all
/// prior exchanges as context, which is why stages within a track cannot be
/// reordered or parallelized. Each track owns its own transcript — tracks
/// share no mutable state.
#[derive(Debug, Default)]
pub struct Transcript {
    exchanges: Vec<Exchange>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: Stage, input: impl Into<String>, output: impl Into<String>) {
        self.exchanges.push(Exchange {
            stage,
            input: input.into(),
            output: output.into(),
        });
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut t = Transcript::new();
        t.record(Stage::Detect, "doc", "true");
        t.record(Stage::Extract, "doc", "[]");
        assert_eq!(t.len(), 2);
        assert_eq!(t.exchanges()[0].stage, Stage::Detect);
        assert_eq!(t.exchanges()[1].stage, Stage::Extract);
    }

    #[test]
    fn trace_context_ids_are_unique() {
        let a = TraceContext::new("test");
        let b = TraceContext::new("test");
        assert_ne!(a.workflow_id, b.workflow_id);
        assert!(a.workflow_id.starts_with("wf_"));
    }
}
