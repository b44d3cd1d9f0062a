use serde::{Deserialize, Serialize};

use super::comment::Comment;
use super::fact::TickTieReport;

/// The three independent review tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    /// Annotations embedded in the document itself.
    Tags,
    /// Comments extracted from the reviewer email.
    EmailComments,
    /// Cross-page numeric consistency.
    TickTie,
}

impl Track {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::EmailComments => "email_comments",
            Self::TickTie => "tick_tie",
        }
    }
}

/// Record of a track that aborted: which track, at which stage, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFailure {
    pub track: Track,
    pub stage: String,
    pub message: String,
}

/// Assembled output of one review run.
///
/// `tags` and `email_comments` are independent lists and are never merged.
/// A `None` track either was not requested or failed; failed tracks are
/// recorded in `failures` while the remaining tracks still report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub tags: Option<Vec<Comment>>,
    pub email_comments: Option<Vec<Comment>>,
    pub tick_tie: Option<TickTieReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<TrackFailure>,
}

impl ReviewReport {
    /// True when at least one track produced a result.
    pub fn has_results(&self) -> bool {
        self.tags.is_some() || self.email_comments.is_some() || self.tick_tie.is_some()
    }
}
