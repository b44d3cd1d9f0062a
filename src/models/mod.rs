pub mod comment;
pub mod document;
pub mod fact;
pub mod report;

pub use comment::{Comment, CommentStatus};
pub use document::{Document, Page};
pub use fact::{CheckItem, Fact, MetricKey, PageValue, TickTieReport, TieOut};
pub use report::{ReviewReport, Track, TrackFailure};
