// Core algorithm exports
pub mod attendance;
pub mod filters;
pub mod recency;
pub mod recommender;
pub mod scoring;

pub use attendance::{attendance_percentage, summarize, summarize_by_course, summarize_by_student, within_range};
pub use filters::{into_candidates, is_upcoming, matches_categories};
pub use recency::{has_recent_view, is_within_window, latest_view};
pub use recommender::{RankResult, RecommendError, Recommender};
pub use scoring::calculate_relevance_score;
