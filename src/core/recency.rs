use chrono::{DateTime, Duration, Utc};
use crate::models::{Interaction, InteractionType};

/// Most recent `view` entry of an interaction log
///
/// The log is append-only but not trusted to be sorted, so the entry with
/// the latest timestamp wins. Among equal timestamps the later entry wins.
#[inline]
pub fn latest_view(log: &[Interaction]) -> Option<&Interaction> {
    log.iter()
        .filter(|i| i.interaction_type == InteractionType::View)
        .max_by_key(|i| i.timestamp)
}

/// Check whether `timestamp` lies within `window_days` before `now`
///
/// Timestamps later than `now` count as age zero.
#[inline]
pub fn is_within_window(timestamp: DateTime<Utc>, now: DateTime<Utc>, window_days: i64) -> bool {
    let age = (now - timestamp).max(Duration::zero());
    age < Duration::days(window_days)
}

/// Check whether the log's most recent view happened within the window
pub fn has_recent_view(log: &[Interaction], now: DateTime<Utc>, window_days: i64) -> bool {
    latest_view(log)
        .map(|view| is_within_window(view.timestamp, now, window_days))
        .unwrap_or(false)
}
