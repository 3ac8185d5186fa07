use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use thiserror::Error;
use crate::models::{EventCandidate, EventDocument, InterestProfile, ScoredEvent, ScoringWeights};
use crate::core::{filters::into_candidates, scoring::calculate_relevance_score};

/// Errors raised by the ranking operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendError {
    #[error("No interest profile available for personalization")]
    InvalidProfile,
}

/// Result of the ranking process
#[derive(Debug)]
pub struct RankResult {
    pub events: Vec<ScoredEvent>,
    pub total_candidates: usize,
    pub skipped: usize,
}

/// Ranks candidate events against a user's interest profile
///
/// # Pipeline Stages
/// 1. Candidate validation (malformed documents are skipped)
/// 2. Relevance scoring
/// 3. Ranking, with ties broken by earlier start date then input order
/// 4. Optional truncation
#[derive(Debug, Clone)]
pub struct Recommender {
    weights: ScoringWeights,
}

impl Recommender {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Relevance score of a single candidate
    pub fn score(&self, profile: &InterestProfile, event: &EventCandidate, now: DateTime<Utc>) -> f64 {
        calculate_relevance_score(profile, event, now, &self.weights)
    }

    /// Rank already-validated candidates for a profile
    ///
    /// Total and deterministic for fixed inputs and `now`; an empty
    /// candidate list yields an empty ranking.
    pub fn rank(
        &self,
        profile: &InterestProfile,
        candidates: Vec<EventCandidate>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredEvent> {
        let mut scored: Vec<ScoredEvent> = candidates
            .into_iter()
            .map(|event| {
                let relevance_score = self.score(profile, &event, now);
                ScoredEvent { event, relevance_score }
            })
            .collect();

        // Stable sort: equal keys keep input order
        scored.sort_by(compare_ranked);
        scored
    }

    /// Validate, score and rank raw event documents for an optional profile
    ///
    /// # Arguments
    /// * `profile` - The user's interest profile; `None` fails fast
    /// * `documents` - Event documents as fetched from the document store
    /// * `now` - Reference time for the recency bonus
    /// * `limit` - Maximum number of events to return
    pub fn rank_documents(
        &self,
        profile: Option<&InterestProfile>,
        documents: &[EventDocument],
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<RankResult, RecommendError> {
        let profile = profile.ok_or(RecommendError::InvalidProfile)?;
        let total_candidates = documents.len();

        let (candidates, skipped) = into_candidates(documents);
        let mut events = self.rank(profile, candidates, now);

        if let Some(limit) = limit {
            events.truncate(limit);
        }

        tracing::debug!(
            "Ranked {} events for {} ({} candidates, {} skipped)",
            events.len(),
            profile.user_id,
            total_candidates,
            skipped
        );

        Ok(RankResult {
            events,
            total_candidates,
            skipped,
        })
    }

    /// Unpersonalized fallback: valid candidates in upstream order, score zero
    pub fn unranked(&self, documents: &[EventDocument], limit: Option<usize>) -> RankResult {
        let total_candidates = documents.len();
        let (candidates, skipped) = into_candidates(documents);

        let mut events: Vec<ScoredEvent> = candidates
            .into_iter()
            .map(|event| ScoredEvent { event, relevance_score: 0.0 })
            .collect();

        if let Some(limit) = limit {
            events.truncate(limit);
        }

        RankResult {
            events,
            total_candidates,
            skipped,
        }
    }
}

impl Default for Recommender {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Order by score (descending), then start date (ascending, missing last)
fn compare_ranked(a: &ScoredEvent, b: &ScoredEvent) -> Ordering {
    b.relevance_score
        .partial_cmp(&a.relevance_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| match (a.event.start_date, b.event.start_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
