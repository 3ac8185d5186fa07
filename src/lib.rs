//! Vidya Match - event recommendation and attendance statistics for E-Vidya Saathi
//!
//! This library provides the relevance scorer that ranks upcoming campus events
//! against a student's interest profile, and the fold that turns attendance
//! records into per-student and per-course percentages.

pub mod auth;
pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Recommender, RankResult, RecommendError, calculate_relevance_score};
pub use crate::models::{EventCandidate, EventDocument, InterestProfile, ScoredEvent, ScoringWeights};
