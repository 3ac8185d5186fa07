use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::CategoryInterest;

/// Request to rank upcoming events for the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
    /// Restrict candidates to a single category
    #[validate(length(min = 1))]
    #[serde(default)]
    pub category: Option<String>,
}

/// Request to replace the caller's declared interests
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateInterestsRequest {
    #[validate(custom(function = "validate_categories"))]
    #[serde(default)]
    pub categories: Vec<CategoryInterest>,
    #[validate(length(max = 24), custom(function = "validate_hours"))]
    #[serde(alias = "preferred_times", rename = "preferredTimes", default)]
    pub preferred_times: Vec<u8>,
    #[serde(alias = "preferred_locations", rename = "preferredLocations", default)]
    pub preferred_locations: Vec<String>,
}

fn validate_categories(categories: &Vec<CategoryInterest>) -> Result<(), ValidationError> {
    if categories.iter().any(|c| c.category.trim().is_empty()) {
        return Err(ValidationError::new("empty_category"));
    }
    Ok(())
}

fn validate_hours(hours: &Vec<u8>) -> Result<(), ValidationError> {
    if hours.iter().any(|h| *h > 23) {
        return Err(ValidationError::new("hour_out_of_range"));
    }
    Ok(())
}

/// Request to append one entry to the caller's interaction log
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordInteractionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "event_id", rename = "eventId")]
    pub event_id: String,
    #[serde(alias = "interaction_type", rename = "interactionType")]
    pub interaction_type: String,
}

/// Optional date range applied to attendance statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceQuery {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}
