use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Validation failures raised while building domain records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Skill level must be between 1 and 3, got {0}")]
    InvalidSkillLevel(u8),

    #[error("Hour of day must be between 0 and 23, got {0}")]
    InvalidHour(i64),

    #[error("Event {event_id} is missing required field '{field}'")]
    MissingField { event_id: String, field: &'static str },

    #[error("Unknown interaction type: {0}")]
    UnknownInteractionType(String),

    #[error("Category name must not be empty")]
    EmptyCategory,
}

/// Self-declared proficiency in a category (1 = beginner, 3 = advanced)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SkillLevel(u8);

impl SkillLevel {
    pub const BEGINNER: SkillLevel = SkillLevel(1);
    pub const INTERMEDIATE: SkillLevel = SkillLevel(2);
    pub const ADVANCED: SkillLevel = SkillLevel(3);

    pub fn new(level: u8) -> Result<Self, ModelError> {
        if (1..=3).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ModelError::InvalidSkillLevel(level))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for SkillLevel {
    fn default() -> Self {
        Self::BEGINNER
    }
}

impl TryFrom<u8> for SkillLevel {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SkillLevel> for u8 {
    fn from(level: SkillLevel) -> Self {
        level.0
    }
}

/// A category the user follows, with their skill level in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInterest {
    pub category: String,
    #[serde(rename = "skillLevel", default)]
    pub skill_level: SkillLevel,
}

impl CategoryInterest {
    pub fn new(category: impl Into<String>, skill_level: SkillLevel) -> Self {
        Self {
            category: category.into(),
            skill_level,
        }
    }
}

/// Kind of interaction a user had with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    View,
    Like,
    Dislike,
    Feedback,
}

impl InteractionType {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionType::View => "view",
            InteractionType::Like => "like",
            InteractionType::Dislike => "dislike",
            InteractionType::Feedback => "feedback",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "view" => Ok(InteractionType::View),
            "like" => Ok(InteractionType::Like),
            "dislike" => Ok(InteractionType::Dislike),
            "feedback" => Ok(InteractionType::Feedback),
            other => Err(ModelError::UnknownInteractionType(other.to_string())),
        }
    }
}

/// One entry of a profile's append-only interaction log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(rename = "eventId")]
    pub event_id: String,
    #[serde(rename = "interactionType")]
    pub interaction_type: InteractionType,
    pub timestamp: DateTime<Utc>,
}

/// A user's declared preferences plus their interaction history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterestProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub categories: Vec<CategoryInterest>,
    #[serde(rename = "preferredTimes", default)]
    pub preferred_times: BTreeSet<u8>,
    #[serde(rename = "preferredLocations", default)]
    pub preferred_locations: BTreeSet<String>,
    #[serde(rename = "interactionLog", default)]
    pub interaction_log: Vec<Interaction>,
}

impl InterestProfile {
    /// Empty profile, as created on first access
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Skill level of the first entry matching `category`
    pub fn skill_for(&self, category: &str) -> Option<SkillLevel> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.skill_level)
    }

    pub fn category_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.categories
            .iter()
            .filter(|c| seen.insert(c.category.as_str()))
            .map(|c| c.category.clone())
            .collect()
    }

    /// Replace the declared preferences, leaving the interaction log untouched
    pub fn set_preferences(
        &mut self,
        categories: Vec<CategoryInterest>,
        preferred_times: impl IntoIterator<Item = u8>,
        preferred_locations: impl IntoIterator<Item = String>,
    ) -> Result<(), ModelError> {
        let times = preferred_times
            .into_iter()
            .map(validate_hour)
            .collect::<Result<BTreeSet<u8>, _>>()?;

        if categories.iter().any(|c| c.category.trim().is_empty()) {
            return Err(ModelError::EmptyCategory);
        }

        self.categories = categories;
        self.preferred_times = times;
        self.preferred_locations = preferred_locations
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Ok(())
    }
}

fn validate_hour(hour: u8) -> Result<u8, ModelError> {
    if hour < 24 {
        Ok(hour)
    } else {
        Err(ModelError::InvalidHour(hour as i64))
    }
}

/// Event as delivered by the campus document store
///
/// Every field other than the id is optional here; [`EventCandidate`]
/// is the validated projection used for scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDocument {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "scheduledHour", alias = "hour", default)]
    pub scheduled_hour: Option<i64>,
    #[serde(default, alias = "venue")]
    pub location: Option<String>,
    #[serde(rename = "startDate", alias = "date", default)]
    pub start_date: Option<DateTime<Utc>>,
}

/// Read-only projection of an event, sufficient for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCandidate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub category: String,
    #[serde(rename = "scheduledHour")]
    pub scheduled_hour: u8,
    pub location: String,
    #[serde(rename = "startDate")]
    pub start_date: Option<DateTime<Utc>>,
}

impl TryFrom<EventDocument> for EventCandidate {
    type Error = ModelError;

    fn try_from(doc: EventDocument) -> Result<Self, Self::Error> {
        let missing = |field| ModelError::MissingField {
            event_id: doc.id.clone(),
            field,
        };

        let category = doc
            .category
            .clone()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| missing("category"))?;
        let hour = doc.scheduled_hour.ok_or_else(|| missing("scheduledHour"))?;
        let location = doc
            .location
            .clone()
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| missing("location"))?;

        let scheduled_hour = u8::try_from(hour)
            .ok()
            .filter(|h| *h < 24)
            .ok_or(ModelError::InvalidHour(hour))?;

        Ok(Self {
            id: doc.id,
            title: doc.title,
            category,
            scheduled_hour,
            location,
            start_date: doc.start_date,
        })
    }
}

/// Candidate annotated with its relevance score for one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEvent {
    #[serde(flatten)]
    pub event: EventCandidate,
    #[serde(rename = "relevanceScore")]
    pub relevance_score: f64,
}

/// Attendance mark for one student in one course session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "studentId", alias = "student")]
    pub student_id: String,
    #[serde(rename = "courseId", alias = "course")]
    pub course_id: String,
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
}

/// Attendance totals for one student or one course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub key: String,
    #[serde(rename = "presentCount")]
    pub present_count: u32,
    #[serde(rename = "totalCount")]
    pub total_count: u32,
    pub percentage: f64,
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub category_base: f64,
    pub skill_multiplier: f64,
    pub time_match: f64,
    pub location_match: f64,
    pub recency_bonus: f64,
    pub recency_window_days: i64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            category_base: 10.0,
            skill_multiplier: 2.0,
            time_match: 5.0,
            location_match: 5.0,
            recency_bonus: 3.0,
            recency_window_days: 7,
        }
    }
}
