use chrono::{DateTime, Utc};
use crate::models::{EventCandidate, InterestProfile, ScoringWeights};
use crate::core::recency::has_recent_view;

/// Calculate the relevance score of an event for a profile
///
/// Scoring formula (additive, not normalized):
/// score = (
///     category_base + skill_multiplier * skill_level   # event category is followed
///     + time_match                                       # scheduled hour is preferred
///     + location_match                                   # location is preferred
///     + recency_bonus                                    # latest view within window
/// )
///
/// With default weights the maximum is 10 + 6 + 5 + 5 + 3 = 29.
pub fn calculate_relevance_score(
    profile: &InterestProfile,
    event: &EventCandidate,
    now: DateTime<Utc>,
    weights: &ScoringWeights,
) -> f64 {
    let total = category_score(profile, event, weights)
        + time_score(profile, event, weights)
        + location_score(profile, event, weights)
        + recency_score(profile, now, weights);

    total.max(0.0)
}

/// Base points plus a skill bonus when the event category is followed
#[inline]
fn category_score(profile: &InterestProfile, event: &EventCandidate, weights: &ScoringWeights) -> f64 {
    match profile.skill_for(&event.category) {
        Some(skill) => weights.category_base + weights.skill_multiplier * skill.value() as f64,
        None => 0.0,
    }
}

#[inline]
fn time_score(profile: &InterestProfile, event: &EventCandidate, weights: &ScoringWeights) -> f64 {
    if profile.preferred_times.contains(&event.scheduled_hour) {
        weights.time_match
    } else {
        0.0
    }
}

#[inline]
fn location_score(profile: &InterestProfile, event: &EventCandidate, weights: &ScoringWeights) -> f64 {
    if profile.preferred_locations.contains(&event.location) {
        weights.location_match
    } else {
        0.0
    }
}

/// Bonus for a recently active user; depends on the profile only
#[inline]
fn recency_score(profile: &InterestProfile, now: DateTime<Utc>, weights: &ScoringWeights) -> f64 {
    if has_recent_view(&profile.interaction_log, now, weights.recency_window_days) {
        weights.recency_bonus
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryInterest, Interaction, InteractionType, SkillLevel};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap()
    }

    fn create_test_event(category: &str, hour: u8, location: &str) -> EventCandidate {
        EventCandidate {
            id: "evt".to_string(),
            title: None,
            category: category.to_string(),
            scheduled_hour: hour,
            location: location.to_string(),
            start_date: Some(now() + Duration::days(3)),
        }
    }

    fn create_test_profile(skill: u8) -> InterestProfile {
        let mut profile = InterestProfile::new("student");
        profile.categories = vec![CategoryInterest::new(
            "Technology",
            SkillLevel::new(skill).unwrap(),
        )];
        profile.preferred_times.insert(14);
        profile.preferred_locations.insert("Seminar Hall".to_string());
        profile
    }

    #[test]
    fn test_category_only() {
        let profile = create_test_profile(2);
        let event = create_test_event("Technology", 9, "Ground");

        let score = calculate_relevance_score(&profile, &event, now(), &ScoringWeights::default());
        assert_eq!(score, 14.0);
    }

    #[test]
    fn test_time_and_location_without_category() {
        let profile = create_test_profile(1);
        let event = create_test_event("Music", 14, "Seminar Hall");

        let score = calculate_relevance_score(&profile, &event, now(), &ScoringWeights::default());
        assert_eq!(score, 10.0);
    }

    #[test]
    fn test_recency_bonus_applies_to_any_event() {
        let mut profile = create_test_profile(1);
        profile.interaction_log.push(Interaction {
            event_id: "other".to_string(),
            interaction_type: InteractionType::View,
            timestamp: now() - Duration::hours(5),
        });
        let event = create_test_event("Music", 9, "Ground");

        let score = calculate_relevance_score(&profile, &event, now(), &ScoringWeights::default());
        assert_eq!(score, 3.0);
    }

    #[test]
    fn test_custom_weights() {
        let profile = create_test_profile(3);
        let event = create_test_event("Technology", 14, "Ground");
        let weights = ScoringWeights {
            category_base: 1.0,
            skill_multiplier: 1.0,
            time_match: 0.5,
            ..ScoringWeights::default()
        };

        let score = calculate_relevance_score(&profile, &event, now(), &weights);
        assert_eq!(score, 4.5);
    }
}
