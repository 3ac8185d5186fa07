use serde::{Deserialize, Serialize};
use crate::models::domain::{AttendanceStats, ScoredEvent};

/// Response for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub events: Vec<ScoredEvent>,
    /// False when the profile could not be loaded and events are unranked
    pub personalized: bool,
    pub total_candidates: usize,
    pub skipped: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cache_entries: Option<u64>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Record interaction response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInteractionResponse {
    pub success: bool,
    pub interaction_id: String,
}

/// Attendance summary for one student or one course
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    pub subject_id: String,
    pub overall: AttendanceStats,
    pub breakdown: Vec<AttendanceStats>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStats;

    #[test]
    fn test_response_fields_are_camel_case() {
        let error = serde_json::to_value(ErrorResponse {
            error: "Not found".to_string(),
            message: "course cs101".to_string(),
            status_code: 404,
        })
        .unwrap();
        assert_eq!(error["statusCode"], 404);

        let recommend = serde_json::to_value(RecommendResponse {
            events: vec![],
            personalized: false,
            total_candidates: 3,
            skipped: 2,
        })
        .unwrap();
        assert_eq!(recommend["totalCandidates"], 3);
        assert!(recommend.get("total_candidates").is_none());

        let attendance = serde_json::to_value(AttendanceResponse {
            subject_id: "cs101".to_string(),
            overall: AttendanceStats {
                key: "cs101".to_string(),
                present_count: 0,
                total_count: 0,
                percentage: 0.0,
            },
            breakdown: vec![],
        })
        .unwrap();
        assert_eq!(attendance["subjectId"], "cs101");
        assert_eq!(attendance["overall"]["presentCount"], 0);

        let recorded = serde_json::to_value(RecordInteractionResponse {
            success: true,
            interaction_id: "id".to_string(),
        })
        .unwrap();
        assert_eq!(recorded["interactionId"], "id");
    }
}
