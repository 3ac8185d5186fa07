use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use crate::models::{AttendanceRecord, EventDocument};

/// Errors that can occur when talking to the campus API
#[derive(Debug, Error)]
pub enum CampusError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid service token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Client for the E-Vidya Saathi REST API
///
/// The campus API owns events and attendance; this service only reads:
/// - Upcoming events, optionally restricted to categories
/// - Attendance records for a student or a course
pub struct CampusClient {
    base_url: String,
    service_token: Option<String>,
    client: Client,
}

impl CampusClient {
    /// Create a new campus API client
    pub fn new(
        base_url: String,
        service_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CampusError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_token,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch events starting after `after`, restricted to `categories` when non-empty
    ///
    /// Returns the readable documents and the number of unreadable ones.
    pub async fn upcoming_events(
        &self,
        categories: &[String],
        after: DateTime<Utc>,
    ) -> Result<(Vec<EventDocument>, usize), CampusError> {
        let mut url = format!(
            "{}/api/events?upcoming=true&after={}",
            self.base_url,
            urlencoding::encode(&after.to_rfc3339_opts(SecondsFormat::Secs, true))
        );

        if !categories.is_empty() {
            url.push_str("&categories=");
            url.push_str(&urlencoding::encode(&categories.join(",")));
        }

        tracing::debug!("Fetching upcoming events from: {}", url);

        let json = self.get_json(&url, "events").await?;
        let (events, unreadable) = parse_documents::<EventDocument>(&json, "events")?;

        tracing::debug!("Fetched {} upcoming events ({} unreadable)", events.len(), unreadable);

        Ok((events, unreadable))
    }

    /// Attendance records of one student across all courses
    pub async fn attendance_for_student(&self, student_id: &str) -> Result<Vec<AttendanceRecord>, CampusError> {
        let url = format!(
            "{}/api/attendance/student/{}",
            self.base_url,
            urlencoding::encode(student_id)
        );

        let json = self.get_json(&url, &format!("attendance for student {}", student_id)).await?;
        parse_documents(&json, "records").map(|(records, _)| records)
    }

    /// Attendance records of all students in one course
    pub async fn attendance_for_course(&self, course_id: &str) -> Result<Vec<AttendanceRecord>, CampusError> {
        let url = format!(
            "{}/api/attendance/course/{}",
            self.base_url,
            urlencoding::encode(course_id)
        );

        let json = self.get_json(&url, &format!("attendance for course {}", course_id)).await?;
        parse_documents(&json, "records").map(|(records, _)| records)
    }

    async fn get_json(&self, url: &str, what: &str) -> Result<Value, CampusError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.service_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CampusError::NotFound(what.to_string()));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CampusError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Campus API request for {} failed: {} - {}", what, status, body);
            return Err(CampusError::ApiError(format!("Failed to fetch {}: {}", what, status)));
        }

        Ok(response.json().await?)
    }
}

/// Extract a document list from either a bare array or `{<key>: [...]}` / `{data: [...]}`
///
/// Documents that fail to deserialize are dropped with a warning and counted.
fn parse_documents<T: DeserializeOwned>(json: &Value, key: &str) -> Result<(Vec<T>, usize), CampusError> {
    let documents = json
        .as_array()
        .or_else(|| json.get(key).and_then(|d| d.as_array()))
        .or_else(|| json.get("data").and_then(|d| d.as_array()))
        .ok_or_else(|| CampusError::InvalidResponse(format!("Missing {} array", key)))?;

    let mut unreadable = 0;
    let parsed = documents
        .iter()
        .filter_map(|doc| match serde_json::from_value(doc.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Dropping unreadable {} document: {}", key, e);
                unreadable += 1;
                None
            }
        })
        .collect();

    Ok((parsed, unreadable))
}
