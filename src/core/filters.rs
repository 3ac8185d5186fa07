use chrono::{DateTime, Utc};
use crate::models::{EventCandidate, EventDocument};

/// Validate raw event documents into scoring candidates
///
/// Malformed documents are skipped and logged rather than failing the whole
/// batch. Returns the valid candidates in input order and the skip count.
pub fn into_candidates(documents: &[EventDocument]) -> (Vec<EventCandidate>, usize) {
    let mut skipped = 0;
    let candidates = documents
        .iter()
        .filter_map(|doc| match EventCandidate::try_from(doc.clone()) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                tracing::warn!("Skipping malformed event candidate: {}", e);
                skipped += 1;
                None
            }
        })
        .collect();

    (candidates, skipped)
}

/// Check if an event document has not started yet
///
/// Documents without a start date are kept; the campus API decides what
/// counts as upcoming for those.
#[inline]
pub fn is_upcoming(doc: &EventDocument, now: DateTime<Utc>) -> bool {
    doc.start_date.map(|start| start >= now).unwrap_or(true)
}

/// Check if an event document belongs to one of `categories`
///
/// An empty category list matches everything.
#[inline]
pub fn matches_categories(doc: &EventDocument, categories: &[String]) -> bool {
    if categories.is_empty() {
        return true;
    }

    doc.category
        .as_ref()
        .map(|c| categories.iter().any(|wanted| wanted == c))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn create_test_document(id: &str, category: Option<&str>, hour: Option<i64>) -> EventDocument {
        EventDocument {
            id: id.to_string(),
            title: Some(format!("Event {}", id)),
            category: category.map(str::to_string),
            scheduled_hour: hour,
            location: Some("Library".to_string()),
            start_date: None,
        }
    }

    #[test]
    fn test_malformed_documents_skipped() {
        let docs = vec![
            create_test_document("1", Some("Sports"), Some(10)),
            create_test_document("2", None, Some(10)),
            create_test_document("3", Some("Sports"), None),
            create_test_document("4", Some("Music"), Some(18)),
        ];

        let (candidates, skipped) = into_candidates(&docs);

        assert_eq!(skipped, 2);
        let ids: Vec<_> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_is_upcoming() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let mut doc = create_test_document("1", Some("Sports"), Some(10));
        assert!(is_upcoming(&doc, now));

        doc.start_date = Some(now - Duration::days(1));
        assert!(!is_upcoming(&doc, now));

        doc.start_date = Some(now + Duration::days(1));
        assert!(is_upcoming(&doc, now));
    }

    #[test]
    fn test_matches_categories() {
        let doc = create_test_document("1", Some("Sports"), Some(10));

        assert!(matches_categories(&doc, &[]));
        assert!(matches_categories(&doc, &["Music".to_string(), "Sports".to_string()]));
        assert!(!matches_categories(&doc, &["Music".to_string()]));
    }
}
