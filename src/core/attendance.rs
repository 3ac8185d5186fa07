use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use crate::models::{AttendanceRecord, AttendanceStats, AttendanceStatus};

/// Running totals for one group
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    present: u32,
    total: u32,
}

impl Tally {
    #[inline]
    fn add(&mut self, record: &AttendanceRecord) {
        self.total += 1;
        if record.status == AttendanceStatus::Present {
            self.present += 1;
        }
    }

    fn into_stats(self, key: String) -> AttendanceStats {
        AttendanceStats {
            key,
            present_count: self.present,
            total_count: self.total,
            percentage: attendance_percentage(self.present, self.total),
        }
    }
}

/// presentCount / totalCount × 100, clamped to [0, 100]; 0 when nothing recorded
#[inline]
pub fn attendance_percentage(present: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (present as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Keep records dated within `[from, to]` (either bound optional)
pub fn within_range<'a>(
    records: &'a [AttendanceRecord],
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> impl Iterator<Item = &'a AttendanceRecord> + 'a {
    records.iter().filter(move |r| {
        from.map(|f| r.date >= f).unwrap_or(true) && to.map(|t| r.date <= t).unwrap_or(true)
    })
}

/// Fold all records into one overall figure
pub fn summarize<'a>(key: &str, records: impl IntoIterator<Item = &'a AttendanceRecord>) -> AttendanceStats {
    let mut tally = Tally::default();
    for record in records {
        tally.add(record);
    }
    tally.into_stats(key.to_string())
}

/// Group records by an arbitrary key, sorted by key
fn group_by<'a, F>(records: impl IntoIterator<Item = &'a AttendanceRecord>, key_of: F) -> Vec<AttendanceStats>
where
    F: Fn(&AttendanceRecord) -> &str,
{
    let mut groups: BTreeMap<String, Tally> = BTreeMap::new();
    for record in records {
        groups
            .entry(key_of(record).to_string())
            .or_default()
            .add(record);
    }

    groups
        .into_iter()
        .map(|(key, tally)| tally.into_stats(key))
        .collect()
}

/// Per-student statistics
pub fn summarize_by_student<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Vec<AttendanceStats> {
    group_by(records, |r| r.student_id.as_str())
}

/// Per-course statistics
pub fn summarize_by_course<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Vec<AttendanceStats> {
    group_by(records, |r| r.course_id.as_str())
}
