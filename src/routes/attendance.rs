use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use crate::auth::AuthUser;
use crate::core::{summarize, summarize_by_course, summarize_by_student, within_range};
use crate::models::{AttendanceQuery, AttendanceResponse};
use crate::routes::{json_error, AppState};
use crate::services::CampusError;

/// Configure attendance statistics routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/attendance/students/{student_id}", web::get().to(student_attendance))
        .route("/attendance/courses/{course_id}", web::get().to(course_attendance));
}

/// Attendance of one student, broken down per course
///
/// GET /api/v1/attendance/students/{studentId}?from=...&to=...
async fn student_attendance(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<String>,
    query: web::Query<AttendanceQuery>,
) -> impl Responder {
    let student_id = path.into_inner();

    match state.campus.attendance_for_student(&student_id).await {
        Ok(records) => {
            let in_range: Vec<_> = within_range(&records, query.from, query.to).collect();

            tracing::debug!("Summarizing {} attendance records for student {}", in_range.len(), student_id);

            HttpResponse::Ok().json(AttendanceResponse {
                overall: summarize(&student_id, in_range.iter().copied()),
                breakdown: summarize_by_course(in_range.iter().copied()),
                subject_id: student_id,
            })
        }
        Err(e) => campus_error(e, &student_id),
    }
}

/// Attendance in one course, broken down per student
///
/// GET /api/v1/attendance/courses/{courseId}?from=...&to=...
async fn course_attendance(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<String>,
    query: web::Query<AttendanceQuery>,
) -> impl Responder {
    let course_id = path.into_inner();

    match state.campus.attendance_for_course(&course_id).await {
        Ok(records) => {
            let in_range: Vec<_> = within_range(&records, query.from, query.to).collect();

            tracing::debug!("Summarizing {} attendance records for course {}", in_range.len(), course_id);

            HttpResponse::Ok().json(AttendanceResponse {
                overall: summarize(&course_id, in_range.iter().copied()),
                breakdown: summarize_by_student(in_range.iter().copied()),
                subject_id: course_id,
            })
        }
        Err(e) => campus_error(e, &course_id),
    }
}

fn campus_error(e: CampusError, subject_id: &str) -> HttpResponse {
    match e {
        CampusError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "Not found", e),
        _ => {
            tracing::error!("Failed to fetch attendance for {}: {}", subject_id, e);
            json_error(StatusCode::BAD_GATEWAY, "Failed to fetch attendance", e)
        }
    }
}
