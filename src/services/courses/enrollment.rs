//! 选课与退课
//!
//! 未提供 username 时学生为自己操作；提供时由课程管理者为该学生操作。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use super::CourseService;
use crate::errors::LmsError;
use crate::models::{
    ApiResponse, ErrorCode,
    accounts::AccountRole,
    auth::Session,
    courses::EnrollmentRequest,
    storage_error_response,
};
use crate::services::access::{course_access, course_not_found};
use crate::services::respond_on_err;
use crate::storage::Storage;

fn student_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::StudentNotFound,
        "Student not found",
    ))
}

/// 确定要操作的学生账号
async fn target_student(
    storage: &Arc<dyn Storage>,
    session: &Session,
    enrollment: &EnrollmentRequest,
) -> Result<i64, HttpResponse> {
    let username = enrollment
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());

    let Some(username) = username else {
        if session.role != AccountRole::Student {
            return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::Forbidden,
                "Only students can enroll themselves",
            )));
        }
        return match storage.get_course_by_id(enrollment.course_id).await {
            Ok(Some(_)) => Ok(session.account_id),
            Ok(None) => Err(course_not_found()),
            Err(e) => Err(storage_error_response(e, "Load course")),
        };
    };

    let access = course_access(storage, session, enrollment.course_id).await?;
    access.require_manager()?;

    match storage.get_account_by_username(username).await {
        Ok(Some(account)) if account.role == AccountRole::Student => Ok(account.id),
        Ok(_) => Err(student_not_found()),
        Err(e) => Err(storage_error_response(e, "Load student")),
    }
}

pub async fn enroll(
    service: &CourseService,
    session: Session,
    enrollment: EnrollmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let account_id = respond_on_err!(target_student(&storage, &session, &enrollment).await);

    match storage.enroll_student(enrollment.course_id, account_id).await {
        Ok(true) => {
            info!(
                "Account {} enrolled in course {} by {}",
                account_id, enrollment.course_id, session.username
            );
            Ok(HttpResponse::Created().json(ApiResponse::success_empty("Enrolled successfully")))
        }
        Ok(false) => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AlreadyEnrolled,
            "Already enrolled in this course",
        ))),
        Err(LmsError::NotFound(_)) => Ok(student_not_found()),
        Err(e) => Ok(storage_error_response(e, "Enroll")),
    }
}

/// 退课，已有的提交与成绩保留
pub async fn unenroll(
    service: &CourseService,
    session: Session,
    enrollment: EnrollmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let account_id = respond_on_err!(target_student(&storage, &session, &enrollment).await);

    match storage
        .unenroll_student(enrollment.course_id, account_id)
        .await
    {
        Ok(true) => {
            info!(
                "Account {} unenrolled from course {} by {}",
                account_id, enrollment.course_id, session.username
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Unenrolled successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotEnrolled,
            "Not enrolled in this course",
        ))),
        Err(e) => Ok(storage_error_response(e, "Unenroll")),
    }
}
