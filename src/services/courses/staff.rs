use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{
    ApiResponse, ErrorCode, auth::Session, courses::JoinAsStaffRequest, storage_error_response,
};
use crate::services::access::course_not_found;

/// 教师或助教以教职参与者身份加入课程，可提交作业
pub async fn join_as_staff(
    service: &CourseService,
    session: Session,
    join: JoinAsStaffRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if !session.role.is_staff() {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Only teachers and assistants can join as staff",
        )));
    }

    let storage = service.get_storage(request);
    match storage.get_course_by_id(join.course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(course_not_found()),
        Err(e) => return Ok(storage_error_response(e, "Load course")),
    }

    match storage
        .join_course_as_staff(join.course_id, session.account_id)
        .await
    {
        Ok(true) => Ok(HttpResponse::Created().json(ApiResponse::success_empty("Joined course"))),
        Ok(false) => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AlreadyEnrolled,
            "Already participating in this course",
        ))),
        Err(e) => Ok(storage_error_response(e, "Join course")),
    }
}
