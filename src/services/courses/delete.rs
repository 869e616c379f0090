use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::{
    ApiResponse,
    auth::{Selection, Session},
    storage_error_response,
};
use crate::services::access::{course_not_found, selected_course_access};
use crate::services::{file_store, respond_on_err};
use crate::utils::session::{SELECTED_ASSIGNMENT_COOKIE, SELECTED_COURSE_COOKIE, SessionCodec};

/// 删除当前课程及其全部从属数据，提交后删除磁盘文件
pub async fn delete_course(
    service: &CourseService,
    session: Session,
    selection: Selection,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let access = respond_on_err!(selected_course_access(&storage, &session, &selection).await);
    respond_on_err!(access.require_administrator());

    let removed = match storage.delete_course(access.course.id).await {
        Ok(Some(removed)) => removed,
        Ok(None) => return Ok(course_not_found()),
        Err(e) => return Ok(storage_error_response(e, "Delete course")),
    };

    file_store(request).remove_quietly(&removed).await;
    info!(
        "Course {} deleted by {}, {} file(s) removed",
        access.course.id,
        session.username,
        removed.len()
    );

    // 会话令牌不再指向已删除的课程
    let codec = SessionCodec::global();
    let mut session = session;
    session.selected_course_id = None;
    let mut response = HttpResponse::Ok();
    response
        .cookie(codec.expired_cookie(SELECTED_COURSE_COOKIE))
        .cookie(codec.expired_cookie(SELECTED_ASSIGNMENT_COOKIE));
    match codec.session_cookie(&session) {
        Ok(cookie) => {
            response.cookie(cookie);
        }
        Err(e) => tracing::warn!("Failed to re-issue session after course deletion: {}", e),
    }

    Ok(response.json(ApiResponse::success_empty("Course deleted successfully")))
}
