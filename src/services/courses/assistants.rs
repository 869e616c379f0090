use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::errors::LmsError;
use crate::models::{
    ApiResponse, ErrorCode,
    accounts::AccountRole,
    auth::{Selection, Session},
    courses::AddAssistantRequest,
    storage_error_response,
};
use crate::services::access::selected_course_access;
use crate::services::respond_on_err;

fn assistant_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::AssistantNotFound,
        "Assistant not found",
    ))
}

/// 按用户名为当前课程添加助教
pub async fn add_assistant(
    service: &CourseService,
    session: Session,
    selection: Selection,
    assistant: AddAssistantRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let access = respond_on_err!(selected_course_access(&storage, &session, &selection).await);
    respond_on_err!(access.require_administrator());

    let account = match storage
        .get_account_by_username(assistant.username.trim())
        .await
    {
        Ok(Some(account)) if account.role == AccountRole::Assistant => account,
        Ok(_) => return Ok(assistant_not_found()),
        Err(e) => return Ok(storage_error_response(e, "Load assistant")),
    };

    match storage
        .add_course_assistant(access.course.id, account.id)
        .await
    {
        Ok(participant) => {
            info!(
                "Assistant {} added to course {} by {}",
                account.username, access.course.id, session.username
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(participant, "Assistant added")))
        }
        Err(LmsError::NotFound(_)) => Ok(assistant_not_found()),
        Err(LmsError::Conflict(_)) => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::Conflict,
            "Assistant already assigned to this course",
        ))),
        Err(e) => Ok(storage_error_response(e, "Add assistant")),
    }
}

/// 移除助教，`assistant_id` 为助教资料的 id
pub async fn remove_assistant(
    service: &CourseService,
    session: Session,
    selection: Selection,
    assistant_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let access = respond_on_err!(selected_course_access(&storage, &session, &selection).await);
    respond_on_err!(access.require_administrator());

    match storage
        .remove_course_assistant(access.course.id, assistant_id)
        .await
    {
        Ok(true) => {
            info!(
                "Assistant {} removed from course {} by {}",
                assistant_id, access.course.id, session.username
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Assistant removed")))
        }
        Ok(false) => Ok(assistant_not_found()),
        Err(e) => Ok(storage_error_response(e, "Remove assistant")),
    }
}
