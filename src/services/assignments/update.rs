use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, assignment_access, assignment_not_found};
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{AssignmentUpdate, UpdateAssignmentRequest, parse_due_date},
    auth::Session,
    storage_error_response,
};
use crate::services::respond_on_err;
use crate::utils::validate::validate_title;

pub async fn update_assignment(
    service: &AssignmentService,
    session: Session,
    assignment_id: i64,
    update: UpdateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let (_, access) = respond_on_err!(assignment_access(&storage, &session, assignment_id).await);
    respond_on_err!(access.require_manager());

    let title = update.title.map(|t| t.trim().to_string());
    if let Some(title) = &title
        && let Err(msg) = validate_title(title)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("Invalid title: {msg}"),
        )));
    }

    // 空字符串清除截止时间
    let due_date = match update.due_date.as_deref().map(str::trim) {
        None => None,
        Some("") => Some(None),
        Some(raw) => match parse_due_date(raw) {
            Ok(ts) => Some(Some(ts)),
            Err(_) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    format!("Invalid due date: {raw}"),
                )));
            }
        },
    };

    let update = AssignmentUpdate {
        title,
        description: update.description.map(|d| d.trim().to_string()),
        due_date,
    };

    match storage.update_assignment(assignment_id, update).await {
        Ok(Some(assignment)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            assignment,
            "Assignment updated successfully",
        ))),
        Ok(None) => Ok(assignment_not_found()),
        Err(e) => Ok(storage_error_response(e, "Update assignment")),
    }
}
