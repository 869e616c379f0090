use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, submission_owner};
use crate::models::{
    ApiResponse,
    auth::{Selection, Session},
    storage_error_response,
};
use crate::services::access::selected_course_access;
use crate::services::respond_on_err;

/// 作业汇总：每份作业的全部提交与未提交名单
pub async fn list_overviews(
    service: &AssignmentService,
    session: Session,
    selection: Selection,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let access = respond_on_err!(selected_course_access(&storage, &session, &selection).await);
    respond_on_err!(access.require_manager());

    match storage.list_assignment_overviews(access.course.id).await {
        Ok(overviews) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            overviews,
            "Assignments retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, "List assignments")),
    }
}

pub async fn list_mine(
    service: &AssignmentService,
    session: Session,
    selection: Selection,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let access = respond_on_err!(selected_course_access(&storage, &session, &selection).await);
    let (kind, owner_id) = respond_on_err!(submission_owner(&storage, &session).await);

    match storage
        .list_my_assignments(access.course.id, kind, owner_id)
        .await
    {
        Ok(assignments) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            assignments,
            "Assignments retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, "List assignments")),
    }
}
