use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, assignment_access, assignment_not_found};
use crate::models::{ApiResponse, auth::Session, storage_error_response};
use crate::services::{file_store, respond_on_err};

/// 删除作业及其资料、提交与审计记录
pub async fn delete_assignment(
    service: &AssignmentService,
    session: Session,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let (_, access) = respond_on_err!(assignment_access(&storage, &session, assignment_id).await);
    respond_on_err!(access.require_manager());

    match storage.delete_assignment(assignment_id).await {
        Ok(Some(removed)) => {
            file_store(request).remove_quietly(&removed).await;
            info!(
                "Assignment {} deleted by {}, {} file(s) removed",
                assignment_id,
                session.username,
                removed.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Assignment deleted successfully")))
        }
        Ok(None) => Ok(assignment_not_found()),
        Err(e) => Ok(storage_error_response(e, "Delete assignment")),
    }
}
