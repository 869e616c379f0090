use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, assignment_access};
use crate::models::{ApiResponse, assignments::SelectAssignmentRequest, auth::Session};
use crate::services::respond_on_err;
use crate::utils::session::{SELECTED_ASSIGNMENT_COOKIE, SELECTED_COURSE_COOKIE, SessionCodec};

/// 选择作业，同时把所属课程设为当前课程
pub async fn select_assignment(
    service: &AssignmentService,
    session: Session,
    select: SelectAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let (assignment, access) =
        respond_on_err!(assignment_access(&storage, &session, select.assignment_id).await);

    let codec = SessionCodec::global();
    Ok(HttpResponse::Ok()
        .cookie(codec.selection_cookie(SELECTED_ASSIGNMENT_COOKIE, assignment.id))
        .cookie(codec.selection_cookie(SELECTED_COURSE_COOKIE, access.course.id))
        .json(ApiResponse::success(assignment, "Assignment selected")))
}
