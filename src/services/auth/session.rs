use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{Selection, Session, SessionResponse},
    storage_error_response,
};

use super::AuthService;

pub async fn handle_session(
    service: &AuthService,
    session: Session,
    selection: Selection,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_account_with_profile(session.account_id).await {
        Ok(Some(found)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SessionResponse {
                account: found.account,
                profile: found.profile,
                selected_course_id: selection.course_id.or(session.selected_course_id),
                selected_assignment_id: selection.assignment_id,
            },
            "Session is valid",
        ))),
        Ok(None) => Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::SessionInvalid,
            "Account no longer exists",
        ))),
        Err(e) => Ok(storage_error_response(e, "Load session")),
    }
}
