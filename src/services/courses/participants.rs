use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{
    ApiResponse,
    auth::{Selection, Session},
    storage_error_response,
};
use crate::services::access::selected_course_access;
use crate::services::respond_on_err;

pub async fn list_participants(
    service: &CourseService,
    session: Session,
    selection: Selection,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let access = respond_on_err!(selected_course_access(&storage, &session, &selection).await);

    match storage.list_course_participants(access.course.id).await {
        Ok(participants) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            participants,
            "Participants retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, "List participants")),
    }
}
