use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{ApiResponse, auth::Session, storage_error_response};

pub async fn list_courses(
    service: &CourseService,
    session: Session,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_courses_for_account(session.account_id, session.role)
        .await
    {
        Ok(courses) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            courses,
            "Courses retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, "List courses")),
    }
}
