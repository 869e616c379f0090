use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{Selection, Session},
    courses::{SelectCourseRequest, SelectedCourseResponse},
};
use crate::services::access::{course_access, selected_course_access};
use crate::services::respond_on_err;
use crate::utils::session::{SELECTED_ASSIGNMENT_COOKIE, SELECTED_COURSE_COOKIE, SessionCodec};

/// 选择课程
///
/// 下发 `selectedCourseId` Cookie，同时重新签发会话令牌记录所选课程；
/// 之前选择的作业属于旧课程，一并清除。
pub async fn select_course(
    service: &CourseService,
    session: Session,
    select: SelectCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let access = respond_on_err!(course_access(&storage, &session, select.course_id).await);

    let codec = SessionCodec::global();
    let mut session = session;
    session.selected_course_id = Some(access.course.id);
    let session_cookie = match codec.session_cookie(&session) {
        Ok(cookie) => cookie,
        Err(e) => {
            tracing::error!("Failed to re-issue session: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Failed to update session",
                )),
            );
        }
    };

    Ok(HttpResponse::Ok()
        .cookie(codec.selection_cookie(SELECTED_COURSE_COOKIE, access.course.id))
        .cookie(codec.expired_cookie(SELECTED_ASSIGNMENT_COOKIE))
        .cookie(session_cookie)
        .json(ApiResponse::success(
            SelectedCourseResponse {
                course: access.course,
                my_role: access.role,
            },
            "Course selected",
        )))
}

pub async fn selected_course(
    service: &CourseService,
    session: Session,
    selection: Selection,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let access = respond_on_err!(selected_course_access(&storage, &session, &selection).await);

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SelectedCourseResponse {
            course: access.course,
            my_role: access.role,
        },
        "Selected course retrieved",
    )))
}
