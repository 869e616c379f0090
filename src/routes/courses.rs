use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::{Selection, Session};
use crate::models::courses::{
    AddAssistantRequest, EnrollmentRequest, JoinAsStaffRequest, SelectCourseRequest,
};
use crate::services::CourseService;

// 懒加载的全局 CourseService 实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

pub async fn list_courses(req: HttpRequest, session: Session) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(session, &req).await
}

pub async fn create_course(
    req: HttpRequest,
    session: Session,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.create_course(session, payload, &req).await
}

pub async fn select_course(
    req: HttpRequest,
    session: Session,
    select: web::Json<SelectCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .select_course(session, select.into_inner(), &req)
        .await
}

pub async fn selected_course(
    req: HttpRequest,
    session: Session,
    selection: Selection,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .selected_course(session, selection, &req)
        .await
}

pub async fn update_course(
    req: HttpRequest,
    session: Session,
    selection: Selection,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_course(session, selection, payload, &req)
        .await
}

pub async fn delete_course(
    req: HttpRequest,
    session: Session,
    selection: Selection,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_course(session, selection, &req).await
}

pub async fn enroll(
    req: HttpRequest,
    session: Session,
    enrollment: web::Json<EnrollmentRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .enroll(session, enrollment.into_inner(), &req)
        .await
}

pub async fn unenroll(
    req: HttpRequest,
    session: Session,
    enrollment: web::Json<EnrollmentRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .unenroll(session, enrollment.into_inner(), &req)
        .await
}

pub async fn list_participants(
    req: HttpRequest,
    session: Session,
    selection: Selection,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .list_participants(session, selection, &req)
        .await
}

pub async fn add_assistant(
    req: HttpRequest,
    session: Session,
    selection: Selection,
    assistant: web::Json<AddAssistantRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .add_assistant(session, selection, assistant.into_inner(), &req)
        .await
}

pub async fn remove_assistant(
    req: HttpRequest,
    session: Session,
    selection: Selection,
    assistant_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .remove_assistant(session, selection, assistant_id.into_inner(), &req)
        .await
}

pub async fn join_as_staff(
    req: HttpRequest,
    session: Session,
    join: web::Json<JoinAsStaffRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .join_as_staff(session, join.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/courses")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireSession)
            .route("", web::get().to(list_courses))
            .route("", web::post().to(create_course))
            .route("/select", web::post().to(select_course))
            .route("/selected", web::get().to(selected_course))
            .route("/updateCourse", web::put().to(update_course))
            .route("/deleteCourse", web::delete().to(delete_course))
            .route("/enroll", web::post().to(enroll))
            .route("/unenroll", web::delete().to(unenroll))
            .route("/participants", web::get().to(list_participants))
            .route("/assistants", web::post().to(add_assistant))
            .route("/assistants/{assistant_id}", web::delete().to(remove_assistant))
            .route("/staff/join", web::post().to(join_as_staff)),
    );
}
