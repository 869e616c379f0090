use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::{SelectAssignmentRequest, UpdateAssignmentRequest};
use crate::models::auth::{Selection, Session};
use crate::models::submissions::{GradeHistoryQuery, GradeRequest, RegradeRequest};
use crate::services::AssignmentService;

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

pub async fn list_overviews(
    req: HttpRequest,
    session: Session,
    selection: Selection,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_overviews(session, selection, &req)
        .await
}

pub async fn list_mine(
    req: HttpRequest,
    session: Session,
    selection: Selection,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_mine(session, selection, &req).await
}

pub async fn create_assignment(
    req: HttpRequest,
    session: Session,
    selection: Selection,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .create_assignment(session, selection, payload, &req)
        .await
}

pub async fn select_assignment(
    req: HttpRequest,
    session: Session,
    select: web::Json<SelectAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .select_assignment(session, select.into_inner(), &req)
        .await
}

pub async fn update_assignment(
    req: HttpRequest,
    session: Session,
    assignment_id: web::Path<i64>,
    update: web::Json<UpdateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .update_assignment(session, assignment_id.into_inner(), update.into_inner(), &req)
        .await
}

pub async fn delete_assignment(
    req: HttpRequest,
    session: Session,
    assignment_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .delete_assignment(session, assignment_id.into_inner(), &req)
        .await
}

pub async fn submit(
    req: HttpRequest,
    session: Session,
    selection: Selection,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .submit(session, selection, payload, &req)
        .await
}

pub async fn grade(
    req: HttpRequest,
    session: Session,
    grade: web::Json<GradeRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .grade(session, grade.into_inner(), &req)
        .await
}

pub async fn regrade(
    req: HttpRequest,
    session: Session,
    regrade: web::Json<RegradeRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .regrade(session, regrade.into_inner(), &req)
        .await
}

pub async fn grade_history(
    req: HttpRequest,
    session: Session,
    query: web::Query<GradeHistoryQuery>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .grade_history(session, query.into_inner(), &req)
        .await
}

// 配置路由
//
// 固定路径放在 `/{id}` 之前注册。
pub fn configure_assignment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/assignments")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireSession)
            .route("", web::get().to(list_overviews))
            .route("", web::post().to(create_assignment))
            .route("/mine", web::get().to(list_mine))
            .route("/select", web::post().to(select_assignment))
            .service(
                web::resource("/submit")
                    .wrap(middlewares::RateLimit::file_upload())
                    .route(web::post().to(submit)),
            )
            .route("/grade", web::put().to(grade))
            .route("/regrade", web::post().to(regrade))
            .route("/grades/history", web::get().to(grade_history))
            .route("/{id}", web::put().to(update_assignment))
            .route("/{id}", web::delete().to(delete_assignment)),
    );
}
