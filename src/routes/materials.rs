use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::{Selection, Session};
use crate::services::MaterialService;

// 懒加载的全局 MaterialService 实例
static MATERIAL_SERVICE: Lazy<MaterialService> = Lazy::new(MaterialService::new_lazy);

pub async fn list_materials(
    req: HttpRequest,
    session: Session,
    selection: Selection,
) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE
        .list_materials(session, selection, &req)
        .await
}

pub async fn create_material(
    req: HttpRequest,
    session: Session,
    selection: Selection,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE
        .create_material(session, selection, payload, &req)
        .await
}

pub async fn delete_material(
    req: HttpRequest,
    session: Session,
    material_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE
        .delete_material(session, material_id.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_material_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/materials")
            .wrap(middlewares::RateLimit::api())
            .wrap(middlewares::RequireSession)
            .route("", web::get().to(list_materials))
            .route("", web::post().to(create_material))
            .route("/{id}", web::delete().to(delete_material)),
    );
}
