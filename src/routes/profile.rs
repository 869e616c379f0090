use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::accounts::{ChangePasswordRequest, UpdateProfileRequest};
use crate::models::auth::Session;
use crate::services::ProfileService;

// 懒加载的全局 ProfileService 实例
static PROFILE_SERVICE: Lazy<ProfileService> = Lazy::new(ProfileService::new_lazy);

pub async fn get_profile(req: HttpRequest, session: Session) -> ActixResult<HttpResponse> {
    PROFILE_SERVICE.get_profile(session, &req).await
}

pub async fn update_profile(
    req: HttpRequest,
    session: Session,
    update: web::Json<UpdateProfileRequest>,
) -> ActixResult<HttpResponse> {
    PROFILE_SERVICE
        .update_profile(session, update.into_inner(), &req)
        .await
}

pub async fn change_password(
    req: HttpRequest,
    session: Session,
    change: web::Json<ChangePasswordRequest>,
) -> ActixResult<HttpResponse> {
    PROFILE_SERVICE
        .change_password(session, change.into_inner(), &req)
        .await
}

pub async fn upload_image(
    req: HttpRequest,
    session: Session,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    PROFILE_SERVICE.upload_image(session, payload, &req).await
}

// 配置路由
pub fn configure_profile_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/profile")
            .wrap(middlewares::RequireSession)
            .route("", web::get().to(get_profile))
            .route("", web::put().to(update_profile))
            .route("/password", web::put().to(change_password))
            .service(
                web::resource("/image")
                    .wrap(middlewares::RateLimit::file_upload())
                    .route(web::post().to(upload_image)),
            ),
    );
}
