use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::Session;
use crate::services::FileService;

// 懒加载的全局 FileService 实例
static FILE_SERVICE: Lazy<FileService> = Lazy::new(FileService::new_lazy);

pub async fn download(
    req: HttpRequest,
    session: Session,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let (category, name) = path.into_inner();
    FILE_SERVICE
        .download(session, category, name, &req)
        .await
}

// 配置路由
pub fn configure_file_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/files")
            .wrap(middlewares::RequireSession)
            .route("/{category}/{name}", web::get().to(download)),
    );
}
