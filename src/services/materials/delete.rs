use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::MaterialService;
use crate::models::{ApiResponse, ErrorCode, auth::Session, storage_error_response};
use crate::services::access::course_access;
use crate::services::{file_store, respond_on_err};

fn material_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::MaterialNotFound,
        "Material not found",
    ))
}

/// 删除资料记录，然后删除其文件
pub async fn delete_material(
    service: &MaterialService,
    session: Session,
    material_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let material = match storage.get_material_by_id(material_id).await {
        Ok(Some(material)) => material,
        Ok(None) => return Ok(material_not_found()),
        Err(e) => return Ok(storage_error_response(e, "Load material")),
    };
    let access = respond_on_err!(course_access(&storage, &session, material.course_id).await);
    respond_on_err!(access.require_manager());

    match storage.delete_material(material_id).await {
        Ok(Some(deleted)) => {
            file_store(request)
                .remove_quietly([deleted.file_path.as_str()])
                .await;
            info!("Material {} deleted by {}", material_id, session.username);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Material deleted successfully")))
        }
        Ok(None) => Ok(material_not_found()),
        Err(e) => Ok(storage_error_response(e, "Delete material")),
    }
}
