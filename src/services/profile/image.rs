use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ProfileService;
use crate::models::{ApiResponse, ErrorCode, auth::Session, storage_error_response};
use crate::services::{file_store, respond_on_err};
use crate::utils::multipart::{MultipartForm, UploadPolicy};
use crate::utils::upload::UploadCategory;

pub async fn upload_image(
    service: &ProfileService,
    session: Session,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if session.is_admin() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Administrators have no profile image",
        )));
    }

    let policy = UploadPolicy::for_category(UploadCategory::Profile);
    let form = respond_on_err!(
        MultipartForm::read(payload, &policy)
            .await
            .map_err(|e| e.into_response())
    );

    let store = file_store(request);
    let stored = match form.store_first(&store, UploadCategory::Profile).await {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "No image uploaded",
            )));
        }
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let storage = service.get_storage(request);
    match storage
        .update_profile_image(session.account_id, &stored.file_path)
        .await
    {
        Ok(previous) => {
            // 旧头像在记录更新后删除
            store.remove_quietly(previous).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                stored.file_path,
                "Profile image updated",
            )))
        }
        Err(e) => {
            store.remove_quietly([stored.file_path.as_str()]).await;
            Ok(storage_error_response(e, "Update profile image"))
        }
    }
}
