use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::MaterialService;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{Selection, Session},
    materials::NewMaterial,
    storage_error_response,
};
use crate::services::access::selected_course_access;
use crate::services::{file_store, respond_on_err};
use crate::utils::multipart::{MultipartForm, UploadPolicy};
use crate::utils::upload::UploadCategory;
use crate::utils::validate::validate_title;

/// 上传课程资料，标题缺省时使用原文件名
pub async fn create_material(
    service: &MaterialService,
    session: Session,
    selection: Selection,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let access = respond_on_err!(selected_course_access(&storage, &session, &selection).await);
    respond_on_err!(access.require_manager());

    let policy = UploadPolicy::for_category(UploadCategory::Materials);
    let form = respond_on_err!(
        MultipartForm::read(payload, &policy)
            .await
            .map_err(|e| e.into_response())
    );

    let Some(file) = form.files().first() else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "A file is required",
        )));
    };
    let title = form
        .non_empty_text("title")
        .unwrap_or_else(|| file.original_name.clone());
    if let Err(msg) = validate_title(&title) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("Invalid title: {msg}"),
        )));
    }

    let store = file_store(request);
    let stored = match form.store_first(&store, UploadCategory::Materials).await {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "A file is required",
            )));
        }
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let new_material = NewMaterial {
        course_id: access.course.id,
        title,
        file_path: stored.file_path.clone(),
        original_name: stored.original_name.clone(),
        uploaded_by: session.account_id,
    };

    match storage.create_material(new_material).await {
        Ok(material) => {
            info!(
                "Material {} uploaded to course {} by {}",
                material.id, access.course.id, session.username
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(material, "Material uploaded successfully")))
        }
        Err(e) => {
            store.remove_quietly([stored.file_path.as_str()]).await;
            Ok(storage_error_response(e, "Upload material"))
        }
    }
}
