use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssignmentService;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{NewAssignment, parse_due_date},
    auth::{Selection, Session},
    storage_error_response,
};
use crate::services::access::selected_course_access;
use crate::services::{file_store, respond_on_err};
use crate::utils::multipart::{MultipartForm, UploadPolicy};
use crate::utils::upload::UploadCategory;
use crate::utils::validate::validate_title;

/// 在当前课程中创建作业，附带的文件存入 `courseMaterials/`
pub async fn create_assignment(
    service: &AssignmentService,
    session: Session,
    selection: Selection,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let access = respond_on_err!(selected_course_access(&storage, &session, &selection).await);
    respond_on_err!(access.require_manager());

    let policy = UploadPolicy::for_category(UploadCategory::CourseMaterials);
    let form = respond_on_err!(
        MultipartForm::read(payload, &policy)
            .await
            .map_err(|e| e.into_response())
    );

    let title = form.non_empty_text("title").unwrap_or_default();
    if let Err(msg) = validate_title(&title) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("Invalid title: {msg}"),
        )));
    }

    let due_date = match form.non_empty_text("due_date") {
        Some(raw) => match parse_due_date(&raw) {
            Ok(ts) => Some(ts),
            Err(_) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    format!("Invalid due date: {raw}"),
                )));
            }
        },
        None => None,
    };

    let store = file_store(request);
    let materials = respond_on_err!(
        form.store_all(&store, UploadCategory::CourseMaterials)
            .await
            .map_err(|e| e.into_response())
    );
    let stored_paths: Vec<String> = materials.iter().map(|m| m.file_path.clone()).collect();

    let new_assignment = NewAssignment {
        course_id: access.course.id,
        title,
        description: form.non_empty_text("description"),
        due_date,
        created_by: session.account_id,
        materials,
    };

    match storage.create_assignment(new_assignment).await {
        Ok(assignment) => {
            info!(
                "Assignment {} created in course {} by {}",
                assignment.id, access.course.id, session.username
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                assignment,
                "Assignment created successfully",
            )))
        }
        Err(e) => {
            store.remove_quietly(&stored_paths).await;
            Ok(storage_error_response(e, "Create assignment"))
        }
    }
}
