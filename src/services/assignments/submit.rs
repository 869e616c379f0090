use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, assignment_access, submission_owner};
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{Selection, Session},
    courses::CourseRole,
    storage_error_response,
};
use crate::services::{file_store, respond_on_err};
use crate::utils::multipart::{MultipartForm, UploadPolicy};
use crate::utils::upload::UploadCategory;

/// 提交或重新提交作业
///
/// 作业取表单中的 `assignment_id`，缺省时取当前选择的作业。重新提交沿用
/// 原记录并替换全部附件，旧附件在事务提交后删除。
pub async fn submit(
    service: &AssignmentService,
    session: Session,
    selection: Selection,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let policy = UploadPolicy::for_category(UploadCategory::Submissions);
    let form = respond_on_err!(
        MultipartForm::read(payload, &policy)
            .await
            .map_err(|e| e.into_response())
    );

    let assignment_id = match form.non_empty_text("assignment_id") {
        Some(raw) => match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::BadRequest,
                    format!("Invalid assignment id: {raw}"),
                )));
            }
        },
        None => selection.assignment_id,
    };
    let Some(assignment_id) = assignment_id else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotSelected,
            "No assignment selected",
        )));
    };

    let storage = service.get_storage(request);
    let (assignment, access) =
        respond_on_err!(assignment_access(&storage, &session, assignment_id).await);

    // 管理员不是课程参与者
    if access.role == CourseRole::Administrator {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::CoursePermissionDenied,
            "Only course participants can submit",
        )));
    }

    if !form.has_files() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "At least one file is required",
        )));
    }

    let (kind, owner_id) = respond_on_err!(submission_owner(&storage, &session).await);

    let store = file_store(request);
    let files = respond_on_err!(
        form.store_all(&store, UploadCategory::Submissions)
            .await
            .map_err(|e| e.into_response())
    );
    let stored_paths: Vec<String> = files.iter().map(|f| f.file_path.clone()).collect();

    match storage
        .upsert_submission(kind, assignment.id, owner_id, files)
        .await
    {
        Ok((submission, replaced)) => {
            store.remove_quietly(&replaced).await;
            info!(
                "Submission {} for assignment {} stored by {} ({} file(s), {} replaced)",
                submission.id,
                assignment.id,
                session.username,
                submission.files.len(),
                replaced.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                submission,
                "Submission saved successfully",
            )))
        }
        Err(e) => {
            store.remove_quietly(&stored_paths).await;
            Ok(storage_error_response(e, "Submit assignment"))
        }
    }
}
