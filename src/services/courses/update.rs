use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{Selection, Session},
    courses::CourseUpdate,
    storage_error_response,
};
use crate::services::access::{course_not_found, selected_course_access};
use crate::services::{file_store, respond_on_err};
use crate::utils::multipart::{MultipartForm, UploadPolicy};
use crate::utils::upload::UploadCategory;
use crate::utils::validate::validate_title;

pub async fn update_course(
    service: &CourseService,
    session: Session,
    selection: Selection,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let access = respond_on_err!(selected_course_access(&storage, &session, &selection).await);
    respond_on_err!(access.require_administrator());

    let policy = UploadPolicy::for_category(UploadCategory::Courses);
    let form = respond_on_err!(
        MultipartForm::read(payload, &policy)
            .await
            .map_err(|e| e.into_response())
    );

    let course_name = form.non_empty_text("course_name");
    if let Some(name) = &course_name
        && let Err(msg) = validate_title(name)
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("Invalid course name: {msg}"),
        )));
    }

    let store = file_store(request);
    let image = respond_on_err!(
        form.store_first(&store, UploadCategory::Courses)
            .await
            .map_err(|e| e.into_response())
    );
    let image_path = image.map(|stored| stored.file_path);

    let update = CourseUpdate {
        course_name,
        // 表单中出现 description 字段即视为修改，空字符串清空描述
        description: form.text("description").map(|d| d.trim().to_string()),
        image_path: image_path.clone(),
    };

    match storage.update_course(access.course.id, update).await {
        Ok(Some((course, replaced))) => {
            store.remove_quietly(replaced).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(course, "Course updated successfully")))
        }
        Ok(None) => {
            store.remove_quietly(image_path).await;
            Ok(course_not_found())
        }
        Err(e) => {
            store.remove_quietly(image_path).await;
            Ok(storage_error_response(e, "Update course"))
        }
    }
}
