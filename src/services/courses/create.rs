use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CourseService;
use crate::models::{
    ApiResponse, ErrorCode,
    accounts::AccountRole,
    auth::Session,
    courses::NewCourse,
    storage_error_response,
};
use crate::services::{file_store, respond_on_err};
use crate::utils::multipart::{MultipartForm, UploadPolicy};
use crate::utils::upload::UploadCategory;
use crate::utils::validate::validate_title;

/// 创建课程
///
/// 只有教师可以创建，课程归属于调用者的教师资料；封面图片可选。
pub async fn create_course(
    service: &CourseService,
    session: Session,
    payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if session.role != AccountRole::Teacher {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Only teachers can create courses",
        )));
    }

    let storage = service.get_storage(request);

    let teacher_id = match storage.get_account_with_profile(session.account_id).await {
        Ok(Some(found)) => match found.profile {
            Some(profile) => profile.id,
            None => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::AccountNotFound,
                    "Teacher profile not found",
                )));
            }
        },
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AccountNotFound,
                "Account not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(e, "Create course")),
    };

    let policy = UploadPolicy::for_category(UploadCategory::Courses);
    let form = respond_on_err!(
        MultipartForm::read(payload, &policy)
            .await
            .map_err(|e| e.into_response())
    );

    let course_name = form.non_empty_text("course_name").unwrap_or_default();
    if let Err(msg) = validate_title(&course_name) {
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

    let new_course = NewCourse {
        teacher_id,
        owner_account_id: session.account_id,
        course_name,
        description: form.non_empty_text("description"),
        image_path: image_path.clone(),
    };

    match storage.create_course(new_course).await {
        Ok(course) => {
            info!(
                "Course {} ({}) created by {}",
                course.course_name, course.id, session.username
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(course, "Course created successfully")))
        }
        Err(e) => {
            store.remove_quietly(image_path).await;
            Ok(storage_error_response(e, "Create course"))
        }
    }
}
