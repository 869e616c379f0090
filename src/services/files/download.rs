use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use std::io::ErrorKind;

use super::FileService;
use crate::errors::LmsError;
use crate::models::auth::Session;
use crate::models::{ApiResponse, ErrorCode, storage_error_response};
use crate::services::assignments::{assignment_access, submission_owner};
use crate::services::{file_store, respond_on_err};
use crate::utils::upload::{UploadCategory, file_extension};

fn file_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::FileNotFound,
        "File not found",
    ))
}

/// 按扩展名推断内容类型，未知类型按二进制下载
fn content_type_for(name: &str) -> &'static str {
    match file_extension(name).as_deref() {
        Some(".png") => "image/png",
        Some(".jpg") | Some(".jpeg") => "image/jpeg",
        Some(".gif") => "image/gif",
        Some(".webp") => "image/webp",
        Some(".pdf") => "application/pdf",
        Some(".txt") => "text/plain; charset=utf-8",
        Some(".zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

/// 提交附件：提交者本人或该课程的教职人员
async fn authorize_submission_file(
    service: &FileService,
    session: &Session,
    stored_path: &str,
    request: &HttpRequest,
) -> Result<(), HttpResponse> {
    let storage = service.get_storage(request);
    let submission = match storage.find_submission_by_file(stored_path).await {
        Ok(Some(submission)) => submission,
        Ok(None) => return Err(file_not_found()),
        Err(e) => return Err(storage_error_response(e, "Load submission")),
    };

    let (kind, owner_id) = submission_owner(&storage, session).await?;
    if kind == submission.kind && owner_id == submission.owner_id {
        return Ok(());
    }
    let (_, access) = assignment_access(&storage, session, submission.assignment_id).await?;
    access.require_manager()
}

pub async fn handle_download(
    service: &FileService,
    session: Session,
    category: String,
    name: String,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let stored_path = format!("/{category}/{name}");
    let Some(path) = file_store(request).resolve(&stored_path) else {
        return Ok(file_not_found());
    };

    if UploadCategory::from_dir_name(&category) == Some(UploadCategory::Submissions) {
        respond_on_err!(
            authorize_submission_file(service, &session, &stored_path, request).await
        );
    }

    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(file_not_found()),
        Err(e) => {
            tracing::error!(
                "{}",
                LmsError::file_operation(format!("读取文件 {stored_path} 失败: {e}"))
            );
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "File read failed",
                )),
            );
        }
    };

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type_for(&name)))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", name.replace('"', "")),
        ))
        .body(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::accounts::{AccountRole, AccountWithProfile, NewAccount};
    use crate::models::assignments::NewAssignment;
    use crate::models::courses::NewCourse;
    use crate::models::submissions::SubmissionKind;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::utils::upload::{FileStore, StoredFile};
    use actix_web::{http::StatusCode, test::TestRequest, web};
    use std::sync::Arc;

    fn session_of(account: &AccountWithProfile) -> Session {
        Session {
            account_id: account.account.id,
            username: account.account.username.clone(),
            role: account.account.role,
            selected_course_id: None,
        }
    }

    async fn create(
        storage: &Arc<dyn Storage>,
        username: &str,
        role: AccountRole,
    ) -> AccountWithProfile {
        storage
            .create_account(NewAccount {
                username: username.into(),
                email: format!("{username}@example.com"),
                password_hash: "hash".into(),
                role,
                first_name: username.into(),
                last_name: "Test".into(),
            })
            .await
            .expect("create account")
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("1700000000-photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("report.pdf"), "application/pdf");
        assert_eq!(content_type_for("archive"), "application/octet-stream");
    }

    #[actix_web::test]
    async fn test_download_reads_stored_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        store.ensure_dirs().await.expect("dirs");
        std::fs::write(dir.path().join("materials").join("1-notes.txt"), b"hello").expect("write");

        let req = TestRequest::default()
            .app_data(web::Data::new(store))
            .to_http_request();
        let service = FileService::new_lazy();
        let session = Session {
            account_id: 1,
            username: "alice".into(),
            role: AccountRole::Student,
            selected_course_id: None,
        };

        let resp = handle_download(
            &service,
            session.clone(),
            "materials".into(),
            "1-notes.txt".into(),
            &req,
        )
        .await
        .expect("response");
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = handle_download(
            &service,
            session.clone(),
            "materials".into(),
            "missing.txt".into(),
            &req,
        )
        .await
        .expect("response");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = handle_download(
            &service,
            session,
            "secrets".into(),
            "1-notes.txt".into(),
            &req,
        )
        .await
        .expect("response");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_submission_files_limited_to_owner_and_staff() {
        let storage: Arc<dyn Storage> =
            Arc::new(SeaOrmStorage::in_memory().await.expect("in-memory storage"));
        let teacher = create(&storage, "turing", AccountRole::Teacher).await;
        let alice = create(&storage, "alice", AccountRole::Student).await;
        let bob = create(&storage, "bob", AccountRole::Student).await;

        let course = storage
            .create_course(NewCourse {
                teacher_id: teacher.profile.as_ref().map(|p| p.id).expect("teacher profile"),
                owner_account_id: teacher.account.id,
                course_name: "Compilers".into(),
                description: None,
                image_path: None,
            })
            .await
            .expect("create course");
        for student in [&alice, &bob] {
            storage
                .enroll_student(course.id, student.account.id)
                .await
                .expect("enroll");
        }
        let lab = storage
            .create_assignment(NewAssignment {
                course_id: course.id,
                title: "Lab 1".into(),
                description: None,
                due_date: None,
                created_by: teacher.account.id,
                materials: vec![],
            })
            .await
            .expect("create assignment");
        storage
            .upsert_submission(
                SubmissionKind::Student,
                lab.id,
                alice.profile.as_ref().map(|p| p.id).expect("student profile"),
                vec![StoredFile {
                    file_path: "/submissions/1-answer.txt".into(),
                    original_name: "answer.txt".into(),
                    size: 6,
                }],
            )
            .await
            .expect("submit");

        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        store.ensure_dirs().await.expect("dirs");
        let submissions = dir.path().join("submissions");
        std::fs::write(submissions.join("1-answer.txt"), b"answer").expect("write");
        std::fs::write(submissions.join("2-stray.txt"), b"stray").expect("write");

        let req = TestRequest::default()
            .app_data(web::Data::new(store))
            .app_data(web::Data::new(storage.clone()))
            .to_http_request();
        let service = FileService::new_lazy();

        for (who, expected) in [
            (&alice, StatusCode::OK),
            (&teacher, StatusCode::OK),
            (&bob, StatusCode::FORBIDDEN),
        ] {
            let resp = handle_download(
                &service,
                session_of(who),
                "submissions".into(),
                "1-answer.txt".into(),
                &req,
            )
            .await
            .expect("response");
            assert_eq!(resp.status(), expected, "download by {}", who.account.username);
        }

        // 未被任何提交引用的附件不对外提供
        let resp = handle_download(
            &service,
            session_of(&alice),
            "submissions".into(),
            "2-stray.txt".into(),
            &req,
        )
        .await
        .expect("response");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
