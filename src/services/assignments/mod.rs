pub mod create;
pub mod delete;
pub mod grade;
pub mod list;
pub mod select;
pub mod submit;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assignments::{Assignment, SelectAssignmentRequest, UpdateAssignmentRequest};
use crate::models::auth::{Selection, Session};
use crate::models::submissions::{
    GradeHistoryQuery, GradeRequest, RegradeRequest, Submission, SubmissionKind,
};
use crate::models::{ApiResponse, ErrorCode, storage_error_response};
use crate::services::access::{CourseAccess, course_access};
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 当前课程的作业与提交汇总（教职人员）
    pub async fn list_overviews(
        &self,
        session: Session,
        selection: Selection,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_overviews(self, session, selection, request).await
    }

    // 当前课程的作业与本人提交
    pub async fn list_mine(
        &self,
        session: Session,
        selection: Selection,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_mine(self, session, selection, request).await
    }

    // 创建作业（multipart）
    pub async fn create_assignment(
        &self,
        session: Session,
        selection: Selection,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assignment(self, session, selection, payload, request).await
    }

    // 选择当前作业
    pub async fn select_assignment(
        &self,
        session: Session,
        select: SelectAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        select::select_assignment(self, session, select, request).await
    }

    // 更新作业
    pub async fn update_assignment(
        &self,
        session: Session,
        assignment_id: i64,
        update: UpdateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_assignment(self, session, assignment_id, update, request).await
    }

    // 删除作业
    pub async fn delete_assignment(
        &self,
        session: Session,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_assignment(self, session, assignment_id, request).await
    }

    // 提交作业（multipart）
    pub async fn submit(
        &self,
        session: Session,
        selection: Selection,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit(self, session, selection, payload, request).await
    }

    // 评分
    pub async fn grade(
        &self,
        session: Session,
        grade: GradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade(self, session, grade, request).await
    }

    // 清除成绩，等待重新评分
    pub async fn regrade(
        &self,
        session: Session,
        regrade: RegradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::regrade(self, session, regrade, request).await
    }

    // 评分历史
    pub async fn grade_history(
        &self,
        session: Session,
        query: GradeHistoryQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_history(self, session, query, request).await
    }
}

pub(crate) fn assignment_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::AssignmentNotFound,
        "Assignment not found",
    ))
}

/// 加载作业并确认调用者与其所属课程有关联
pub(crate) async fn assignment_access(
    storage: &Arc<dyn Storage>,
    session: &Session,
    assignment_id: i64,
) -> Result<(Assignment, CourseAccess), HttpResponse> {
    let assignment = match storage.get_assignment_by_id(assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => return Err(assignment_not_found()),
        Err(e) => return Err(storage_error_response(e, "Load assignment")),
    };
    let access = course_access(storage, session, assignment.course_id).await?;
    Ok((assignment, access))
}

/// 加载提交，并确认调用者可以管理其所属课程
pub(crate) async fn graded_submission_access(
    storage: &Arc<dyn Storage>,
    session: &Session,
    kind: SubmissionKind,
    submission_id: i64,
) -> Result<Submission, HttpResponse> {
    let submission = match storage.get_submission(kind, submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "Submission not found",
            )));
        }
        Err(e) => return Err(storage_error_response(e, "Load submission")),
    };

    let (_, access) = assignment_access(storage, session, submission.assignment_id).await?;
    access.require_manager()?;
    Ok(submission)
}

/// 调用者作为提交者的身份：学生以 students.id 标识，教职人员以 accounts.id 标识
pub(crate) async fn submission_owner(
    storage: &Arc<dyn Storage>,
    session: &Session,
) -> Result<(SubmissionKind, i64), HttpResponse> {
    match SubmissionKind::for_account_role(session.role) {
        SubmissionKind::Other => Ok((SubmissionKind::Other, session.account_id)),
        SubmissionKind::Student => {
            match storage.get_account_with_profile(session.account_id).await {
                Ok(Some(found)) => match found.profile {
                    Some(profile) => Ok((SubmissionKind::Student, profile.id)),
                    None => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                        ErrorCode::StudentNotFound,
                        "Student profile not found",
                    ))),
                },
                Ok(None) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::AccountNotFound,
                    "Account not found",
                ))),
                Err(e) => Err(storage_error_response(e, "Load profile")),
            }
        }
    }
}
