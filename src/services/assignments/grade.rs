//! 评分、清除成绩与评分历史
//!
//! 请求中的 `role` 决定操作哪一类提交：`student` 为学生提交，
//! 其余为教职人员提交。只有课程所属教师、课程助教与管理员可以操作。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, graded_submission_access};
use crate::models::{
    ApiResponse, ErrorCode,
    auth::Session,
    storage_error_response,
    submissions::{GradeChange, GradeHistoryQuery, GradeRequest, RegradeRequest, SubmissionKind},
};
use crate::services::respond_on_err;

/// 成绩必须是非负的有限数
fn validate_grade(grade: f64) -> Result<(), HttpResponse> {
    if grade.is_finite() && grade >= 0.0 {
        Ok(())
    } else {
        Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::GradeInvalid,
            "Grade must be a non-negative number",
        )))
    }
}

async fn apply(
    service: &AssignmentService,
    session: &Session,
    kind: SubmissionKind,
    submission_id: i64,
    change: GradeChange,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    respond_on_err!(graded_submission_access(&storage, session, kind, submission_id).await);

    match storage
        .apply_grade(kind, submission_id, change, session.account_id)
        .await
    {
        Ok(Some(submission)) => {
            info!(
                "Submission {} ({:?}) set to {} by {}",
                submission_id, kind, submission.grade_state, session.username
            );
            let message = match change {
                GradeChange::Set(_) => "Grade saved",
                GradeChange::Clear => "Grade cleared for regrading",
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(submission, message)))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "Submission not found",
        ))),
        Err(e) => Ok(storage_error_response(e, "Grade submission")),
    }
}

pub async fn grade(
    service: &AssignmentService,
    session: Session,
    grade: GradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    respond_on_err!(validate_grade(grade.new_grade));
    let kind = SubmissionKind::from_role(&grade.role);
    apply(
        service,
        &session,
        kind,
        grade.submission_id,
        GradeChange::Set(grade.new_grade),
        request,
    )
    .await
}

pub async fn regrade(
    service: &AssignmentService,
    session: Session,
    regrade: RegradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let kind = SubmissionKind::from_role(&regrade.role);
    apply(
        service,
        &session,
        kind,
        regrade.submission_id,
        GradeChange::Clear,
        request,
    )
    .await
}

/// 评分历史，最新的在前
pub async fn grade_history(
    service: &AssignmentService,
    session: Session,
    query: GradeHistoryQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let kind = SubmissionKind::from_role(&query.role);
    respond_on_err!(graded_submission_access(&storage, &session, kind, query.submission_id).await);

    match storage.list_grade_history(kind, query.submission_id).await {
        Ok(history) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            history,
            "Grade history retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, "Load grade history")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_grade() {
        assert!(validate_grade(0.0).is_ok());
        assert!(validate_grade(97.5).is_ok());
        assert!(validate_grade(-1.0).is_err());
        assert!(validate_grade(f64::NAN).is_err());
        assert!(validate_grade(f64::INFINITY).is_err());
    }
}
