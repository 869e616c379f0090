//! 课程访问控制
//!
//! 处理函数先通过这里确认调用者在课程中的身份，再执行具体操作。

use actix_web::HttpResponse;
use std::sync::Arc;

use crate::models::auth::{Selection, Session};
use crate::models::courses::{Course, CourseRole};
use crate::models::{ApiResponse, ErrorCode, storage_error_response};
use crate::storage::Storage;

/// 调用者与某门课程的关系
#[derive(Debug, Clone)]
pub struct CourseAccess {
    pub course: Course,
    pub role: CourseRole,
}

impl CourseAccess {
    /// 课程内容管理（作业、资料、评分）
    pub fn require_manager(&self) -> Result<(), HttpResponse> {
        if self.role.can_manage() {
            Ok(())
        } else {
            Err(forbidden("Only course staff can perform this action"))
        }
    }

    /// 课程本身的修改、删除与助教管理
    pub fn require_administrator(&self) -> Result<(), HttpResponse> {
        if self.role.can_administer() {
            Ok(())
        } else {
            Err(forbidden(
                "Only the course teacher or an administrator can perform this action",
            ))
        }
    }
}

/// 当前选择的课程：选择 Cookie 优先，其次是会话令牌中的记录
pub fn selected_course_id(session: &Session, selection: &Selection) -> Result<i64, HttpResponse> {
    selection
        .course_id
        .or(session.selected_course_id)
        .ok_or_else(|| {
            HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::CourseNotSelected,
                "No course selected",
            ))
        })
}

/// 加载课程并确认调用者与之有关联
pub async fn course_access(
    storage: &Arc<dyn Storage>,
    session: &Session,
    course_id: i64,
) -> Result<CourseAccess, HttpResponse> {
    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Err(course_not_found()),
        Err(e) => return Err(storage_error_response(e, "Load course")),
    };

    match storage
        .get_course_role(course_id, session.account_id, session.role)
        .await
    {
        Ok(Some(role)) => Ok(CourseAccess { course, role }),
        Ok(None) => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::CoursePermissionDenied,
            "You are not a participant of this course",
        ))),
        Err(e) => Err(storage_error_response(e, "Load course role")),
    }
}

/// 当前选择课程的访问信息
pub async fn selected_course_access(
    storage: &Arc<dyn Storage>,
    session: &Session,
    selection: &Selection,
) -> Result<CourseAccess, HttpResponse> {
    let course_id = selected_course_id(session, selection)?;
    course_access(storage, session, course_id).await
}

pub fn course_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::CourseNotFound,
        "Course not found",
    ))
}

fn forbidden(message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(
        ErrorCode::CoursePermissionDenied,
        message,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::accounts::AccountRole;
    use actix_web::http::StatusCode;

    fn session(selected: Option<i64>) -> Session {
        Session {
            account_id: 1,
            username: "turing".into(),
            role: AccountRole::Teacher,
            selected_course_id: selected,
        }
    }

    #[test]
    fn test_selected_course_prefers_cookie() {
        let selection = Selection {
            course_id: Some(7),
            assignment_id: None,
        };
        assert_eq!(selected_course_id(&session(Some(3)), &selection).ok(), Some(7));
        assert_eq!(
            selected_course_id(&session(Some(3)), &Selection::default()).ok(),
            Some(3)
        );
        let missing = selected_course_id(&session(None), &Selection::default());
        assert_eq!(
            missing.err().map(|r| r.status()),
            Some(StatusCode::BAD_REQUEST)
        );
    }

    #[test]
    fn test_manager_checks() {
        let course = Course {
            id: 1,
            teacher_id: 1,
            course_name: "Compilers".into(),
            description: None,
            image_path: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let access = |role| CourseAccess {
            course: course.clone(),
            role,
        };

        assert!(access(CourseRole::Assistant).require_manager().is_ok());
        assert!(access(CourseRole::Assistant).require_administrator().is_err());
        assert!(access(CourseRole::Staff).require_manager().is_err());
        assert!(access(CourseRole::Student).require_manager().is_err());
        assert!(access(CourseRole::Owner).require_administrator().is_ok());
    }
}
