use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::accounts::AccountRole;

// 课程
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Course {
    pub id: i64,
    pub teacher_id: i64,
    pub course_name: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 调用者在某门课程中的身份
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "course.ts")]
pub enum CourseRole {
    /// 课程所属教师
    Owner,
    /// 课程助教
    Assistant,
    /// 以教职人员身份加入课程（other_enrollments）
    Staff,
    /// 已选课学生
    Student,
    /// 系统管理员
    Administrator,
}

impl CourseRole {
    /// 能否管理课程内容（作业、资料、评分）
    pub fn can_manage(&self) -> bool {
        matches!(
            self,
            CourseRole::Owner | CourseRole::Assistant | CourseRole::Administrator
        )
    }

    /// 能否修改或删除课程本身、管理助教
    pub fn can_administer(&self) -> bool {
        matches!(self, CourseRole::Owner | CourseRole::Administrator)
    }
}

/// 课程参与者（学生或教职人员）
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Participant {
    pub account_id: i64,
    /// 角色资料表中的 id（students.id / teachers.id / assistants.id）
    pub participant_id: i64,
    pub role: AccountRole,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// 新建课程参数
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub teacher_id: i64,
    pub owner_account_id: i64,
    pub course_name: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
}

/// 更新课程参数
#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub course_name: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
}
