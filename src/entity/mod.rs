//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod accounts;
pub mod assignment_materials;
pub mod assignments;
pub mod assistants;
pub mod courses;
pub mod enrollments;
pub mod grade_audit_other_submissions;
pub mod grade_audits;
pub mod materials;
pub mod other_enrollments;
pub mod other_submission_files;
pub mod other_submissions;
pub mod students;
pub mod submission_files;
pub mod submissions;
pub mod teachers;
pub mod teaching_assistants;

use chrono::{DateTime, Utc};

/// 数据库中的时间统一存为 Unix 秒
pub(crate) fn to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}
