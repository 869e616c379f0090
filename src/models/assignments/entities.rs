use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::utils::upload::StoredFile;

// 作业
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub materials: Vec<AssignmentMaterial>,
}

// 作业附带的资料文件
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentMaterial {
    pub id: i64,
    pub file_path: String,
    pub original_name: String,
    pub uploaded_at: DateTime<Utc>,
}

/// 新建作业参数
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<i64>,
    pub created_by: i64,
    pub materials: Vec<StoredFile>,
}

/// 更新作业参数，`due_date: Some(None)` 表示清除截止时间
#[derive(Debug, Clone, Default)]
pub struct AssignmentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<i64>>,
}
