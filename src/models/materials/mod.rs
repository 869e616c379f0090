use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程资料
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "material.ts")]
pub struct Material {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub file_path: String,
    pub original_name: String,
    pub uploaded_by: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// 新建课程资料参数
#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub course_id: i64,
    pub title: String,
    pub file_path: String,
    pub original_name: String,
    pub uploaded_by: i64,
}
