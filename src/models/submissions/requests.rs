use serde::Deserialize;
use ts_rs::TS;

// 评分请求：role 为 student 时操作学生提交，否则操作教职人员提交
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct GradeRequest {
    pub submission_id: i64,
    pub new_grade: f64,
    pub role: String,
}

// 清除成绩、重新评分
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct RegradeRequest {
    pub submission_id: i64,
    pub role: String,
}

// 评分历史查询
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct GradeHistoryQuery {
    pub submission_id: i64,
    pub role: String,
}
