use serde::Deserialize;
use ts_rs::TS;

// 选择当前课程
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct SelectCourseRequest {
    pub course_id: i64,
}

// 选课 / 退课
//
// 未提供 username 时为学生本人操作；提供时由课程管理者为指定学生操作。
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct EnrollmentRequest {
    pub course_id: i64,
    pub username: Option<String>,
}

// 添加助教
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct AddAssistantRequest {
    pub username: String,
}

// 教职人员加入课程
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct JoinAsStaffRequest {
    pub course_id: i64,
}
