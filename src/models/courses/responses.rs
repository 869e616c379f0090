use serde::Serialize;
use ts_rs::TS;

use super::entities::{Course, CourseRole, Participant};

// 课程列表项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListItem {
    pub course: Course,
    pub teacher_name: String,
    pub my_role: CourseRole,
}

// 课程参与者
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseParticipants {
    pub teacher: Option<Participant>,
    pub assistants: Vec<Participant>,
    pub students: Vec<Participant>,
    pub staff: Vec<Participant>,
}

// 当前选择的课程
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct SelectedCourseResponse {
    pub course: Course,
    pub my_role: CourseRole,
}
