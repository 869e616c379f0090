use serde::Serialize;
use ts_rs::TS;

use crate::models::accounts::{Account, Person};

// 登录响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct LoginResponse {
    pub account: Account,
    pub profile: Option<Person>,
}

// 当前会话信息
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct SessionResponse {
    pub account: Account,
    pub profile: Option<Person>,
    pub selected_course_id: Option<i64>,
    pub selected_assignment_id: Option<i64>,
}
