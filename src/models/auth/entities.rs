use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::accounts::AccountRole;

/// 当前请求的会话上下文
///
/// 由会话中间件解码 `session` Cookie 并核对账号后写入请求扩展，
/// 处理函数通过提取器显式获得，服务层不直接读取 Cookie。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "auth.ts")]
pub struct Session {
    pub account_id: i64,
    pub username: String,
    pub role: AccountRole,
    pub selected_course_id: Option<i64>,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == AccountRole::Administrator
    }
}

/// 当前选中的课程 / 作业（来自选择 Cookie）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub course_id: Option<i64>,
    pub assignment_id: Option<i64>,
}
