//! 请求中间件
//!
//! - [`RequireSession`]：解码 `session` Cookie，核对账号并写入 [`Session`](crate::models::auth::Session)
//! - [`RequireRole`]：在会话之后按账号角色放行
//! - [`RateLimit`]：按客户端限流

pub mod rate_limit;
pub mod require_role;
pub mod require_session;

pub use rate_limit::RateLimit;
pub use require_role::RequireRole;
pub use require_session::RequireSession;

use actix_web::{HttpResponse, http::StatusCode, http::header::CONTENT_TYPE};

use crate::models::{ApiResponse, ErrorCode};

// 辅助函数：创建错误响应
pub(crate) fn create_error_response(
    status: StatusCode,
    code: ErrorCode,
    message: &str,
) -> HttpResponse {
    match status {
        StatusCode::NO_CONTENT => HttpResponse::build(status).finish(),
        _ => HttpResponse::build(status)
            .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
            .json(ApiResponse::error_empty(code, message)),
    }
}
