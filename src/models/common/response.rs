use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::LmsError;
use crate::models::ErrorCode;

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 将存储层错误转换为 HTTP 响应
///
/// 内部错误只记录日志，不把底层错误文本返回给客户端。
pub fn storage_error_response(err: LmsError, action: &str) -> HttpResponse {
    let status = err.status_code();
    let code = match &err {
        LmsError::Validation(_) | LmsError::DateParse(_) => ErrorCode::BadRequest,
        LmsError::Authentication(_) => ErrorCode::Unauthorized,
        LmsError::Authorization(_) => ErrorCode::Forbidden,
        LmsError::NotFound(_) => ErrorCode::NotFound,
        LmsError::Conflict(_) => ErrorCode::Conflict,
        _ => ErrorCode::InternalServerError,
    };

    if code == ErrorCode::InternalServerError {
        tracing::error!("{} failed: {}", action, err);
        HttpResponse::build(status).json(ApiResponse::error_empty(code, format!("{action} failed")))
    } else {
        HttpResponse::build(status).json(ApiResponse::error_empty(code, err.message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_success_envelope() {
        let resp = ApiResponse::success(42_i32, "ok");
        assert_eq!(resp.code, 0);
        assert_eq!(resp.data, Some(42));
        let json = serde_json::to_value(ApiResponse::success_empty("done")).expect("serialize");
        assert!(json.get("data").is_none());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_storage_error_hides_internal_details() {
        let resp = storage_error_response(
            LmsError::database_operation("secret table name"),
            "Load course",
        );
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = storage_error_response(LmsError::conflict("already exists"), "Create");
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
