use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{Error, HttpRequest, HttpResponse};

use crate::models::{ApiResponse, ErrorCode};

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message))
}

/// JSON 请求体解析失败时返回统一响应
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    tracing::info!("Rejected JSON payload: {}", err);
    let response = bad_request(format!("Invalid JSON body: {err}"));
    InternalError::from_response(err, response).into()
}

/// 查询参数解析失败
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    let response = bad_request(format!("Invalid query parameters: {err}"));
    InternalError::from_response(err, response).into()
}

/// 路径参数解析失败
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> Error {
    let response = bad_request(format!("Invalid path parameter: {err}"));
    InternalError::from_response(err, response).into()
}
