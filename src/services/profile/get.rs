use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ProfileService;
use crate::models::{ApiResponse, ErrorCode, auth::Session, storage_error_response};

pub async fn get_profile(
    service: &ProfileService,
    session: Session,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_account_with_profile(session.account_id).await {
        Ok(Some(found)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            found,
            "Profile retrieved successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AccountNotFound,
            "Account not found",
        ))),
        Err(e) => Ok(storage_error_response(e, "Load profile")),
    }
}
