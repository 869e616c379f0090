use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AccountService;
use crate::errors::LmsError;
use crate::middlewares::require_session::invalidate_cached_account;
use crate::models::{ApiResponse, ErrorCode, auth::Session, storage_error_response};
use crate::services::file_store;

pub async fn delete_account(
    service: &AccountService,
    session: Session,
    account_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 禁止删除当前账号
    if account_id == session.account_id {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentAccount,
            "Cannot delete the current account",
        )));
    }

    let storage = service.get_storage(request);

    match storage.delete_account(account_id).await {
        Ok(Some(removed)) => {
            invalidate_cached_account(request, account_id).await;
            file_store(request).remove_quietly(&removed).await;
            info!(
                "Account {} deleted by {}, {} file(s) removed",
                account_id,
                session.username,
                removed.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Account deleted successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AccountNotFound,
            "Account not found",
        ))),
        Err(LmsError::Conflict(_)) => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AccountOwnsCourses,
            "The teacher still owns courses, delete or reassign them first",
        ))),
        Err(e) => Ok(storage_error_response(e, "Delete account")),
    }
}
