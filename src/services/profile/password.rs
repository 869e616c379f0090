use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ProfileService;
use crate::models::{
    ApiResponse, ErrorCode,
    accounts::{AccountUpdate, ChangePasswordRequest},
    auth::Session,
    storage_error_response,
};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validate::validate_password;

pub async fn change_password(
    service: &ProfileService,
    session: Session,
    change: ChangePasswordRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let account = match storage.get_account_by_id(session.account_id).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AccountNotFound,
                "Account not found",
            )));
        }
        Err(e) => return Ok(storage_error_response(e, "Change password")),
    };

    // 先核对旧密码
    if !verify_password(&change.current_password, &account.password_hash) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::AuthFailed,
            "Current password is incorrect",
        )));
    }

    if let Err(msg) = validate_password(&change.new_password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::AccountPasswordInvalid, msg)));
    }

    let password_hash = match hash_password(&change.new_password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("Password hashing failed: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Password hashing failed",
                )),
            );
        }
    };

    let update = AccountUpdate {
        password_hash: Some(password_hash),
        ..Default::default()
    };
    match storage.update_account(account.id, update).await {
        Ok(Some(_)) => {
            info!("Account {} changed password", account.username);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Password changed")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AccountNotFound,
            "Account not found",
        ))),
        Err(e) => Ok(storage_error_response(e, "Change password")),
    }
}
