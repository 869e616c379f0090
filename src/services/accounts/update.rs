use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AccountService;
use crate::middlewares::require_session::invalidate_cached_account;
use crate::models::{
    ApiResponse, ErrorCode,
    accounts::{AccountUpdate, UpdateAccountRequest},
    storage_error_response,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password, validate_person_name};

pub async fn update_account(
    service: &AccountService,
    account_id: i64,
    update: UpdateAccountRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let email = update.email.map(|e| e.trim().to_string());
    if let Some(email) = &email
        && let Err(msg) = validate_email(email)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::AccountEmailInvalid, msg)));
    }

    let first_name = update.first_name.map(|n| n.trim().to_string());
    let last_name = update.last_name.map(|n| n.trim().to_string());
    for name in first_name.iter().chain(last_name.iter()) {
        if let Err(msg) = validate_person_name(name) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
        }
    }

    // 管理员重置密码
    let password_hash = match update.password.as_deref() {
        Some(password) => {
            if let Err(msg) = validate_password(password) {
                return Ok(HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::AccountPasswordInvalid, msg)));
            }
            match hash_password(password) {
                Ok(hash) => Some(hash),
                Err(e) => {
                    tracing::error!("Password hashing failed: {}", e);
                    return Ok(
                        HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                            ErrorCode::InternalServerError,
                            "Password hashing failed",
                        )),
                    );
                }
            }
        }
        None => None,
    };

    let storage = service.get_storage(request);
    let update = AccountUpdate {
        email,
        password_hash,
        first_name,
        last_name,
    };

    match storage.update_account(account_id, update).await {
        Ok(Some(updated)) => {
            invalidate_cached_account(request, account_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                updated,
                "Account updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AccountNotFound,
            "Account not found",
        ))),
        Err(e) => Ok(storage_error_response(e, "Update account")),
    }
}
