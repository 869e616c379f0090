use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AccountService;
use crate::errors::LmsError;
use crate::models::{
    ApiResponse, ErrorCode,
    accounts::{AccountRole, CreateAccountRequest, NewAccount},
    storage_error_response,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    validate_email, validate_password, validate_person_name, validate_username,
};

pub async fn create_account(
    service: &AccountService,
    account: CreateAccountRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let username = account.username.trim().to_string();
    let email = account.email.trim().to_string();
    let first_name = account.first_name.trim().to_string();
    let last_name = account.last_name.trim().to_string();

    // 验证用户名
    if let Err(msg) = validate_username(&username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::AccountNameInvalid, msg)));
    }

    // 验证邮箱
    if let Err(msg) = validate_email(&email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::AccountEmailInvalid, msg)));
    }

    if let Err(msg) = validate_password(&account.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::AccountPasswordInvalid, msg)));
    }

    // 有资料表的角色需要姓名
    if account.role != AccountRole::Administrator {
        for name in [&first_name, &last_name] {
            if let Err(msg) = validate_person_name(name) {
                return Ok(HttpResponse::BadRequest()
                    .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
            }
        }
    }

    let password_hash = match hash_password(&account.password) {
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

    let storage = service.get_storage(request);
    let new_account = NewAccount {
        username,
        email,
        password_hash,
        role: account.role,
        first_name,
        last_name,
    };

    match storage.create_account(new_account).await {
        Ok(created) => {
            info!(
                "Account {} created with role {}",
                created.account.username, created.account.role
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                created,
                "Account created successfully",
            )))
        }
        Err(LmsError::Conflict(_)) => Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::AccountAlreadyExists,
            "Username or email already exists",
        ))),
        Err(e) => Ok(storage_error_response(e, "Create account")),
    }
}
