use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse, Session},
    storage_error_response,
};
use crate::utils::password::verify_password;
use crate::utils::session::SessionCodec;

use super::AuthService;

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::AuthFailed,
        "Username or password is incorrect",
    ))
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let username = login_request.username.trim();
    if username.is_empty() || login_request.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "Username and password are required",
        )));
    }

    let storage = service.get_storage(request);

    // 1. 根据用户名获取账号
    let account = match storage.get_account_by_username(username).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            tracing::info!("Login rejected for unknown username {}", username);
            return Ok(invalid_credentials());
        }
        Err(e) => return Ok(storage_error_response(e, "Login")),
    };

    // 2. 验证密码
    if !verify_password(&login_request.password, &account.password_hash) {
        tracing::info!("Login rejected for {}: wrong password", account.username);
        return Ok(invalid_credentials());
    }

    // 3. 更新最后登录时间
    if let Err(e) = storage.update_last_login(account.id).await {
        tracing::warn!("Failed to record last login for {}: {}", account.id, e);
    }

    // 4. 签发会话 Cookie，令牌中携带角色
    let session = Session {
        account_id: account.id,
        username: account.username.clone(),
        role: account.role,
        selected_course_id: None,
    };
    let cookie = match SessionCodec::global().session_cookie(&session) {
        Ok(cookie) => cookie,
        Err(e) => {
            tracing::error!("Failed to issue session for {}: {}", account.id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to create session",
                )),
            );
        }
    };

    let profile = match storage.get_account_with_profile(account.id).await {
        Ok(found) => found.and_then(|a| a.profile),
        Err(e) => {
            tracing::warn!("Failed to load profile for {}: {}", account.id, e);
            None
        }
    };

    tracing::info!("Account {} logged in as {}", account.username, account.role);
    Ok(HttpResponse::Ok().cookie(cookie).json(ApiResponse::success(
        LoginResponse {
            account,
            profile,
        },
        "Login successful",
    )))
}
