use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ProfileService;
use crate::middlewares::require_session::invalidate_cached_account;
use crate::models::{
    ApiResponse, ErrorCode,
    accounts::{AccountUpdate, UpdateProfileRequest},
    auth::Session,
    storage_error_response,
};
use crate::utils::validate::{validate_email, validate_person_name};

pub async fn update_profile(
    service: &ProfileService,
    session: Session,
    update: UpdateProfileRequest,
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

    let storage = service.get_storage(request);
    let update = AccountUpdate {
        email,
        password_hash: None,
        first_name,
        last_name,
    };

    match storage.update_account(session.account_id, update).await {
        Ok(Some(found)) => {
            invalidate_cached_account(request, session.account_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                found,
                "Profile updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AccountNotFound,
            "Account not found",
        ))),
        Err(e) => Ok(storage_error_response(e, "Update profile")),
    }
}
