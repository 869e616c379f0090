use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::require_session::invalidate_cached_account;
use crate::models::ApiResponse;
use crate::utils::session::{
    SELECTED_ASSIGNMENT_COOKIE, SELECTED_COURSE_COOKIE, SESSION_COOKIE, SessionCodec,
};

/// 注销
///
/// 不要求有效会话：无论令牌是否还能解码，都下发过期 Cookie。
pub async fn handle_logout(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let codec = SessionCodec::global();

    if let Some(cookie) = request.cookie(SESSION_COOKIE)
        && let Ok(claims) = codec.decode(cookie.value())
    {
        invalidate_cached_account(request, claims.account_id).await;
        tracing::info!("Account {} logged out", claims.username);
    }

    Ok(HttpResponse::Ok()
        .cookie(codec.expired_cookie(SESSION_COOKIE))
        .cookie(codec.expired_cookie(SELECTED_COURSE_COOKIE))
        .cookie(codec.expired_cookie(SELECTED_ASSIGNMENT_COOKIE))
        .json(ApiResponse::success_empty("Logged out")))
}
