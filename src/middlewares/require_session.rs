/*!
 * 会话中间件
 *
 * 解码 `session` Cookie 中的签名令牌，核对账号仍然存在且角色未变，
 * 然后把 [`Session`] 写入请求扩展。处理函数通过提取器显式取得会话：
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::RequireSession;
 * use crate::models::auth::Session;
 *
 * async fn handler(session: Session) -> actix_web::Result<HttpResponse> {
 *     Ok(HttpResponse::Ok().json(session.account_id))
 * }
 *
 * web::scope("/api/courses")
 *     .wrap(RequireSession)
 *     .route("", web::get().to(handler));
 * ```
 *
 * 账号查询结果按 `session:{account_id}` 缓存，账号被修改或删除时调用
 * [`invalidate_cached_account`] 清除。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    error::InternalError,
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::ErrorCode;
use crate::models::accounts::Account;
use crate::models::auth::{Selection, Session};
use crate::storage::Storage;
use crate::utils::session::{
    SELECTED_ASSIGNMENT_COOKIE, SELECTED_COURSE_COOKIE, SESSION_COOKIE, SessionCodec,
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireSession;

fn cache_key(account_id: i64) -> String {
    format!("session:{account_id}")
}

/// 清除会话中间件缓存的账号
pub async fn invalidate_cached_account(request: &HttpRequest, account_id: i64) {
    if let Some(cache) = request.app_data::<web::Data<Arc<dyn ObjectCache>>>() {
        cache.remove(&cache_key(account_id)).await;
    }
}

// 辅助函数：解码 Cookie 并加载账号
async fn resolve_session(req: &ServiceRequest) -> Result<Session, String> {
    let token = req
        .cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| "Missing session cookie".to_string())?;

    let claims = SessionCodec::global().decode(&token).map_err(|err| {
        info!("Session token rejected: {}", err);
        "Invalid session".to_string()
    })?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|c| c.get_ref().clone());
    let key = cache_key(claims.account_id);

    let cached = match &cache {
        Some(cache) => match cache.get_json::<Account>(&key).await {
            CacheResult::Found(account) => Some(account),
            CacheResult::NotFound => None,
        },
        None => None,
    };

    let account = match cached {
        Some(account) => account,
        None => {
            let storage = req
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .ok_or_else(|| "Storage unavailable".to_string())?
                .get_ref()
                .clone();
            let account = storage
                .get_account_by_id(claims.account_id)
                .await
                .map_err(|err| {
                    info!("Failed to load session account: {}", err);
                    "Failed to load account".to_string()
                })?
                .ok_or_else(|| "Account no longer exists".to_string())?;

            if let Some(cache) = &cache {
                cache
                    .insert_json(key, &account, AppConfig::get().cache.default_ttl)
                    .await;
            }
            account
        }
    };

    // 角色被管理员修改后旧令牌失效
    if account.role != claims.role {
        return Err("Account role changed, please sign in again".to_string());
    }

    let mut session = Session::from(claims);
    session.username = account.username;
    Ok(session)
}

impl<S, B> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireSessionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSessionMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireSessionMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match resolve_session(&req).await {
                Ok(session) => {
                    debug!("Session accepted for account {}", session.account_id);
                    req.extensions_mut().insert(session);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!("Session check failed for {}: {}", req.path(), err);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::SessionInvalid,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl FromRequest for Session {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = req.extensions().get::<Session>().cloned();
        ready(session.ok_or_else(|| {
            InternalError::from_response(
                "missing session",
                create_error_response(
                    StatusCode::UNAUTHORIZED,
                    ErrorCode::Unauthorized,
                    "Authentication required",
                ),
            )
            .into()
        }))
    }
}

/// 读取选择 Cookie，无效的值视为未选择
impl FromRequest for Selection {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let read = |name: &str| {
            req.cookie(name)
                .and_then(|c| c.value().trim().parse::<i64>().ok())
        };
        ready(Ok(Selection {
            course_id: read(SELECTED_COURSE_COOKIE),
            assignment_id: read(SELECTED_ASSIGNMENT_COOKIE),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_selection_reads_cookies() {
        let req = TestRequest::default()
            .cookie(Cookie::new(SELECTED_COURSE_COOKIE, "12"))
            .cookie(Cookie::new(SELECTED_ASSIGNMENT_COOKIE, "abc"))
            .to_http_request();
        let selection = Selection::extract(&req).await.expect("infallible");
        assert_eq!(selection.course_id, Some(12));
        assert_eq!(selection.assignment_id, None);
    }

    #[actix_web::test]
    async fn test_session_extractor_requires_middleware() {
        let req = TestRequest::default().to_http_request();
        assert!(Session::extract(&req).await.is_err());

        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(Session {
            account_id: 3,
            username: "alice".into(),
            role: crate::models::accounts::AccountRole::Student,
            selected_course_id: None,
        });
        let session = Session::extract(&req).await.expect("session present");
        assert_eq!(session.account_id, 3);
    }
}
