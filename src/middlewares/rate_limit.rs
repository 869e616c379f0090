//! 固定窗口限流
//!
//! 已建立会话的请求按账号计数，其余按客户端 IP 计数。每个预设使用独立的键空间，
//! 窗口从该键的第一次请求开始计时，超出次数返回 429 与剩余等待秒数。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::net::IpAddr;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::models::{ApiResponse, ErrorCode, auth::Session};

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    hits: u32,
}

// 空闲一小时的计数器直接淘汰，窗口本身由 Window::opened 判定
static WINDOWS: Lazy<Cache<String, Window>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_idle(Duration::from_secs(3600))
        .build()
});

#[derive(Debug, Clone)]
pub struct RateLimit {
    scope: &'static str,
    limit: u32,
    window: Duration,
}

impl RateLimit {
    pub fn new(scope: &'static str, limit: u32, window_secs: u64) -> Self {
        Self {
            scope,
            limit,
            window: Duration::from_secs(window_secs),
        }
    }

    /// 登录：每 IP 每分钟 5 次
    pub fn login() -> Self {
        Self::new("login", 5, 60)
    }

    /// 作业提交与头像上传
    pub fn file_upload() -> Self {
        Self::new("upload", 20, 60)
    }

    /// 课程、作业、资料接口
    pub fn api() -> Self {
        Self::new("api", 120, 60)
    }

    fn key_for(&self, req: &ServiceRequest) -> String {
        let session_account = req.extensions().get::<Session>().map(|s| s.account_id);
        match session_account {
            Some(account_id) => format!("{}:account:{account_id}", self.scope),
            None => format!("{}:ip:{}", self.scope, client_ip(req)),
        }
    }

    /// 记录一次请求；超限时返回需要等待的秒数
    async fn hit(&self, key: String) -> Result<(), u64> {
        let window = self.window;
        let entry = WINDOWS
            .entry(key)
            .and_upsert_with(|current| {
                let now = Instant::now();
                let next = match current.map(|e| e.into_value()) {
                    Some(w) if now.duration_since(w.opened) < window => Window {
                        opened: w.opened,
                        hits: w.hits.saturating_add(1),
                    },
                    _ => Window {
                        opened: now,
                        hits: 1,
                    },
                };
                ready(next)
            })
            .await;

        let state = entry.into_value();
        if state.hits <= self.limit {
            return Ok(());
        }
        let elapsed = state.opened.elapsed();
        Err(window.saturating_sub(elapsed).as_secs().max(1))
    }
}

/// 连接信息中的真实地址（Forwarded / X-Forwarded-For / 对端地址），无法解析时归为同一桶
fn client_ip(req: &ServiceRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .and_then(|addr| {
            let addr = addr.trim();
            addr.parse::<IpAddr>()
                .ok()
                .or_else(|| addr.parse::<std::net::SocketAddr>().ok().map(|s| s.ip()))
        })
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn too_many_requests(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Retry-After", retry_after.to_string()))
        .json(ApiResponse::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            policy: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    policy: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let policy = self.policy.clone();

        Box::pin(async move {
            let key = policy.key_for(&req);
            if let Err(retry_after) = policy.hit(key.clone()).await {
                warn!(
                    "Rate limit exceeded for {} ({} per {:?})",
                    key, policy.limit, policy.window
                );
                let response = too_many_requests(retry_after).map_into_right_body();
                return Ok(req.into_response(response));
            }
            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test as actix_test, web};

    #[test]
    fn test_presets_use_separate_scopes() {
        let presets = [RateLimit::login(), RateLimit::file_upload(), RateLimit::api()];
        let scopes: Vec<&str> = presets.iter().map(|p| p.scope).collect();
        assert_eq!(scopes, vec!["login", "upload", "api"]);
        assert_eq!(RateLimit::login().limit, 5);
        assert!(presets.iter().all(|p| p.window == Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_window_resets_after_expiry() {
        let policy = RateLimit {
            scope: "window_reset",
            limit: 1,
            window: Duration::from_millis(50),
        };
        assert!(policy.hit("window_reset:ip:192.0.2.1".into()).await.is_ok());
        assert!(policy.hit("window_reset:ip:192.0.2.1".into()).await.is_err());
        assert!(policy.hit("window_reset:ip:192.0.2.2".into()).await.is_ok());

        std::thread::sleep(Duration::from_millis(80));
        assert!(policy.hit("window_reset:ip:192.0.2.1".into()).await.is_ok());
    }

    #[actix_web::test]
    async fn test_limit_exceeded_returns_429() {
        let app = actix_test::init_service(
            App::new().service(
                web::scope("/limited")
                    .wrap(RateLimit::new("limited_route", 2, 60))
                    .route("", web::get().to(HttpResponse::Ok)),
            ),
        )
        .await;

        let mut statuses = Vec::new();
        for _ in 0..3 {
            let req = actix_test::TestRequest::get()
                .uri("/limited")
                .insert_header(("X-Forwarded-For", "203.0.113.7"))
                .to_request();
            statuses.push(actix_test::call_service(&app, req).await.status());
        }
        assert_eq!(
            statuses,
            vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
        );

        // 其他客户端不受影响
        let req = actix_test::TestRequest::get()
            .uri("/limited")
            .insert_header(("X-Forwarded-For", "203.0.113.8"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
