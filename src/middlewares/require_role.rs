/*!
 * 基于角色的访问控制中间件
 *
 * 此中间件必须在 RequireSession 中间件之后使用，按会话中的账号角色放行。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App, HttpServer};
 * use crate::middlewares::{RequireRole, RequireSession};
 * use crate::models::accounts::AccountRole;
 *
 * HttpServer::new(|| {
 *     App::new()
 *         .service(
 *             web::scope("/api/admin")
 *                 .wrap(RequireRole::new(&AccountRole::Administrator))  // 后验证角色
 *                 .wrap(RequireSession)  // 先验证会话
 *                 .route("/accounts", web::get().to(list_accounts))
 *         )
 * })
 * ```
 *
 * 或者验证多个角色：
 *
 * ```rust,ignore
 * .wrap(RequireRole::new_any(AccountRole::teacher_roles()))  // 任一角色即可
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{ErrorCode, accounts::AccountRole, auth::Session};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    required_roles: Vec<AccountRole>,
    require_all: bool, // true表示需要所有角色，false表示任一角色即可
}

impl RequireRole {
    /// 创建需要特定角色的中间件
    pub fn new(role: &AccountRole) -> Self {
        Self {
            required_roles: vec![*role],
            require_all: true,
        }
    }

    /// 创建需要任一角色的中间件
    pub fn new_any(roles: &[&AccountRole]) -> Self {
        Self {
            required_roles: roles.iter().map(|r| **r).collect(),
            require_all: false,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_roles: self.required_roles.clone(),
            require_all: self.require_all,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_roles: Vec<AccountRole>,
    require_all: bool,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let required_roles = self.required_roles.clone();
        let require_all = self.require_all;

        Box::pin(async move {
            let session = req.extensions().get::<Session>().cloned();

            match session {
                Some(session) => {
                    let has_permission = if require_all {
                        // 需要所有角色（通常用于单一角色验证）
                        required_roles.iter().all(|role| *role == session.role)
                    } else {
                        // 需要任一角色
                        required_roles.contains(&session.role)
                    };

                    if has_permission {
                        let res = srv.call(req).await?.map_into_left_body();
                        Ok(res)
                    } else {
                        info!(
                            "Access denied for account {} (role: {}). Required roles: {:?}",
                            session.account_id, session.role, required_roles
                        );
                        Ok(req.into_response(
                            create_error_response(
                                StatusCode::FORBIDDEN,
                                ErrorCode::Forbidden,
                                "Access denied.",
                            )
                            .map_into_right_body(),
                        ))
                    }
                }
                None => {
                    info!(
                        "Role check failed: no session in request. Make sure RequireSession is applied first."
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    #[actix_web::test]
    async fn test_role_gate() {
        for (role, expected) in [
            (AccountRole::Administrator, StatusCode::OK),
            (AccountRole::Teacher, StatusCode::FORBIDDEN),
        ] {
            let app = test::init_service(
                App::new().service(
                    web::scope("/admin")
                        .wrap(RequireRole::new(&AccountRole::Administrator))
                        .wrap_fn(move |req, srv| {
                            req.extensions_mut().insert(Session {
                                account_id: 1,
                                username: "someone".into(),
                                role,
                                selected_course_id: None,
                            });
                            srv.call(req)
                        })
                        .route("", web::get().to(HttpResponse::Ok)),
                ),
            )
            .await;
            let req = test::TestRequest::get().uri("/admin").to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected, "role {role}");
        }
    }

    #[actix_web::test]
    async fn test_missing_session_is_unauthorized() {
        let app = test::init_service(
            App::new().service(
                web::scope("/admin")
                    .wrap(RequireRole::new_any(AccountRole::teacher_roles()))
                    .route("", web::get().to(HttpResponse::Ok)),
            ),
        )
        .await;
        let req = test::TestRequest::get().uri("/admin").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
