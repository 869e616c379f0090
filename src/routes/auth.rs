use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::{LoginRequest, Selection, Session};
use crate::services::AuthService;

// 懒加载的全局 AuthService 实例
static AUTH_SERVICE: Lazy<AuthService> = Lazy::new(AuthService::new_lazy);

pub async fn login(
    req: HttpRequest,
    login_request: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login(login_request.into_inner(), &req).await
}

pub async fn logout(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.logout(&req).await
}

pub async fn session(
    req: HttpRequest,
    session: Session,
    selection: Selection,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.session(session, selection, &req).await
}

// 配置路由
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(
                web::resource("/login")
                    .wrap(middlewares::RateLimit::login())
                    .route(web::post().to(login)),
            )
            .route("/logout", web::post().to(logout))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireSession)
                    .route("/session", web::get().to(session)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::accounts::{AccountRole, NewAccount};
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::utils::password::hash_password_with;
    use crate::utils::session::{SESSION_COOKIE, SessionCodec};
    use actix_web::{App, http::StatusCode, test};
    use std::sync::Arc;

    async fn storage_with_teacher() -> Arc<dyn Storage> {
        let storage = SeaOrmStorage::in_memory().await.expect("in-memory storage");
        storage
            .create_account(NewAccount {
                username: "hopper".into(),
                email: "hopper@example.com".into(),
                password_hash: hash_password_with("Cobol1959!", 1024, 1, 1).expect("hash"),
                role: AccountRole::Teacher,
                first_name: "Grace".into(),
                last_name: "Hopper".into(),
            })
            .await
            .expect("create account");
        Arc::new(storage)
    }

    #[actix_web::test]
    async fn test_login_sets_session_cookie_with_role() {
        let storage = storage_with_teacher().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .configure(configure_auth_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .insert_header(("X-Forwarded-For", "10.20.30.1"))
            .set_json(serde_json::json!({"username": "hopper", "password": "Cobol1959!"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("session cookie");
        assert!(cookie.http_only().unwrap_or(false));
        let claims = SessionCodec::global()
            .decode(cookie.value())
            .expect("decodable token");
        assert_eq!(claims.role, AccountRole::Teacher);
        assert_eq!(claims.username, "hopper");
    }

    #[actix_web::test]
    async fn test_login_wrong_password_sets_no_cookie() {
        let storage = storage_with_teacher().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .configure(configure_auth_routes),
        )
        .await;

        for (username, password) in [("hopper", "wrong-password"), ("nobody", "Cobol1959!")] {
            let req = test::TestRequest::post()
                .uri("/api/auth/login")
                .insert_header(("X-Forwarded-For", "10.20.30.2"))
                .set_json(serde_json::json!({"username": username, "password": password}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            assert!(
                resp.response()
                    .cookies()
                    .all(|c| c.name() != SESSION_COOKIE)
            );
        }
    }

    #[actix_web::test]
    async fn test_session_requires_cookie() {
        let storage = storage_with_teacher().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .configure(configure_auth_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/auth/session").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
