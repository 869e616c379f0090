use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::accounts::{
    AccountListParams, AccountRole, CreateAccountRequest, UpdateAccountRequest,
};
use crate::models::auth::Session;
use crate::services::AccountService;

// 懒加载的全局 AccountService 实例
static ACCOUNT_SERVICE: Lazy<AccountService> = Lazy::new(AccountService::new_lazy);

pub async fn list_accounts(
    req: HttpRequest,
    query: web::Query<AccountListParams>,
) -> ActixResult<HttpResponse> {
    ACCOUNT_SERVICE.list_accounts(query.into_inner(), &req).await
}

pub async fn create_account(
    req: HttpRequest,
    account: web::Json<CreateAccountRequest>,
) -> ActixResult<HttpResponse> {
    ACCOUNT_SERVICE
        .create_account(account.into_inner(), &req)
        .await
}

pub async fn update_account(
    req: HttpRequest,
    account_id: web::Path<i64>,
    update: web::Json<UpdateAccountRequest>,
) -> ActixResult<HttpResponse> {
    ACCOUNT_SERVICE
        .update_account(account_id.into_inner(), update.into_inner(), &req)
        .await
}

pub async fn delete_account(
    req: HttpRequest,
    session: Session,
    account_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    ACCOUNT_SERVICE
        .delete_account(session, account_id.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .wrap(middlewares::RequireRole::new(&AccountRole::Administrator))
            .wrap(middlewares::RequireSession)
            .route("/accounts", web::get().to(list_accounts))
            .route("/accounts", web::post().to(create_account))
            .route("/accounts/{id}", web::put().to(update_account))
            .route("/accounts/{id}", web::delete().to(delete_account)),
    );
}
