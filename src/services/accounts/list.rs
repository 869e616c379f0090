use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AccountService;
use crate::models::{
    ApiResponse,
    accounts::{AccountListParams, AccountListQuery},
    storage_error_response,
};

pub async fn list_accounts(
    service: &AccountService,
    query: AccountListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let mut query = AccountListQuery::from(query);
    query.search = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match storage.list_accounts_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Accounts retrieved successfully",
        ))),
        Err(e) => Ok(storage_error_response(e, "List accounts")),
    }
}
