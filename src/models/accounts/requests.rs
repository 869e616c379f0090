use super::entities::AccountRole;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 账号列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "account.ts")]
pub struct AccountListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub role: Option<AccountRole>,
    pub search: Option<String>,
}

// 账号列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct AccountListQuery {
    pub pagination: PaginationQuery,
    pub role: Option<AccountRole>,
    pub search: Option<String>,
}

impl From<AccountListParams> for AccountListQuery {
    fn from(params: AccountListParams) -> Self {
        Self {
            pagination: params.pagination,
            role: params.role,
            search: params.search,
        }
    }
}

// 管理员创建账号请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "account.ts")]
pub struct CreateAccountRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: AccountRole,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

// 管理员更新账号请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "account.ts")]
pub struct UpdateAccountRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// 用户更新自己的资料
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "account.ts")]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// 修改密码
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "account.ts")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// 存储层创建账号参数（密码已哈希）
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: AccountRole,
    pub first_name: String,
    pub last_name: String,
}

/// 存储层更新账号参数
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
