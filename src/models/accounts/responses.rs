use super::entities::AccountWithProfile;
use crate::models::PaginatedResponse;

// 账号列表响应
pub type AccountListResponse = PaginatedResponse<AccountWithProfile>;
