pub mod access;
pub mod accounts;
pub mod assignments;
pub mod auth;
pub mod courses;
pub mod files;
pub mod materials;
pub mod profile;

pub use accounts::AccountService;
pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use courses::CourseService;
pub use files::FileService;
pub use materials::MaterialService;
pub use profile::ProfileService;

use actix_web::{HttpRequest, web};

use crate::utils::upload::FileStore;

/// 提前返回错误响应
///
/// 用于 `Result<T, HttpResponse>` 形式的辅助函数，`Err` 直接作为处理结果返回。
macro_rules! respond_on_err {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(response) => return Ok(response),
        }
    };
}
pub(crate) use respond_on_err;

/// 上传文件存储，未注册时按配置创建
pub(crate) fn file_store(request: &HttpRequest) -> FileStore {
    request
        .app_data::<web::Data<FileStore>>()
        .map(|store| store.get_ref().clone())
        .unwrap_or_else(FileStore::from_config)
}
