pub mod download;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::auth::Session;
use crate::storage::Storage;

/// 已上传文件的读取
///
/// 文件路径来自数据库记录，磁盘位置由 [`FileStore`](crate::utils::upload::FileStore) 解析。
/// 提交附件只对提交者本人与课程教职人员开放。
pub struct FileService {
    storage: Option<Arc<dyn Storage>>,
}

impl FileService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 下载文件
    pub async fn download(
        &self,
        session: Session,
        category: String,
        name: String,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, session, category, name, request).await
    }
}
