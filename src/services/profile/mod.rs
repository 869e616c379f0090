pub mod get;
pub mod image;
pub mod password;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::accounts::{ChangePasswordRequest, UpdateProfileRequest};
use crate::models::auth::Session;
use crate::storage::Storage;

/// 当前账号的个人资料
pub struct ProfileService {
    storage: Option<Arc<dyn Storage>>,
}

impl ProfileService {
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

    pub async fn get_profile(
        &self,
        session: Session,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_profile(self, session, request).await
    }

    pub async fn update_profile(
        &self,
        session: Session,
        update: UpdateProfileRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_profile(self, session, update, request).await
    }

    pub async fn change_password(
        &self,
        session: Session,
        change: ChangePasswordRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        password::change_password(self, session, change, request).await
    }

    // 上传头像
    pub async fn upload_image(
        &self,
        session: Session,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        image::upload_image(self, session, payload, request).await
    }
}
