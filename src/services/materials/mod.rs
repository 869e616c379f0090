pub mod create;
pub mod delete;
pub mod list;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::auth::{Selection, Session};
use crate::storage::Storage;

/// 当前课程的资料
pub struct MaterialService {
    storage: Option<Arc<dyn Storage>>,
}

impl MaterialService {
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

    pub async fn list_materials(
        &self,
        session: Session,
        selection: Selection,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_materials(self, session, selection, request).await
    }

    pub async fn create_material(
        &self,
        session: Session,
        selection: Selection,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_material(self, session, selection, payload, request).await
    }

    pub async fn delete_material(
        &self,
        session: Session,
        material_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_material(self, session, material_id, request).await
    }
}
