pub mod assistants;
pub mod create;
pub mod delete;
pub mod enrollment;
pub mod list;
pub mod participants;
pub mod select;
pub mod staff;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::auth::{Selection, Session};
use crate::models::courses::{
    AddAssistantRequest, EnrollmentRequest, JoinAsStaffRequest, SelectCourseRequest,
};
use crate::storage::Storage;

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
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

    // 调用者可见的课程
    pub async fn list_courses(
        &self,
        session: Session,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, session, request).await
    }

    // 创建课程（multipart）
    pub async fn create_course(
        &self,
        session: Session,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, session, payload, request).await
    }

    // 选择当前课程
    pub async fn select_course(
        &self,
        session: Session,
        select: SelectCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        select::select_course(self, session, select, request).await
    }

    // 当前选择的课程
    pub async fn selected_course(
        &self,
        session: Session,
        selection: Selection,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        select::selected_course(self, session, selection, request).await
    }

    // 更新当前课程（multipart）
    pub async fn update_course(
        &self,
        session: Session,
        selection: Selection,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_course(self, session, selection, payload, request).await
    }

    // 删除当前课程
    pub async fn delete_course(
        &self,
        session: Session,
        selection: Selection,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_course(self, session, selection, request).await
    }

    // 选课
    pub async fn enroll(
        &self,
        session: Session,
        enrollment: EnrollmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enrollment::enroll(self, session, enrollment, request).await
    }

    // 退课
    pub async fn unenroll(
        &self,
        session: Session,
        enrollment: EnrollmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enrollment::unenroll(self, session, enrollment, request).await
    }

    // 当前课程的参与者
    pub async fn list_participants(
        &self,
        session: Session,
        selection: Selection,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        participants::list_participants(self, session, selection, request).await
    }

    // 添加助教
    pub async fn add_assistant(
        &self,
        session: Session,
        selection: Selection,
        assistant: AddAssistantRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assistants::add_assistant(self, session, selection, assistant, request).await
    }

    // 移除助教
    pub async fn remove_assistant(
        &self,
        session: Session,
        selection: Selection,
        assistant_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assistants::remove_assistant(self, session, selection, assistant_id, request).await
    }

    // 教职人员加入课程
    pub async fn join_as_staff(
        &self,
        session: Session,
        join: JoinAsStaffRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        staff::join_as_staff(self, session, join, request).await
    }
}
