//! 业务数据模型
//!
//! 与 `entity` 中的数据库实体分离，供服务层与 HTTP 响应使用。

pub mod accounts;
pub mod assignments;
pub mod auth;
pub mod common;
pub mod courses;
pub mod materials;
pub mod submissions;

pub use common::{
    ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery, storage_error_response,
};

/// 业务错误码，0 表示成功
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证
    AuthFailed = 2000,
    SessionInvalid = 2001,

    // 账号
    AccountNotFound = 3000,
    AccountAlreadyExists = 3001,
    AccountNameInvalid = 3002,
    AccountEmailInvalid = 3003,
    AccountPasswordInvalid = 3004,
    AccountOwnsCourses = 3005,
    CanNotDeleteCurrentAccount = 3006,

    // 课程
    CourseNotFound = 4000,
    CourseNotSelected = 4001,
    CoursePermissionDenied = 4002,
    AlreadyEnrolled = 4003,
    NotEnrolled = 4004,
    AssistantNotFound = 4005,
    StudentNotFound = 4006,

    // 作业与提交
    AssignmentNotFound = 5000,
    AssignmentNotSelected = 5001,
    SubmissionNotFound = 5002,
    GradeInvalid = 5003,

    // 课程资料
    MaterialNotFound = 6000,

    // 文件
    FileNotFound = 7000,
    FileUploadFailed = 7001,
    FileTypeNotAllowed = 7002,
    FileSizeExceeded = 7003,
}
