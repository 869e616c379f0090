//! multipart 表单读取
//!
//! 文本字段与文件统一读入内存，文件在读取时即按类别校验扩展名、大小与文件头，
//! 全部通过后才交给 [`FileStore`](super::upload::FileStore) 落盘。

use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures_util::{StreamExt, TryStreamExt};

use super::file_magic::{is_image_extension, validate_magic_bytes};
use super::upload::{FileStore, StoredFile, UploadCategory, file_extension};
use crate::config::AppConfig;
use crate::errors::LmsError;
use crate::models::{ApiResponse, ErrorCode};

/// 文本字段的长度上限
const MAX_TEXT_FIELD: usize = 64 * 1024;

/// 上传限制
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub category: UploadCategory,
    pub allowed_types: Vec<String>,
    pub max_size: usize,
}

impl UploadPolicy {
    pub fn for_category(category: UploadCategory) -> Self {
        let config = AppConfig::get();
        Self {
            category,
            allowed_types: config.upload.allowed_types.clone(),
            max_size: config.upload.max_size,
        }
    }

    fn allows(&self, extension: &str) -> bool {
        if self.category.images_only() && !is_image_extension(extension) {
            return false;
        }
        self.allowed_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(extension))
    }
}

/// 上传被拒绝的原因
#[derive(Debug)]
pub enum UploadRejection {
    TypeNotAllowed(String),
    TooLarge(String),
    Malformed(String),
    Storage(LmsError),
}

impl UploadRejection {
    pub fn into_response(self) -> HttpResponse {
        match self {
            UploadRejection::TypeNotAllowed(name) => HttpResponse::BadRequest().json(
                ApiResponse::error_empty(
                    ErrorCode::FileTypeNotAllowed,
                    format!("File type not allowed: {name}"),
                ),
            ),
            UploadRejection::TooLarge(name) => HttpResponse::PayloadTooLarge().json(
                ApiResponse::error_empty(
                    ErrorCode::FileSizeExceeded,
                    format!("File exceeds the size limit: {name}"),
                ),
            ),
            UploadRejection::Malformed(reason) => HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, reason)),
            UploadRejection::Storage(e) => {
                tracing::error!("Failed to store upload: {}", e);
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::FileUploadFailed,
                    "Failed to store uploaded file",
                ))
            }
        }
    }
}

/// 已读入内存、通过校验的文件
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub original_name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl MultipartForm {
    /// 读取整个表单，任何一个文件不合规都会拒绝整个请求
    pub async fn read(
        mut payload: Multipart,
        policy: &UploadPolicy,
    ) -> Result<Self, UploadRejection> {
        let mut form = MultipartForm::default();

        while let Some(mut field) = payload
            .try_next()
            .await
            .map_err(|e| UploadRejection::Malformed(format!("Malformed multipart body: {e}")))?
        {
            let (name, filename) = match field.content_disposition() {
                Some(cd) => (
                    cd.get_name().unwrap_or_default().to_string(),
                    cd.get_filename().map(str::to_string),
                ),
                None => continue,
            };

            match filename {
                // 未选择文件的空文件域
                Some(filename) if filename.is_empty() => {
                    while field.next().await.is_some() {}
                }
                Some(filename) => {
                    let extension = file_extension(&filename)
                        .ok_or_else(|| UploadRejection::TypeNotAllowed(filename.clone()))?;
                    if !policy.allows(&extension) {
                        return Err(UploadRejection::TypeNotAllowed(filename));
                    }

                    let mut data = Vec::new();
                    while let Some(chunk) = field.next().await {
                        let chunk = chunk.map_err(|e| {
                            UploadRejection::Malformed(format!("Upload interrupted: {e}"))
                        })?;
                        if data.len() + chunk.len() > policy.max_size {
                            return Err(UploadRejection::TooLarge(filename));
                        }
                        data.extend_from_slice(&chunk);
                    }

                    if !validate_magic_bytes(&data, &extension) {
                        return Err(UploadRejection::TypeNotAllowed(filename));
                    }

                    form.files.push(UploadedFile {
                        field_name: name,
                        original_name: filename,
                        data,
                    });
                }
                None => {
                    let mut value = Vec::new();
                    while let Some(chunk) = field.next().await {
                        let chunk = chunk.map_err(|e| {
                            UploadRejection::Malformed(format!("Form field interrupted: {e}"))
                        })?;
                        if value.len() + chunk.len() > MAX_TEXT_FIELD {
                            return Err(UploadRejection::Malformed(format!(
                                "Form field too long: {name}"
                            )));
                        }
                        value.extend_from_slice(&chunk);
                    }
                    let value = String::from_utf8(value).map_err(|_| {
                        UploadRejection::Malformed(format!("Form field is not UTF-8: {name}"))
                    })?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// 去掉首尾空白后的非空文本
    pub fn non_empty_text(&self, name: &str) -> Option<String> {
        self.text(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// 写入全部文件；中途失败时删除已写入的部分
    pub async fn store_all(
        &self,
        store: &FileStore,
        category: UploadCategory,
    ) -> Result<Vec<StoredFile>, UploadRejection> {
        let mut stored = Vec::with_capacity(self.files.len());
        for file in &self.files {
            match store.save(category, &file.original_name, &file.data).await {
                Ok(saved) => stored.push(saved),
                Err(e) => {
                    store
                        .remove_quietly(stored.iter().map(|s: &StoredFile| s.file_path.as_str()))
                        .await;
                    return Err(UploadRejection::Storage(e));
                }
            }
        }
        Ok(stored)
    }

    /// 写入第一个文件（封面、头像、资料等单文件场景）
    pub async fn store_first(
        &self,
        store: &FileStore,
        category: UploadCategory,
    ) -> Result<Option<StoredFile>, UploadRejection> {
        match self.files.first() {
            Some(file) => store
                .save(category, &file.original_name, &file.data)
                .await
                .map(Some)
                .map_err(UploadRejection::Storage),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(category: UploadCategory) -> UploadPolicy {
        UploadPolicy {
            category,
            allowed_types: vec![".pdf".into(), ".png".into(), ".txt".into()],
            max_size: 1024,
        }
    }

    #[test]
    fn test_policy_allows() {
        let submissions = policy(UploadCategory::Submissions);
        assert!(submissions.allows(".PDF"));
        assert!(!submissions.allows(".exe"));

        let profile = policy(UploadCategory::Profile);
        assert!(profile.allows(".png"));
        assert!(!profile.allows(".pdf"));
    }

    #[test]
    fn test_non_empty_text() {
        let mut form = MultipartForm::default();
        form.fields.insert("title".into(), "  Week 1  ".into());
        form.fields.insert("description".into(), "   ".into());
        assert_eq!(form.non_empty_text("title").as_deref(), Some("Week 1"));
        assert_eq!(form.non_empty_text("description"), None);
        assert_eq!(form.text("description"), Some("   "));
        assert!(!form.has_files());
    }

    #[test]
    fn test_rejection_status() {
        let resp = UploadRejection::TooLarge("big.pdf".into()).into_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::PAYLOAD_TOO_LARGE);
        let resp = UploadRejection::TypeNotAllowed("x.exe".into()).into_response();
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
