//! 上传文件的落盘与删除
//!
//! 文件按类别存放在 `<upload.dir>/<category>/` 下，数据库记录
//! `/{category}/{name}` 形式的路径。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::config::AppConfig;
use crate::errors::{LmsError, Result};

/// 上传类别，对应上传目录下的固定子目录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCategory {
    Courses,
    CourseMaterials,
    Materials,
    Profile,
    Submissions,
}

impl UploadCategory {
    pub const ALL: [UploadCategory; 5] = [
        UploadCategory::Courses,
        UploadCategory::CourseMaterials,
        UploadCategory::Materials,
        UploadCategory::Profile,
        UploadCategory::Submissions,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            UploadCategory::Courses => "courses",
            UploadCategory::CourseMaterials => "courseMaterials",
            UploadCategory::Materials => "materials",
            UploadCategory::Profile => "profile",
            UploadCategory::Submissions => "submissions",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.dir_name() == name)
    }

    /// 课程封面与头像只接受图片
    pub fn images_only(&self) -> bool {
        matches!(self, UploadCategory::Courses | UploadCategory::Profile)
    }
}

/// 已写入磁盘的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_path: String,
    pub original_name: String,
    pub size: u64,
}

/// 清理客户端提供的文件名，只保留最后一段并替换危险字符
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return "file".to_string();
    }
    if cleaned.chars().count() <= 100 {
        return cleaned.to_string();
    }

    // 过长时截断主体，保留扩展名
    let ext = file_extension(cleaned).unwrap_or_default();
    let stem: String = cleaned.chars().take(100 - ext.chars().count()).collect();
    format!("{stem}{ext}")
}

/// 小写扩展名（含点号），没有扩展名时为 None
pub fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
}

/// 本地文件存储
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config() -> Self {
        Self::new(&AppConfig::get().upload.dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 创建全部类别目录
    pub async fn ensure_dirs(&self) -> Result<()> {
        for category in UploadCategory::ALL {
            tokio::fs::create_dir_all(self.root.join(category.dir_name())).await?;
        }
        Ok(())
    }

    /// 以 `{timestamp}-{name}` 命名写入，重名时插入 UUID 段后重试
    pub async fn save(
        &self,
        category: UploadCategory,
        original_name: &str,
        data: &[u8],
    ) -> Result<StoredFile> {
        let dir = self.root.join(category.dir_name());
        tokio::fs::create_dir_all(&dir).await?;

        let sanitized = sanitize_file_name(original_name);
        let timestamp = chrono::Utc::now().timestamp_millis();
        let candidates = [
            format!("{timestamp}-{sanitized}"),
            format!("{timestamp}-{}-{sanitized}", uuid::Uuid::new_v4().simple()),
        ];

        for name in candidates {
            let path = dir.join(&name);
            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = file.write_all(data).await {
                drop(file);
                let _ = tokio::fs::remove_file(&path).await;
                return Err(e.into());
            }
            file.flush().await?;

            return Ok(StoredFile {
                file_path: format!("/{}/{}", category.dir_name(), name),
                original_name: original_name.to_string(),
                size: data.len() as u64,
            });
        }

        Err(LmsError::file_operation(format!(
            "Could not allocate a unique name for {sanitized}"
        )))
    }

    /// 把数据库中的 `/{category}/{name}` 解析为磁盘路径，拒绝越界路径
    pub fn resolve(&self, stored_path: &str) -> Option<PathBuf> {
        let trimmed = stored_path.strip_prefix('/')?;
        let (category, name) = trimmed.split_once('/')?;
        let category = UploadCategory::from_dir_name(category)?;

        if name.is_empty()
            || name.contains(['/', '\\'])
            || name == "."
            || name == ".."
            || name.starts_with('.')
        {
            return None;
        }

        Some(self.root.join(category.dir_name()).join(name))
    }

    /// 尽力删除文件，失败只记录日志
    pub async fn remove_quietly<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for stored in paths {
            let stored = stored.as_ref();
            let Some(path) = self.resolve(stored) else {
                tracing::warn!("Skip unlinking unrecognized upload path: {}", stored);
                continue;
            };
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("Removed upload {}", stored),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!("Upload already missing: {}", stored)
                }
                Err(e) => tracing::warn!("Failed to remove upload {}: {}", stored, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\my file (1).docx"), "my_file__1_.docx");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "file");

        let long = format!("{}.pdf", "a".repeat(300));
        let cleaned = sanitize_file_name(&long);
        assert_eq!(cleaned.chars().count(), 100);
        assert!(cleaned.ends_with(".pdf"));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("Slides.PPTX").as_deref(), Some(".pptx"));
        assert_eq!(file_extension("Makefile"), None);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let store = FileStore::new("/srv/uploads");
        assert_eq!(
            store.resolve("/materials/1700000000000-notes.pdf"),
            Some(PathBuf::from("/srv/uploads/materials/1700000000000-notes.pdf"))
        );
        assert_eq!(store.resolve("/materials/../secret"), None);
        assert_eq!(store.resolve("/unknown/file.txt"), None);
        assert_eq!(store.resolve("materials/file.txt"), None);
        assert_eq!(store.resolve("/materials/.."), None);
    }

    #[tokio::test]
    async fn test_save_uses_unique_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());

        let first = store
            .save(UploadCategory::Submissions, "answer.txt", b"v1")
            .await
            .expect("first save");
        let second = store
            .save(UploadCategory::Submissions, "answer.txt", b"v2")
            .await
            .expect("second save");

        assert!(first.file_path.starts_with("/submissions/"));
        assert!(first.file_path.ends_with("-answer.txt"));
        assert_ne!(first.file_path, second.file_path);
        assert_eq!(first.size, 2);

        let on_disk = store.resolve(&second.file_path).expect("resolvable");
        assert_eq!(tokio::fs::read(on_disk).await.expect("read"), b"v2");
    }

    #[tokio::test]
    async fn test_remove_quietly_ignores_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        let saved = store
            .save(UploadCategory::Materials, "notes.md", b"# notes")
            .await
            .expect("save");

        store
            .remove_quietly([saved.file_path.clone(), "/materials/missing.md".to_string()])
            .await;

        let path = store.resolve(&saved.file_path).expect("resolvable");
        assert!(!path.exists());
    }
}
