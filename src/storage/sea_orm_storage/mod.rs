//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 多语句写操作（级联删除、评分与审计、重新提交、创建账号）都在事务中完成。

mod accounts;
mod assignments;
mod courses;
mod enrollments;
mod grades;
mod materials;
mod participants;
mod submissions;

#[cfg(test)]
mod tests;

use crate::config::AppConfig;
use crate::errors::{LmsError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按配置连接数据库并运行迁移
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config.database.pool_size, config.database.timeout)
                .await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM storage ready, database: {}", redact_url(&db_url));
        Ok(storage)
    }

    /// 使用已有连接，运行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| LmsError::database_operation(format!("数据库迁移失败: {e}")))?;
        Ok(Self { db })
    }

    /// 内存 SQLite，测试使用
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Result<Self> {
        let db = Self::connect_sqlite("sqlite::memory:", 1, 5).await?;
        Self::from_connection(db).await
    }

    /// SQLite 专用连接（WAL + 外键约束）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");
        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| LmsError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .pragma("temp_store", "memory");
        if !in_memory {
            opt = opt
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000");
        }

        // 内存库每个连接都是独立的数据库，只能保留一个常驻连接
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(pool_size.max(1))
                .min_connections(1)
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(timeout))
            .connect_with(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| LmsError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 推断数据库类型
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(LmsError::database_config(format!(
                "Cannot infer database type from URL: {}. Supported: sqlite://, postgres://, mysql://, or a .db/.sqlite path",
                redact_url(url)
            )))
        }
    }
}

/// 日志中隐藏连接串里的密码
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.split_once(':') {
                Some((user, _)) => format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

// Storage trait 实现
use crate::models::{
    accounts::{
        Account, AccountListQuery, AccountRole, AccountListResponse, AccountUpdate, AccountWithProfile,
        NewAccount,
    },
    assignments::{Assignment, AssignmentOverview, AssignmentUpdate, MyAssignment, NewAssignment},
    courses::{
        Course, CourseListItem, CourseParticipants, CourseRole, CourseUpdate, NewCourse,
        Participant,
    },
    materials::{Material, NewMaterial},
    submissions::{GradeAudit, GradeChange, Submission, SubmissionKind},
};
use crate::storage::{RemovedFiles, Storage};
use crate::utils::upload::StoredFile;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 账号模块
    async fn create_account(&self, account: NewAccount) -> Result<AccountWithProfile> {
        self.create_account_impl(account).await
    }

    async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        self.get_account_by_id_impl(id).await
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.get_account_by_username_impl(username).await
    }

    async fn get_account_with_profile(&self, id: i64) -> Result<Option<AccountWithProfile>> {
        self.get_account_with_profile_impl(id).await
    }

    async fn count_accounts(&self) -> Result<u64> {
        self.count_accounts_impl().await
    }

    async fn list_accounts_with_pagination(
        &self,
        query: AccountListQuery,
    ) -> Result<AccountListResponse> {
        self.list_accounts_with_pagination_impl(query).await
    }

    async fn update_account(
        &self,
        id: i64,
        update: AccountUpdate,
    ) -> Result<Option<AccountWithProfile>> {
        self.update_account_impl(id, update).await
    }

    async fn update_profile_image(
        &self,
        account_id: i64,
        image_path: &str,
    ) -> Result<Option<String>> {
        self.update_profile_image_impl(account_id, image_path).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn delete_account(&self, id: i64) -> Result<Option<RemovedFiles>> {
        self.delete_account_impl(id).await
    }

    // 课程模块
    async fn create_course(&self, course: NewCourse) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn list_courses_for_account(
        &self,
        account_id: i64,
        role: AccountRole,
    ) -> Result<Vec<CourseListItem>> {
        self.list_courses_for_account_impl(account_id, role).await
    }

    async fn get_course_role(
        &self,
        course_id: i64,
        account_id: i64,
        role: AccountRole,
    ) -> Result<Option<CourseRole>> {
        self.get_course_role_impl(course_id, account_id, role).await
    }

    async fn update_course(
        &self,
        id: i64,
        update: CourseUpdate,
    ) -> Result<Option<(Course, Option<String>)>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: i64) -> Result<Option<RemovedFiles>> {
        self.delete_course_impl(id).await
    }

    // 课程成员模块
    async fn enroll_student(&self, course_id: i64, account_id: i64) -> Result<bool> {
        self.enroll_student_impl(course_id, account_id).await
    }

    async fn unenroll_student(&self, course_id: i64, account_id: i64) -> Result<bool> {
        self.unenroll_student_impl(course_id, account_id).await
    }

    async fn join_course_as_staff(&self, course_id: i64, account_id: i64) -> Result<bool> {
        self.join_course_as_staff_impl(course_id, account_id).await
    }

    async fn list_course_participants(&self, course_id: i64) -> Result<CourseParticipants> {
        self.list_course_participants_impl(course_id).await
    }

    async fn add_course_assistant(&self, course_id: i64, account_id: i64) -> Result<Participant> {
        self.add_course_assistant_impl(course_id, account_id).await
    }

    async fn remove_course_assistant(&self, course_id: i64, assistant_id: i64) -> Result<bool> {
        self.remove_course_assistant_impl(course_id, assistant_id)
            .await
    }

    // 作业模块
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn update_assignment(
        &self,
        id: i64,
        update: AssignmentUpdate,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, update).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<Option<RemovedFiles>> {
        self.delete_assignment_impl(id).await
    }

    async fn list_assignment_overviews(&self, course_id: i64) -> Result<Vec<AssignmentOverview>> {
        self.list_assignment_overviews_impl(course_id).await
    }

    async fn list_my_assignments(
        &self,
        course_id: i64,
        kind: SubmissionKind,
        owner_id: i64,
    ) -> Result<Vec<MyAssignment>> {
        self.list_my_assignments_impl(course_id, kind, owner_id)
            .await
    }

    // 提交与评分模块
    async fn upsert_submission(
        &self,
        kind: SubmissionKind,
        assignment_id: i64,
        owner_id: i64,
        files: Vec<StoredFile>,
    ) -> Result<(Submission, RemovedFiles)> {
        self.upsert_submission_impl(kind, assignment_id, owner_id, files)
            .await
    }

    async fn get_submission(&self, kind: SubmissionKind, id: i64) -> Result<Option<Submission>> {
        self.get_submission_impl(kind, id).await
    }

    async fn find_submission_by_file(&self, file_path: &str) -> Result<Option<Submission>> {
        self.find_submission_by_file_impl(file_path).await
    }

    async fn apply_grade(
        &self,
        kind: SubmissionKind,
        submission_id: i64,
        change: GradeChange,
        graded_by: i64,
    ) -> Result<Option<Submission>> {
        self.apply_grade_impl(kind, submission_id, change, graded_by)
            .await
    }

    async fn list_grade_history(
        &self,
        kind: SubmissionKind,
        submission_id: i64,
    ) -> Result<Vec<GradeAudit>> {
        self.list_grade_history_impl(kind, submission_id).await
    }

    // 课程资料模块
    async fn create_material(&self, material: NewMaterial) -> Result<Material> {
        self.create_material_impl(material).await
    }

    async fn get_material_by_id(&self, id: i64) -> Result<Option<Material>> {
        self.get_material_by_id_impl(id).await
    }

    async fn list_materials(&self, course_id: i64) -> Result<Vec<Material>> {
        self.list_materials_impl(course_id).await
    }

    async fn delete_material(&self, id: i64) -> Result<Option<Material>> {
        self.delete_material_impl(id).await
    }
}
