use std::sync::Arc;

use crate::models::{
    accounts::{
        Account, AccountListQuery, AccountListResponse, AccountRole, AccountUpdate, AccountWithProfile,
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
use crate::utils::upload::StoredFile;

use crate::errors::Result;

pub mod sea_orm_storage;

/// 删除操作的结果：被删除的行所引用的文件路径，提交事务后再删除磁盘文件
pub type RemovedFiles = Vec<String>;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 账号管理方法
    // 创建账号，同一事务内写入角色资料行
    async fn create_account(&self, account: NewAccount) -> Result<AccountWithProfile>;
    // 通过ID获取账号
    async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>>;
    // 通过用户名获取账号
    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>>;
    // 获取账号及其角色资料
    async fn get_account_with_profile(&self, id: i64) -> Result<Option<AccountWithProfile>>;
    // 统计账号数量
    async fn count_accounts(&self) -> Result<u64>;
    // 分页列出账号
    async fn list_accounts_with_pagination(
        &self,
        query: AccountListQuery,
    ) -> Result<AccountListResponse>;
    // 更新账号与资料
    async fn update_account(
        &self,
        id: i64,
        update: AccountUpdate,
    ) -> Result<Option<AccountWithProfile>>;
    // 更新头像，返回被替换的旧路径
    async fn update_profile_image(&self, account_id: i64, image_path: &str)
    -> Result<Option<String>>;
    // 更新最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 删除账号及其全部从属数据
    async fn delete_account(&self, id: i64) -> Result<Option<RemovedFiles>>;

    /// 课程管理方法
    // 创建课程，所属教师同时作为教职参与者加入
    async fn create_course(&self, course: NewCourse) -> Result<Course>;
    // 通过ID获取课程
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    // 列出账号可见的课程
    async fn list_courses_for_account(
        &self,
        account_id: i64,
        role: AccountRole,
    ) -> Result<Vec<CourseListItem>>;
    // 账号在课程中的身份，无关联时为 None
    async fn get_course_role(
        &self,
        course_id: i64,
        account_id: i64,
        role: AccountRole,
    ) -> Result<Option<CourseRole>>;
    // 更新课程，返回新课程与被替换的封面路径
    async fn update_course(
        &self,
        id: i64,
        update: CourseUpdate,
    ) -> Result<Option<(Course, Option<String>)>>;
    // 级联删除课程
    async fn delete_course(&self, id: i64) -> Result<Option<RemovedFiles>>;

    /// 课程成员方法
    // 学生选课，已选时返回 false
    async fn enroll_student(&self, course_id: i64, account_id: i64) -> Result<bool>;
    // 学生退课，未选时返回 false
    async fn unenroll_student(&self, course_id: i64, account_id: i64) -> Result<bool>;
    // 教职人员加入课程，已加入时返回 false
    async fn join_course_as_staff(&self, course_id: i64, account_id: i64) -> Result<bool>;
    // 列出课程参与者
    async fn list_course_participants(&self, course_id: i64) -> Result<CourseParticipants>;
    // 添加助教
    async fn add_course_assistant(&self, course_id: i64, account_id: i64) -> Result<Participant>;
    // 移除助教
    async fn remove_course_assistant(&self, course_id: i64, assistant_id: i64) -> Result<bool>;

    /// 作业管理方法
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn update_assignment(
        &self,
        id: i64,
        update: AssignmentUpdate,
    ) -> Result<Option<Assignment>>;
    async fn delete_assignment(&self, id: i64) -> Result<Option<RemovedFiles>>;
    // 课程作业及提交汇总
    async fn list_assignment_overviews(&self, course_id: i64) -> Result<Vec<AssignmentOverview>>;
    // 课程作业及调用者本人的提交
    async fn list_my_assignments(
        &self,
        course_id: i64,
        kind: SubmissionKind,
        owner_id: i64,
    ) -> Result<Vec<MyAssignment>>;

    /// 提交与评分方法
    // 提交或重新提交，返回提交与被替换文件的路径
    async fn upsert_submission(
        &self,
        kind: SubmissionKind,
        assignment_id: i64,
        owner_id: i64,
        files: Vec<StoredFile>,
    ) -> Result<(Submission, RemovedFiles)>;
    async fn get_submission(&self, kind: SubmissionKind, id: i64) -> Result<Option<Submission>>;
    // 通过附件路径查找提交
    async fn find_submission_by_file(&self, file_path: &str) -> Result<Option<Submission>>;
    // 评分或清除成绩，并写入一条审计记录
    async fn apply_grade(
        &self,
        kind: SubmissionKind,
        submission_id: i64,
        change: GradeChange,
        graded_by: i64,
    ) -> Result<Option<Submission>>;
    async fn list_grade_history(
        &self,
        kind: SubmissionKind,
        submission_id: i64,
    ) -> Result<Vec<GradeAudit>>;

    /// 课程资料方法
    async fn create_material(&self, material: NewMaterial) -> Result<Material>;
    async fn get_material_by_id(&self, id: i64) -> Result<Option<Material>>;
    async fn list_materials(&self, course_id: i64) -> Result<Vec<Material>>;
    async fn delete_material(&self, id: i64) -> Result<Option<Material>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
