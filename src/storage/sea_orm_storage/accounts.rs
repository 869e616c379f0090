use std::collections::HashSet;

use super::SeaOrmStorage;
use super::participants::{find_profile, load_profiles};
use crate::entity::accounts::{ActiveModel, Column, Entity as Accounts};
use crate::entity::prelude::*;
use crate::entity::{
    assistants, courses, enrollments, grade_audit_other_submissions, grade_audits,
    other_enrollments, other_submission_files, other_submissions, students, submission_files,
    submissions, teachers, teaching_assistants,
};
use crate::errors::{LmsError, Result};
use crate::models::{
    PaginationInfo,
    accounts::{
        Account, AccountListQuery, AccountListResponse, AccountRole, AccountUpdate,
        AccountWithProfile, NewAccount, Person,
    },
};
use crate::storage::RemovedFiles;
use crate::utils::escape_like_pattern;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建账号及角色资料行
    pub async fn create_account_impl(&self, req: NewAccount) -> Result<AccountWithProfile> {
        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LmsError::database_operation(format!("开启事务失败: {e}")))?;

        let taken = Accounts::find()
            .filter(Column::Username.eq(&req.username))
            .one(&txn)
            .await?;
        if taken.is_some() {
            return Err(LmsError::conflict(format!(
                "Username '{}' is already taken",
                req.username
            )));
        }

        let account = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password_hash),
            role: Set(req.role.to_string()),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| LmsError::database_operation(format!("创建账号失败: {e}")))?;

        let profile = match req.role {
            AccountRole::Student => Some(
                students::ActiveModel {
                    account_id: Set(account.id),
                    first_name: Set(req.first_name),
                    last_name: Set(req.last_name),
                    profile_image: Set(None),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
                .into_person(),
            ),
            AccountRole::Teacher => Some(
                teachers::ActiveModel {
                    account_id: Set(account.id),
                    first_name: Set(req.first_name),
                    last_name: Set(req.last_name),
                    profile_image: Set(None),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
                .into_person(),
            ),
            AccountRole::Assistant => Some(
                assistants::ActiveModel {
                    account_id: Set(account.id),
                    first_name: Set(req.first_name),
                    last_name: Set(req.last_name),
                    profile_image: Set(None),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
                .into_person(),
            ),
            AccountRole::Administrator => None,
        };

        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(AccountWithProfile {
            account: account.into_account(),
            profile,
        })
    }

    /// 通过 ID 获取账号
    pub async fn get_account_by_id_impl(&self, id: i64) -> Result<Option<Account>> {
        let result = Accounts::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询账号失败: {e}")))?;

        Ok(result.map(|m| m.into_account()))
    }

    /// 通过用户名获取账号
    pub async fn get_account_by_username_impl(&self, username: &str) -> Result<Option<Account>> {
        let result = Accounts::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询账号失败: {e}")))?;

        Ok(result.map(|m| m.into_account()))
    }

    pub async fn get_account_with_profile_impl(
        &self,
        id: i64,
    ) -> Result<Option<AccountWithProfile>> {
        let Some(account) = self.get_account_by_id_impl(id).await? else {
            return Ok(None);
        };
        let profile = find_profile(&self.db, account.id, account.role).await?;
        Ok(Some(AccountWithProfile { account, profile }))
    }

    /// 统计账号数量
    pub async fn count_accounts_impl(&self) -> Result<u64> {
        Accounts::find()
            .count(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("统计账号数量失败: {e}")))
    }

    /// 分页列出账号
    pub async fn list_accounts_with_pagination_impl(
        &self,
        query: AccountListQuery,
    ) -> Result<AccountListResponse> {
        let (page, size) = query.pagination.normalized();

        let mut select = Accounts::find();

        // 搜索条件：用户名或邮箱
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let pattern = format!("%{}%", escape_like_pattern(search.trim()));
            select = select.filter(
                Condition::any()
                    .add(Column::Username.like(LikeExpr::new(&pattern).escape('\\')))
                    .add(Column::Email.like(LikeExpr::new(&pattern).escape('\\'))),
            );
        }

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        select = select.order_by_asc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let totals = paginator
            .num_items_and_pages()
            .await
            .map_err(|e| LmsError::database_operation(format!("查询账号总数失败: {e}")))?;

        let accounts = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询账号列表失败: {e}")))?;

        let ids: Vec<i64> = accounts.iter().map(|a| a.id).collect();
        let mut profiles = load_profiles(&self.db, &ids).await?;

        Ok(AccountListResponse {
            items: accounts
                .into_iter()
                .map(|m| {
                    let profile = profiles.remove(&m.id);
                    AccountWithProfile {
                        account: m.into_account(),
                        profile,
                    }
                })
                .collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: totals.number_of_items as i64,
                total_pages: totals.number_of_pages as i64,
            },
        })
    }

    /// 更新账号信息与资料中的姓名
    pub async fn update_account_impl(
        &self,
        id: i64,
        update: AccountUpdate,
    ) -> Result<Option<AccountWithProfile>> {
        let txn = self.db.begin().await?;

        let Some(existing) = Accounts::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        let role = existing.stored_role()?;

        let mut model: ActiveModel = existing.into();
        if let Some(email) = update.email {
            model.email = Set(email);
        }
        if let Some(password_hash) = update.password_hash {
            model.password_hash = Set(password_hash);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());
        let account = model
            .update(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新账号失败: {e}")))?;

        if update.first_name.is_some() || update.last_name.is_some() {
            update_profile_names(&txn, id, role, update.first_name, update.last_name).await?;
        }

        let profile = find_profile(&txn, id, role).await?;
        txn.commit().await?;

        Ok(Some(AccountWithProfile {
            account: account.into_account(),
            profile,
        }))
    }

    /// 更新头像路径，返回旧路径
    pub async fn update_profile_image_impl(
        &self,
        account_id: i64,
        image_path: &str,
    ) -> Result<Option<String>> {
        let Some(account) = self.get_account_by_id_impl(account_id).await? else {
            return Err(LmsError::not_found("Account not found"));
        };

        let image = Set(Some(image_path.to_string()));
        let previous = match account.role {
            AccountRole::Student => {
                let Some(row) = Students::find()
                    .filter(students::Column::AccountId.eq(account_id))
                    .one(&self.db)
                    .await?
                else {
                    return Err(LmsError::not_found("Profile not found"));
                };
                let previous = row.profile_image.clone();
                let mut model: students::ActiveModel = row.into();
                model.profile_image = image;
                model.update(&self.db).await?;
                previous
            }
            AccountRole::Teacher => {
                let Some(row) = Teachers::find()
                    .filter(teachers::Column::AccountId.eq(account_id))
                    .one(&self.db)
                    .await?
                else {
                    return Err(LmsError::not_found("Profile not found"));
                };
                let previous = row.profile_image.clone();
                let mut model: teachers::ActiveModel = row.into();
                model.profile_image = image;
                model.update(&self.db).await?;
                previous
            }
            AccountRole::Assistant => {
                let Some(row) = Assistants::find()
                    .filter(assistants::Column::AccountId.eq(account_id))
                    .one(&self.db)
                    .await?
                else {
                    return Err(LmsError::not_found("Profile not found"));
                };
                let previous = row.profile_image.clone();
                let mut model: assistants::ActiveModel = row.into();
                model.profile_image = image;
                model.update(&self.db).await?;
                previous
            }
            AccountRole::Administrator => {
                return Err(LmsError::validation("Administrators have no profile image"));
            }
        };

        Ok(previous)
    }

    /// 更新最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Accounts::update_many()
            .col_expr(Column::LastLogin, Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新最后登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 删除账号
    ///
    /// 学生的选课与提交、教职人员的参与记录与提交、助教关系一并删除；
    /// 仍拥有课程的教师不能删除。
    pub async fn delete_account_impl(&self, id: i64) -> Result<Option<RemovedFiles>> {
        let txn = self.db.begin().await?;

        let Some(account) = Accounts::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        let role = account.stored_role()?;
        let mut removed: RemovedFiles = Vec::new();

        if let Some(profile) = find_profile(&txn, id, role).await? {
            removed.extend(profile.profile_image.clone());
            match role {
                AccountRole::Student => {
                    removed.extend(delete_student_data(&txn, &profile).await?);
                    Students::delete_by_id(profile.id).exec(&txn).await?;
                }
                AccountRole::Teacher => {
                    let owned = Courses::find()
                        .filter(courses::Column::TeacherId.eq(profile.id))
                        .count(&txn)
                        .await?;
                    if owned > 0 {
                        return Err(LmsError::conflict(format!(
                            "Teacher still owns {owned} course(s)"
                        )));
                    }
                    Teachers::delete_by_id(profile.id).exec(&txn).await?;
                }
                AccountRole::Assistant => {
                    TeachingAssistants::delete_many()
                        .filter(teaching_assistants::Column::AssistantId.eq(profile.id))
                        .exec(&txn)
                        .await?;
                    Assistants::delete_by_id(profile.id).exec(&txn).await?;
                }
                AccountRole::Administrator => {}
            }
        }

        removed.extend(delete_staff_data(&txn, id).await?);

        Accounts::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除账号失败: {e}")))?;
        txn.commit().await?;

        Ok(Some(removed))
    }
}

async fn update_profile_names<C: ConnectionTrait>(
    db: &C,
    account_id: i64,
    role: AccountRole,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<()> {
    macro_rules! set_names {
        ($entity:ident, $module:ident) => {{
            if let Some(row) = $entity::find()
                .filter($module::Column::AccountId.eq(account_id))
                .one(db)
                .await?
            {
                let mut model: $module::ActiveModel = row.into();
                if let Some(first_name) = first_name {
                    model.first_name = Set(first_name);
                }
                if let Some(last_name) = last_name {
                    model.last_name = Set(last_name);
                }
                model.update(db).await?;
            }
        }};
    }

    match role {
        AccountRole::Student => set_names!(Students, students),
        AccountRole::Teacher => set_names!(Teachers, teachers),
        AccountRole::Assistant => set_names!(Assistants, assistants),
        AccountRole::Administrator => {}
    }
    Ok(())
}

/// 删除学生的选课与提交，返回提交文件路径
async fn delete_student_data<C: ConnectionTrait>(db: &C, student: &Person) -> Result<RemovedFiles> {
    let submission_ids: Vec<i64> = Submissions::find()
        .filter(submissions::Column::StudentId.eq(student.id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    let mut removed = Vec::new();
    if !submission_ids.is_empty() {
        removed = SubmissionFiles::find()
            .filter(submission_files::Column::SubmissionId.is_in(submission_ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|f| f.file_path)
            .collect();
        SubmissionFiles::delete_many()
            .filter(submission_files::Column::SubmissionId.is_in(submission_ids.clone()))
            .exec(db)
            .await?;
        GradeAudits::delete_many()
            .filter(grade_audits::Column::SubmissionId.is_in(submission_ids.clone()))
            .exec(db)
            .await?;
        Submissions::delete_many()
            .filter(submissions::Column::Id.is_in(submission_ids))
            .exec(db)
            .await?;
    }

    Enrollments::delete_many()
        .filter(enrollments::Column::StudentId.eq(student.id))
        .exec(db)
        .await?;
    Ok(removed)
}

/// 删除账号作为教职参与者的记录与提交，返回提交文件路径
async fn delete_staff_data<C: ConnectionTrait>(db: &C, account_id: i64) -> Result<RemovedFiles> {
    let submission_ids: Vec<i64> = OtherSubmissions::find()
        .filter(other_submissions::Column::AccountId.eq(account_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    let mut removed = Vec::new();
    if !submission_ids.is_empty() {
        let paths: HashSet<String> = OtherSubmissionFiles::find()
            .filter(
                other_submission_files::Column::OtherSubmissionId.is_in(submission_ids.clone()),
            )
            .all(db)
            .await?
            .into_iter()
            .map(|f| f.file_path)
            .collect();
        removed.extend(paths);
        OtherSubmissionFiles::delete_many()
            .filter(
                other_submission_files::Column::OtherSubmissionId.is_in(submission_ids.clone()),
            )
            .exec(db)
            .await?;
        GradeAuditOtherSubmissions::delete_many()
            .filter(
                grade_audit_other_submissions::Column::OtherSubmissionId
                    .is_in(submission_ids.clone()),
            )
            .exec(db)
            .await?;
        OtherSubmissions::delete_many()
            .filter(other_submissions::Column::Id.is_in(submission_ids))
            .exec(db)
            .await?;
    }

    OtherEnrollments::delete_many()
        .filter(other_enrollments::Column::AccountId.eq(account_id))
        .exec(db)
        .await?;
    Ok(removed)
}
