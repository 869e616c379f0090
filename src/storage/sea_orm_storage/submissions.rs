//! 提交存储
//!
//! 学生提交与教职提交分表存放，由 [`SubmissionKind`] 选择对应的表。

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{other_submission_files, other_submissions, submission_files, submissions};
use crate::errors::{LmsError, Result};
use crate::models::submissions::{GradeState, Submission, SubmissionFile, SubmissionKind};
use crate::storage::RemovedFiles;
use crate::utils::upload::StoredFile;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 提交或重新提交
    ///
    /// 同一参与者对同一作业只有一行提交：重新提交时保留 id 与评分状态，
    /// 替换附件并刷新提交时间。返回被替换附件的路径。
    pub async fn upsert_submission_impl(
        &self,
        kind: SubmissionKind,
        assignment_id: i64,
        owner_id: i64,
        files: Vec<StoredFile>,
    ) -> Result<(Submission, RemovedFiles)> {
        let txn = self.db.begin().await?;
        let result = match kind {
            SubmissionKind::Student => {
                upsert_student_submission(&txn, assignment_id, owner_id, files).await?
            }
            SubmissionKind::Other => {
                upsert_other_submission(&txn, assignment_id, owner_id, files).await?
            }
        };
        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;
        Ok(result)
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_impl(
        &self,
        kind: SubmissionKind,
        id: i64,
    ) -> Result<Option<Submission>> {
        find_submission(&self.db, kind, id).await
    }

    /// 通过附件路径找到所属提交
    pub async fn find_submission_by_file_impl(
        &self,
        file_path: &str,
    ) -> Result<Option<Submission>> {
        if let Some(file) = SubmissionFiles::find()
            .filter(submission_files::Column::FilePath.eq(file_path))
            .one(&self.db)
            .await?
        {
            return find_submission(&self.db, SubmissionKind::Student, file.submission_id).await;
        }
        if let Some(file) = OtherSubmissionFiles::find()
            .filter(other_submission_files::Column::FilePath.eq(file_path))
            .one(&self.db)
            .await?
        {
            return find_submission(&self.db, SubmissionKind::Other, file.other_submission_id).await;
        }
        Ok(None)
    }
}

pub(super) async fn find_submission<C: ConnectionTrait>(
    db: &C,
    kind: SubmissionKind,
    id: i64,
) -> Result<Option<Submission>> {
    let submission = match kind {
        SubmissionKind::Student => match Submissions::find_by_id(id).one(db).await? {
            Some(model) => {
                let files = student_files(db, &[id]).await?.remove(&id);
                Some(model.into_submission(files.unwrap_or_default()))
            }
            None => None,
        },
        SubmissionKind::Other => match OtherSubmissions::find_by_id(id).one(db).await? {
            Some(model) => {
                let files = other_files(db, &[id]).await?.remove(&id);
                Some(model.into_submission(files.unwrap_or_default()))
            }
            None => None,
        },
    };
    Ok(submission)
}

/// 一组作业的学生提交（含附件），可限定为单个学生
pub(super) async fn student_submissions_for<C: ConnectionTrait>(
    db: &C,
    assignment_ids: &[i64],
    student_id: Option<i64>,
) -> Result<Vec<Submission>> {
    if assignment_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut query = Submissions::find()
        .filter(submissions::Column::AssignmentId.is_in(assignment_ids.iter().copied()))
        .order_by_asc(submissions::Column::SubmittedAt);
    if let Some(student_id) = student_id {
        query = query.filter(submissions::Column::StudentId.eq(student_id));
    }
    let models = query
        .all(db)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询提交失败: {e}")))?;

    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
    let mut files = student_files(db, &ids).await?;
    Ok(models
        .into_iter()
        .map(|m| {
            let attached = files.remove(&m.id).unwrap_or_default();
            m.into_submission(attached)
        })
        .collect())
}

/// 一组作业的教职提交（含附件），可限定为单个账号
pub(super) async fn other_submissions_for<C: ConnectionTrait>(
    db: &C,
    assignment_ids: &[i64],
    account_id: Option<i64>,
) -> Result<Vec<Submission>> {
    if assignment_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut query = OtherSubmissions::find()
        .filter(other_submissions::Column::AssignmentId.is_in(assignment_ids.iter().copied()))
        .order_by_asc(other_submissions::Column::SubmittedAt);
    if let Some(account_id) = account_id {
        query = query.filter(other_submissions::Column::AccountId.eq(account_id));
    }
    let models = query
        .all(db)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询教职提交失败: {e}")))?;

    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
    let mut files = other_files(db, &ids).await?;
    Ok(models
        .into_iter()
        .map(|m| {
            let attached = files.remove(&m.id).unwrap_or_default();
            m.into_submission(attached)
        })
        .collect())
}

async fn student_files<C: ConnectionTrait>(
    db: &C,
    submission_ids: &[i64],
) -> Result<HashMap<i64, Vec<SubmissionFile>>> {
    let mut grouped: HashMap<i64, Vec<SubmissionFile>> = HashMap::new();
    if submission_ids.is_empty() {
        return Ok(grouped);
    }
    for f in SubmissionFiles::find()
        .filter(submission_files::Column::SubmissionId.is_in(submission_ids.iter().copied()))
        .order_by_asc(submission_files::Column::Id)
        .all(db)
        .await?
    {
        grouped.entry(f.submission_id).or_default().push(f.into_file());
    }
    Ok(grouped)
}

async fn other_files<C: ConnectionTrait>(
    db: &C,
    submission_ids: &[i64],
) -> Result<HashMap<i64, Vec<SubmissionFile>>> {
    let mut grouped: HashMap<i64, Vec<SubmissionFile>> = HashMap::new();
    if submission_ids.is_empty() {
        return Ok(grouped);
    }
    for f in OtherSubmissionFiles::find()
        .filter(
            other_submission_files::Column::OtherSubmissionId.is_in(submission_ids.iter().copied()),
        )
        .order_by_asc(other_submission_files::Column::Id)
        .all(db)
        .await?
    {
        grouped
            .entry(f.other_submission_id)
            .or_default()
            .push(f.into_file());
    }
    Ok(grouped)
}

async fn upsert_student_submission<C: ConnectionTrait>(
    db: &C,
    assignment_id: i64,
    student_id: i64,
    files: Vec<StoredFile>,
) -> Result<(Submission, RemovedFiles)> {
    let now = chrono::Utc::now().timestamp();
    let existing = Submissions::find()
        .filter(submissions::Column::AssignmentId.eq(assignment_id))
        .filter(submissions::Column::StudentId.eq(student_id))
        .one(db)
        .await?;

    let (model, replaced) = match existing {
        Some(row) => {
            let replaced: RemovedFiles = SubmissionFiles::find()
                .filter(submission_files::Column::SubmissionId.eq(row.id))
                .all(db)
                .await?
                .into_iter()
                .map(|f| f.file_path)
                .collect();
            SubmissionFiles::delete_many()
                .filter(submission_files::Column::SubmissionId.eq(row.id))
                .exec(db)
                .await?;

            let mut active: submissions::ActiveModel = row.into();
            active.submitted_at = Set(now);
            (active.update(db).await?, replaced)
        }
        None => {
            let inserted = submissions::ActiveModel {
                assignment_id: Set(assignment_id),
                student_id: Set(student_id),
                submitted_at: Set(now),
                grade: Set(None),
                grade_state: Set(GradeState::Ungraded.to_string()),
                graded_by: Set(None),
                graded_at: Set(None),
                ..Default::default()
            }
            .insert(db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建提交失败: {e}")))?;
            (inserted, Vec::new())
        }
    };

    let mut attached = Vec::with_capacity(files.len());
    for file in files {
        let row = submission_files::ActiveModel {
            submission_id: Set(model.id),
            file_path: Set(file.file_path),
            original_name: Set(file.original_name),
            ..Default::default()
        }
        .insert(db)
        .await?;
        attached.push(row.into_file());
    }

    Ok((model.into_submission(attached), replaced))
}

async fn upsert_other_submission<C: ConnectionTrait>(
    db: &C,
    assignment_id: i64,
    account_id: i64,
    files: Vec<StoredFile>,
) -> Result<(Submission, RemovedFiles)> {
    let now = chrono::Utc::now().timestamp();
    let existing = OtherSubmissions::find()
        .filter(other_submissions::Column::AssignmentId.eq(assignment_id))
        .filter(other_submissions::Column::AccountId.eq(account_id))
        .one(db)
        .await?;

    let (model, replaced) = match existing {
        Some(row) => {
            let replaced: RemovedFiles = OtherSubmissionFiles::find()
                .filter(other_submission_files::Column::OtherSubmissionId.eq(row.id))
                .all(db)
                .await?
                .into_iter()
                .map(|f| f.file_path)
                .collect();
            OtherSubmissionFiles::delete_many()
                .filter(other_submission_files::Column::OtherSubmissionId.eq(row.id))
                .exec(db)
                .await?;

            let mut active: other_submissions::ActiveModel = row.into();
            active.submitted_at = Set(now);
            (active.update(db).await?, replaced)
        }
        None => {
            let inserted = other_submissions::ActiveModel {
                assignment_id: Set(assignment_id),
                account_id: Set(account_id),
                submitted_at: Set(now),
                grade: Set(None),
                grade_state: Set(GradeState::Ungraded.to_string()),
                graded_by: Set(None),
                graded_at: Set(None),
                ..Default::default()
            }
            .insert(db)
            .await
            .map_err(|e| LmsError::database_operation(format!("创建教职提交失败: {e}")))?;
            (inserted, Vec::new())
        }
    };

    let mut attached = Vec::with_capacity(files.len());
    for file in files {
        let row = other_submission_files::ActiveModel {
            other_submission_id: Set(model.id),
            file_path: Set(file.file_path),
            original_name: Set(file.original_name),
            ..Default::default()
        }
        .insert(db)
        .await?;
        attached.push(row.into_file());
    }

    Ok((model.into_submission(attached), replaced))
}
