//! 评分与评分审计

use super::SeaOrmStorage;
use super::submissions::find_submission;
use crate::entity::prelude::*;
use crate::entity::{grade_audit_other_submissions, grade_audits, other_submissions, submissions};
use crate::errors::{LmsError, Result};
use crate::models::submissions::{GradeAudit, GradeChange, Submission, SubmissionKind};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 评分或清除成绩
    ///
    /// 成绩更新与审计记录在同一事务中写入，每次调用恰好产生一条审计。
    pub async fn apply_grade_impl(
        &self,
        kind: SubmissionKind,
        submission_id: i64,
        change: GradeChange,
        graded_by: i64,
    ) -> Result<Option<Submission>> {
        let txn = self.db.begin().await?;

        let applied = match kind {
            SubmissionKind::Student => {
                grade_student_submission(&txn, submission_id, change, graded_by).await?
            }
            SubmissionKind::Other => {
                grade_other_submission(&txn, submission_id, change, graded_by).await?
            }
        };
        if !applied {
            return Ok(None);
        }

        let submission = find_submission(&txn, kind, submission_id).await?;
        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;
        Ok(submission)
    }

    /// 评分历史，最新的在前
    pub async fn list_grade_history_impl(
        &self,
        kind: SubmissionKind,
        submission_id: i64,
    ) -> Result<Vec<GradeAudit>> {
        let audits = match kind {
            SubmissionKind::Student => GradeAudits::find()
                .filter(grade_audits::Column::SubmissionId.eq(submission_id))
                .order_by_desc(grade_audits::Column::ChangedAt)
                .order_by_desc(grade_audits::Column::Id)
                .all(&self.db)
                .await
                .map_err(|e| LmsError::database_operation(format!("查询评分历史失败: {e}")))?
                .into_iter()
                .map(|a| a.into_audit())
                .collect(),
            SubmissionKind::Other => GradeAuditOtherSubmissions::find()
                .filter(grade_audit_other_submissions::Column::OtherSubmissionId.eq(submission_id))
                .order_by_desc(grade_audit_other_submissions::Column::ChangedAt)
                .order_by_desc(grade_audit_other_submissions::Column::Id)
                .all(&self.db)
                .await
                .map_err(|e| LmsError::database_operation(format!("查询评分历史失败: {e}")))?
                .into_iter()
                .map(|a| a.into_audit())
                .collect(),
        };
        Ok(audits)
    }
}

async fn grade_student_submission<C: ConnectionTrait>(
    db: &C,
    submission_id: i64,
    change: GradeChange,
    graded_by: i64,
) -> Result<bool> {
    let Some(existing) = Submissions::find_by_id(submission_id).one(db).await? else {
        return Ok(false);
    };
    let now = chrono::Utc::now().timestamp();

    let audit = grade_audits::ActiveModel {
        submission_id: Set(existing.id),
        old_grade: Set(existing.grade),
        new_grade: Set(change.grade()),
        old_state: Set(existing.grade_state.clone()),
        new_state: Set(change.state().to_string()),
        graded_by: Set(graded_by),
        changed_at: Set(now),
        ..Default::default()
    };

    let mut model: submissions::ActiveModel = existing.into();
    model.grade = Set(change.grade());
    model.grade_state = Set(change.state().to_string());
    model.graded_by = Set(Some(graded_by));
    model.graded_at = Set(Some(now));
    model
        .update(db)
        .await
        .map_err(|e| LmsError::database_operation(format!("更新成绩失败: {e}")))?;

    audit
        .insert(db)
        .await
        .map_err(|e| LmsError::database_operation(format!("写入评分审计失败: {e}")))?;
    Ok(true)
}

async fn grade_other_submission<C: ConnectionTrait>(
    db: &C,
    submission_id: i64,
    change: GradeChange,
    graded_by: i64,
) -> Result<bool> {
    let Some(existing) = OtherSubmissions::find_by_id(submission_id).one(db).await? else {
        return Ok(false);
    };
    let now = chrono::Utc::now().timestamp();

    let audit = grade_audit_other_submissions::ActiveModel {
        other_submission_id: Set(existing.id),
        old_grade: Set(existing.grade),
        new_grade: Set(change.grade()),
        old_state: Set(existing.grade_state.clone()),
        new_state: Set(change.state().to_string()),
        graded_by: Set(graded_by),
        changed_at: Set(now),
        ..Default::default()
    };

    let mut model: other_submissions::ActiveModel = existing.into();
    model.grade = Set(change.grade());
    model.grade_state = Set(change.state().to_string());
    model.graded_by = Set(Some(graded_by));
    model.graded_at = Set(Some(now));
    model
        .update(db)
        .await
        .map_err(|e| LmsError::database_operation(format!("更新成绩失败: {e}")))?;

    audit
        .insert(db)
        .await
        .map_err(|e| LmsError::database_operation(format!("写入评分审计失败: {e}")))?;
    Ok(true)
}
