use std::collections::{BTreeMap, HashMap, HashSet};

use super::SeaOrmStorage;
use super::participants::{Directory, Roster};
use super::submissions::{other_submissions_for, student_submissions_for};
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::entity::prelude::*;
use crate::entity::{
    assignment_materials, grade_audit_other_submissions, grade_audits, other_submission_files,
    other_submissions, submission_files, submissions,
};
use crate::errors::{LmsError, Result};
use crate::models::accounts::AccountRole;
use crate::models::assignments::{
    Assignment, AssignmentMaterial, AssignmentOverview, AssignmentUpdate, MyAssignment,
    NewAssignment,
};
use crate::models::courses::Participant;
use crate::models::submissions::{Submission, SubmissionEntry, SubmissionKind};
use crate::storage::RemovedFiles;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建作业及附带资料
    pub async fn create_assignment_impl(&self, req: NewAssignment) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let assignment = ActiveModel {
            course_id: Set(req.course_id),
            title: Set(req.title),
            description: Set(req.description),
            due_date: Set(req.due_date),
            created_by: Set(req.created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| LmsError::database_operation(format!("创建作业失败: {e}")))?;

        let mut materials = Vec::with_capacity(req.materials.len());
        for file in req.materials {
            let material = assignment_materials::ActiveModel {
                assignment_id: Set(assignment.id),
                file_path: Set(file.file_path),
                original_name: Set(file.original_name),
                uploaded_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            materials.push(material.into_material());
        }

        txn.commit().await?;
        Ok(assignment.into_assignment(materials))
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let Some(model) = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询作业失败: {e}")))?
        else {
            return Ok(None);
        };
        let mut materials = load_materials(&self.db, &[id]).await?;
        Ok(Some(model.into_assignment(materials.remove(&id).unwrap_or_default())))
    }

    /// 更新作业
    pub async fn update_assignment_impl(
        &self,
        id: i64,
        update: AssignmentUpdate,
    ) -> Result<Option<Assignment>> {
        let Some(existing) = Assignments::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description).filter(|d| !d.is_empty()));
        }
        if let Some(due_date) = update.due_date {
            model.due_date = Set(due_date);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());
        model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新作业失败: {e}")))?;

        self.get_assignment_by_id_impl(id).await
    }

    /// 删除作业及其提交、审计记录与资料
    pub async fn delete_assignment_impl(&self, id: i64) -> Result<Option<RemovedFiles>> {
        let txn = self.db.begin().await?;
        if Assignments::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(None);
        }
        let removed = purge_assignments(&txn, &[id]).await?;
        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;
        Ok(Some(removed))
    }

    /// 课程作业汇总
    ///
    /// 每份作业恰好一项；学生提交与教职提交统一为 [`SubmissionEntry`]，
    /// 未提交名单为已加入课程的参与者减去有提交记录者，每人只出现一次。
    pub async fn list_assignment_overviews_impl(
        &self,
        course_id: i64,
    ) -> Result<Vec<AssignmentOverview>> {
        let assignments = load_course_assignments(&self.db, course_id).await?;
        if assignments.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();

        let mut submissions = student_submissions_for(&self.db, &ids, None).await?;
        submissions.extend(other_submissions_for(&self.db, &ids, None).await?);

        let roster = Roster::load(&self.db, course_id).await?;
        let submitter_students: Vec<i64> = submissions
            .iter()
            .filter(|s| s.kind == SubmissionKind::Student)
            .map(|s| s.owner_id)
            .collect();
        let submitter_accounts: Vec<i64> = submissions
            .iter()
            .filter(|s| s.kind == SubmissionKind::Other)
            .map(|s| s.owner_id)
            .collect();
        let directory =
            Directory::load(&self.db, &submitter_students, &submitter_accounts).await?;

        let mut by_assignment: HashMap<i64, Vec<Submission>> = HashMap::new();
        for submission in submissions {
            by_assignment
                .entry(submission.assignment_id)
                .or_default()
                .push(submission);
        }

        Ok(assignments
            .into_iter()
            .map(|assignment| {
                let submissions = by_assignment.remove(&assignment.id).unwrap_or_default();
                build_overview(assignment, submissions, &roster, &directory)
            })
            .collect())
    }

    /// 课程作业及指定参与者的提交
    pub async fn list_my_assignments_impl(
        &self,
        course_id: i64,
        kind: SubmissionKind,
        owner_id: i64,
    ) -> Result<Vec<MyAssignment>> {
        let assignments = load_course_assignments(&self.db, course_id).await?;
        if assignments.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();

        let mine = match kind {
            SubmissionKind::Student => {
                student_submissions_for(&self.db, &ids, Some(owner_id)).await?
            }
            SubmissionKind::Other => other_submissions_for(&self.db, &ids, Some(owner_id)).await?,
        };
        let mut by_assignment: HashMap<i64, Submission> = mine
            .into_iter()
            .map(|s| (s.assignment_id, s))
            .collect();

        Ok(assignments
            .into_iter()
            .map(|assignment| MyAssignment {
                submission: by_assignment.remove(&assignment.id),
                assignment,
            })
            .collect())
    }
}

fn build_overview(
    assignment: Assignment,
    submissions: Vec<Submission>,
    roster: &Roster,
    directory: &Directory,
) -> AssignmentOverview {
    let mut submitted_students = HashSet::new();
    let mut submitted_staff = HashSet::new();
    let mut entries = Vec::with_capacity(submissions.len());

    for submission in submissions {
        let owner = match submission.kind {
            SubmissionKind::Student => {
                submitted_students.insert(submission.owner_id);
                directory.student(submission.owner_id)
            }
            SubmissionKind::Other => {
                submitted_staff.insert(submission.owner_id);
                directory.staff(submission.owner_id)
            }
        };
        match owner {
            Some(owner) => entries.push(SubmissionEntry::new(submission, &owner)),
            None => tracing::warn!(
                "Submission {} ({:?}) has no resolvable owner",
                submission.id,
                submission.kind
            ),
        }
    }

    let mut missing: BTreeMap<(AccountRole, i64), Participant> = BTreeMap::new();
    for student in &roster.students {
        if !submitted_students.contains(&student.participant_id) {
            missing
                .entry((student.role, student.account_id))
                .or_insert_with(|| student.clone());
        }
    }
    for staff in &roster.staff {
        if !submitted_staff.contains(&staff.account_id) {
            missing
                .entry((staff.role, staff.account_id))
                .or_insert_with(|| staff.clone());
        }
    }

    AssignmentOverview {
        assignment,
        submissions: entries,
        not_submitted: missing.into_values().collect(),
    }
}

async fn load_course_assignments<C: ConnectionTrait>(
    db: &C,
    course_id: i64,
) -> Result<Vec<Assignment>> {
    let models = Assignments::find()
        .filter(Column::CourseId.eq(course_id))
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| LmsError::database_operation(format!("查询作业列表失败: {e}")))?;

    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
    let mut materials = load_materials(db, &ids).await?;
    Ok(models
        .into_iter()
        .map(|m| {
            let files = materials.remove(&m.id).unwrap_or_default();
            m.into_assignment(files)
        })
        .collect())
}

async fn load_materials<C: ConnectionTrait>(
    db: &C,
    assignment_ids: &[i64],
) -> Result<HashMap<i64, Vec<AssignmentMaterial>>> {
    let mut grouped: HashMap<i64, Vec<AssignmentMaterial>> = HashMap::new();
    if assignment_ids.is_empty() {
        return Ok(grouped);
    }
    for m in AssignmentMaterials::find()
        .filter(assignment_materials::Column::AssignmentId.is_in(assignment_ids.iter().copied()))
        .order_by_asc(assignment_materials::Column::Id)
        .all(db)
        .await?
    {
        grouped
            .entry(m.assignment_id)
            .or_default()
            .push(m.into_material());
    }
    Ok(grouped)
}

/// 删除一组作业的全部从属数据，返回引用的文件路径
///
/// 顺序：提交文件、审计记录、提交、作业资料、作业。调用方负责事务。
pub(super) async fn purge_assignments<C: ConnectionTrait>(
    db: &C,
    assignment_ids: &[i64],
) -> Result<RemovedFiles> {
    if assignment_ids.is_empty() {
        return Ok(Vec::new());
    }
    let ids = assignment_ids.to_vec();

    let submission_ids: Vec<i64> = Submissions::find()
        .filter(submissions::Column::AssignmentId.is_in(ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();
    let other_ids: Vec<i64> = OtherSubmissions::find()
        .filter(other_submissions::Column::AssignmentId.is_in(ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    let mut removed: RemovedFiles = Vec::new();
    removed.extend(
        SubmissionFiles::find()
            .filter(submission_files::Column::SubmissionId.is_in(submission_ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|f| f.file_path),
    );
    removed.extend(
        OtherSubmissionFiles::find()
            .filter(other_submission_files::Column::OtherSubmissionId.is_in(other_ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|f| f.file_path),
    );
    removed.extend(
        AssignmentMaterials::find()
            .filter(assignment_materials::Column::AssignmentId.is_in(ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|m| m.file_path),
    );

    SubmissionFiles::delete_many()
        .filter(submission_files::Column::SubmissionId.is_in(submission_ids.clone()))
        .exec(db)
        .await?;
    OtherSubmissionFiles::delete_many()
        .filter(other_submission_files::Column::OtherSubmissionId.is_in(other_ids.clone()))
        .exec(db)
        .await?;
    GradeAudits::delete_many()
        .filter(grade_audits::Column::SubmissionId.is_in(submission_ids.clone()))
        .exec(db)
        .await?;
    GradeAuditOtherSubmissions::delete_many()
        .filter(grade_audit_other_submissions::Column::OtherSubmissionId.is_in(other_ids.clone()))
        .exec(db)
        .await?;
    Submissions::delete_many()
        .filter(submissions::Column::Id.is_in(submission_ids))
        .exec(db)
        .await?;
    OtherSubmissions::delete_many()
        .filter(other_submissions::Column::Id.is_in(other_ids))
        .exec(db)
        .await?;
    AssignmentMaterials::delete_many()
        .filter(assignment_materials::Column::AssignmentId.is_in(ids.clone()))
        .exec(db)
        .await?;
    Assignments::delete_many()
        .filter(Column::Id.is_in(ids))
        .exec(db)
        .await
        .map_err(|e| LmsError::database_operation(format!("删除作业失败: {e}")))?;

    Ok(removed)
}
