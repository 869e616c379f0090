//! 教职人员提交实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "other_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub account_id: i64,
    pub submitted_at: i64,
    #[sea_orm(column_type = "Double", nullable)]
    pub grade: Option<f64>,
    pub grade_state: String,
    pub graded_by: Option<i64>,
    pub graded_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::assignments::Column::Id"
    )]
    Assignment,
    #[sea_orm(has_many = "super::other_submission_files::Entity")]
    Files,
    #[sea_orm(has_many = "super::grade_audit_other_submissions::Entity")]
    GradeAudits,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::other_submission_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl Related<super::grade_audit_other_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeAudits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(
        self,
        files: Vec<crate::models::submissions::SubmissionFile>,
    ) -> crate::models::submissions::Submission {
        use crate::models::submissions::{GradeState, Submission, SubmissionKind};

        let grade_state = self
            .grade_state
            .parse::<GradeState>()
            .unwrap_or(GradeState::Ungraded);
        Submission {
            id: self.id,
            kind: SubmissionKind::Other,
            assignment_id: self.assignment_id,
            owner_id: self.account_id,
            submitted_at: super::to_datetime(self.submitted_at),
            grade: self.grade,
            confirmed: grade_state.is_confirmed(),
            grade_state,
            graded_by: self.graded_by,
            graded_at: self.graded_at.map(super::to_datetime),
            files,
        }
    }
}
