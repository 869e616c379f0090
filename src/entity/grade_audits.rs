//! 学生提交评分审计实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grade_audits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    #[sea_orm(column_type = "Double", nullable)]
    pub old_grade: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub new_grade: Option<f64>,
    pub old_state: String,
    pub new_state: String,
    pub graded_by: i64,
    pub changed_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::submissions::Column::Id"
    )]
    Submission,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_audit(self) -> crate::models::submissions::GradeAudit {
        use crate::models::submissions::{GradeAudit, GradeState, SubmissionKind};

        GradeAudit {
            id: self.id,
            kind: SubmissionKind::Student,
            submission_id: self.submission_id,
            old_grade: self.old_grade,
            new_grade: self.new_grade,
            old_state: self.old_state.parse().unwrap_or(GradeState::Ungraded),
            new_state: self.new_state.parse().unwrap_or(GradeState::Ungraded),
            graded_by: self.graded_by,
            changed_at: super::to_datetime(self.changed_at),
        }
    }
}
