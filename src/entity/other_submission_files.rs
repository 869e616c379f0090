//! 教职人员提交附件实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "other_submission_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub other_submission_id: i64,
    pub file_path: String,
    pub original_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::other_submissions::Entity",
        from = "Column::OtherSubmissionId",
        to = "super::other_submissions::Column::Id"
    )]
    Submission,
}

impl Related<super::other_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_file(self) -> crate::models::submissions::SubmissionFile {
        crate::models::submissions::SubmissionFile {
            file_path: self.file_path,
            original_name: self.original_name,
        }
    }
}
