//! 作业实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub due_date: Option<i64>,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::assignment_materials::Entity")]
    AssignmentMaterials,
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
    #[sea_orm(has_many = "super::other_submissions::Entity")]
    OtherSubmissions,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::assignment_materials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignmentMaterials.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl Related<super::other_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OtherSubmissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 转换为业务模型，附件由调用方补充
    pub fn into_assignment(
        self,
        materials: Vec<crate::models::assignments::AssignmentMaterial>,
    ) -> crate::models::assignments::Assignment {
        crate::models::assignments::Assignment {
            id: self.id,
            course_id: self.course_id,
            title: self.title,
            description: self.description,
            due_date: self.due_date.map(super::to_datetime),
            created_by: self.created_by,
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
            materials,
        }
    }
}
