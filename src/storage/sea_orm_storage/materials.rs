use super::SeaOrmStorage;
use crate::entity::materials::{ActiveModel, Column, Entity as Materials};
use crate::errors::{LmsError, Result};
use crate::models::materials::{Material, NewMaterial};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 上传课程资料
    pub async fn create_material_impl(&self, req: NewMaterial) -> Result<Material> {
        let model = ActiveModel {
            course_id: Set(req.course_id),
            title: Set(req.title),
            file_path: Set(req.file_path),
            original_name: Set(req.original_name),
            uploaded_by: Set(req.uploaded_by),
            uploaded_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| LmsError::database_operation(format!("创建课程资料失败: {e}")))?;

        Ok(model.into_material())
    }

    pub async fn get_material_by_id_impl(&self, id: i64) -> Result<Option<Material>> {
        let result = Materials::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程资料失败: {e}")))?;
        Ok(result.map(|m| m.into_material()))
    }

    /// 课程资料列表，最新上传的在前
    pub async fn list_materials_impl(&self, course_id: i64) -> Result<Vec<Material>> {
        let materials = Materials::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_desc(Column::UploadedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程资料失败: {e}")))?;
        Ok(materials.into_iter().map(|m| m.into_material()).collect())
    }

    /// 删除课程资料，返回被删除的记录以便清理文件
    pub async fn delete_material_impl(&self, id: i64) -> Result<Option<Material>> {
        let Some(existing) = Materials::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Materials::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除课程资料失败: {e}")))?;
        Ok(Some(existing.into_material()))
    }
}
