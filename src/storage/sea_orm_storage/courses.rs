use std::collections::BTreeMap;

use super::SeaOrmStorage;
use super::assignments::purge_assignments;
use super::participants::find_profile;
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::prelude::*;
use crate::entity::{
    assignments, enrollments, materials, other_enrollments, teachers, teaching_assistants,
};
use crate::errors::{LmsError, Result};
use crate::models::accounts::AccountRole;
use crate::models::courses::{Course, CourseListItem, CourseRole, CourseUpdate, NewCourse};
use crate::storage::RemovedFiles;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(&self, req: NewCourse) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let course = ActiveModel {
            teacher_id: Set(req.teacher_id),
            course_name: Set(req.course_name),
            description: Set(req.description),
            image_path: Set(req.image_path),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| LmsError::database_operation(format!("创建课程失败: {e}")))?;

        // 所属教师同时作为教职参与者，便于作业汇总统计其提交
        other_enrollments::ActiveModel {
            course_id: Set(course.id),
            account_id: Set(req.owner_account_id),
            enrolled_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(course.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 列出账号可见的课程及其在每门课程中的身份
    pub async fn list_courses_for_account_impl(
        &self,
        account_id: i64,
        role: AccountRole,
    ) -> Result<Vec<CourseListItem>> {
        let roles = course_roles(&self.db, account_id, role, None).await?;

        let mut select = Courses::find().order_by_asc(Column::Id);
        if role != AccountRole::Administrator {
            if roles.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(Column::Id.is_in(roles.keys().copied()));
        }
        let courses = select
            .all(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("查询课程列表失败: {e}")))?;

        let teacher_ids: Vec<i64> = courses.iter().map(|c| c.teacher_id).collect();
        let teachers: BTreeMap<i64, String> = if teacher_ids.is_empty() {
            BTreeMap::new()
        } else {
            Teachers::find()
                .filter(teachers::Column::Id.is_in(teacher_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|t| (t.id, t.into_person().full_name()))
                .collect()
        };

        Ok(courses
            .into_iter()
            .map(|c| {
                let my_role = roles
                    .get(&c.id)
                    .copied()
                    .unwrap_or(CourseRole::Administrator);
                CourseListItem {
                    teacher_name: teachers.get(&c.teacher_id).cloned().unwrap_or_default(),
                    course: c.into_course(),
                    my_role,
                }
            })
            .collect())
    }

    /// 账号在指定课程中的身份
    pub async fn get_course_role_impl(
        &self,
        course_id: i64,
        account_id: i64,
        role: AccountRole,
    ) -> Result<Option<CourseRole>> {
        let roles = course_roles(&self.db, account_id, role, Some(course_id)).await?;
        Ok(roles.get(&course_id).copied())
    }

    /// 更新课程，返回被替换的封面
    pub async fn update_course_impl(
        &self,
        id: i64,
        update: CourseUpdate,
    ) -> Result<Option<(Course, Option<String>)>> {
        let Some(existing) = Courses::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut replaced_image = None;
        let mut model: ActiveModel = existing.clone().into();
        if let Some(course_name) = update.course_name {
            model.course_name = Set(course_name);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description).filter(|d| !d.is_empty()));
        }
        if let Some(image_path) = update.image_path {
            replaced_image = existing.image_path;
            model.image_path = Set(Some(image_path));
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let course = model
            .update(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("更新课程失败: {e}")))?;

        Ok(Some((course.into_course(), replaced_image)))
    }

    /// 级联删除课程
    ///
    /// 子表先于父表删除，全部在一个事务中完成；返回需要删除的文件路径。
    pub async fn delete_course_impl(&self, id: i64) -> Result<Option<RemovedFiles>> {
        let txn = self.db.begin().await?;

        let Some(course) = Courses::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        let mut removed: RemovedFiles = course.image_path.clone().into_iter().collect();

        let assignment_ids: Vec<i64> = Assignments::find()
            .filter(assignments::Column::CourseId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        removed.extend(purge_assignments(&txn, &assignment_ids).await?);

        let material_files = Materials::find()
            .filter(materials::Column::CourseId.eq(id))
            .all(&txn)
            .await?;
        removed.extend(material_files.into_iter().map(|m| m.file_path));
        Materials::delete_many()
            .filter(materials::Column::CourseId.eq(id))
            .exec(&txn)
            .await?;

        Enrollments::delete_many()
            .filter(enrollments::Column::CourseId.eq(id))
            .exec(&txn)
            .await?;
        OtherEnrollments::delete_many()
            .filter(other_enrollments::Column::CourseId.eq(id))
            .exec(&txn)
            .await?;
        TeachingAssistants::delete_many()
            .filter(teaching_assistants::Column::CourseId.eq(id))
            .exec(&txn)
            .await?;
        Courses::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("删除课程失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| LmsError::database_operation(format!("提交事务失败: {e}")))?;
        Ok(Some(removed))
    }
}

/// 计算账号与课程的关系，`only` 限定为单门课程
///
/// 同一课程有多重关系时取权限最高者：所属教师 / 助教优先于教职参与者。
async fn course_roles<C: ConnectionTrait>(
    db: &C,
    account_id: i64,
    role: AccountRole,
    only: Option<i64>,
) -> Result<BTreeMap<i64, CourseRole>> {
    let mut roles = BTreeMap::new();

    if role == AccountRole::Administrator {
        if let Some(course_id) = only
            && Courses::find_by_id(course_id).one(db).await?.is_some()
        {
            roles.insert(course_id, CourseRole::Administrator);
        }
        return Ok(roles);
    }

    let profile = find_profile(db, account_id, role).await?;

    match (role, profile) {
        (AccountRole::Student, Some(student)) => {
            let mut query =
                Enrollments::find().filter(enrollments::Column::StudentId.eq(student.id));
            if let Some(course_id) = only {
                query = query.filter(enrollments::Column::CourseId.eq(course_id));
            }
            for e in query.all(db).await? {
                roles.insert(e.course_id, CourseRole::Student);
            }
        }
        (AccountRole::Teacher, Some(teacher)) => {
            let mut query = Courses::find().filter(Column::TeacherId.eq(teacher.id));
            if let Some(course_id) = only {
                query = query.filter(Column::Id.eq(course_id));
            }
            for c in query.all(db).await? {
                roles.insert(c.id, CourseRole::Owner);
            }
        }
        (AccountRole::Assistant, Some(assistant)) => {
            let mut query = TeachingAssistants::find()
                .filter(teaching_assistants::Column::AssistantId.eq(assistant.id));
            if let Some(course_id) = only {
                query = query.filter(teaching_assistants::Column::CourseId.eq(course_id));
            }
            for ta in query.all(db).await? {
                roles.insert(ta.course_id, CourseRole::Assistant);
            }
        }
        _ => {}
    }

    if role.is_staff() {
        let mut query =
            OtherEnrollments::find().filter(other_enrollments::Column::AccountId.eq(account_id));
        if let Some(course_id) = only {
            query = query.filter(other_enrollments::Column::CourseId.eq(course_id));
        }
        for e in query.all(db).await? {
            roles.entry(e.course_id).or_insert(CourseRole::Staff);
        }
    }

    Ok(roles)
}
