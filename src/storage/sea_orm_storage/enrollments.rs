//! 课程成员：选课、教职参与、助教

use super::SeaOrmStorage;
use super::participants::Roster;
use crate::entity::prelude::*;
use crate::entity::{
    accounts, assistants, enrollments, other_enrollments, students, teaching_assistants,
};
use crate::errors::{LmsError, Result};
use crate::models::accounts::AccountRole;
use crate::models::courses::{CourseParticipants, Participant};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 学生选课
    pub async fn enroll_student_impl(&self, course_id: i64, account_id: i64) -> Result<bool> {
        let student = Students::find()
            .filter(students::Column::AccountId.eq(account_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| LmsError::not_found("Student not found"))?;

        let existing = Enrollments::find()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .filter(enrollments::Column::StudentId.eq(student.id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        enrollments::ActiveModel {
            course_id: Set(course_id),
            student_id: Set(student.id),
            enrolled_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| LmsError::database_operation(format!("选课失败: {e}")))?;

        Ok(true)
    }

    /// 学生退课，已有提交保留
    pub async fn unenroll_student_impl(&self, course_id: i64, account_id: i64) -> Result<bool> {
        let Some(student) = Students::find()
            .filter(students::Column::AccountId.eq(account_id))
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };

        let result = Enrollments::delete_many()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .filter(enrollments::Column::StudentId.eq(student.id))
            .exec(&self.db)
            .await
            .map_err(|e| LmsError::database_operation(format!("退课失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 教职人员加入课程
    pub async fn join_course_as_staff_impl(&self, course_id: i64, account_id: i64) -> Result<bool> {
        insert_staff_enrollment(&self.db, course_id, account_id).await
    }

    /// 课程参与者
    pub async fn list_course_participants_impl(
        &self,
        course_id: i64,
    ) -> Result<CourseParticipants> {
        let course = Courses::find_by_id(course_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LmsError::not_found("Course not found"))?;

        let teacher = match Teachers::find_by_id(course.teacher_id).one(&self.db).await? {
            Some(t) => {
                let account = Accounts::find_by_id(t.account_id).one(&self.db).await?;
                account.map(|a| Participant {
                    account_id: a.id,
                    participant_id: t.id,
                    role: AccountRole::Teacher,
                    username: a.username,
                    first_name: t.first_name,
                    last_name: t.last_name,
                })
            }
            None => None,
        };

        let assistant_rows = TeachingAssistants::find()
            .filter(teaching_assistants::Column::CourseId.eq(course_id))
            .order_by_asc(teaching_assistants::Column::Id)
            .find_also_related(Assistants)
            .all(&self.db)
            .await?;
        let mut assistants = Vec::with_capacity(assistant_rows.len());
        for (_, assistant) in assistant_rows {
            let Some(assistant) = assistant else { continue };
            if let Some(account) = Accounts::find_by_id(assistant.account_id)
                .one(&self.db)
                .await?
            {
                assistants.push(assistant_participant(assistant, account));
            }
        }

        let roster = Roster::load(&self.db, course_id).await?;

        Ok(CourseParticipants {
            teacher,
            assistants,
            students: roster.students,
            staff: roster.staff,
        })
    }

    /// 添加助教，同时加入教职参与者
    pub async fn add_course_assistant_impl(
        &self,
        course_id: i64,
        account_id: i64,
    ) -> Result<Participant> {
        let txn = self.db.begin().await?;

        let account = Accounts::find_by_id(account_id)
            .one(&txn)
            .await?
            .filter(|a| a.role == AccountRole::ASSISTANT)
            .ok_or_else(|| LmsError::not_found("Assistant not found"))?;
        let assistant = Assistants::find()
            .filter(assistants::Column::AccountId.eq(account_id))
            .one(&txn)
            .await?
            .ok_or_else(|| LmsError::not_found("Assistant not found"))?;

        let existing = TeachingAssistants::find()
            .filter(teaching_assistants::Column::CourseId.eq(course_id))
            .filter(teaching_assistants::Column::AssistantId.eq(assistant.id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(LmsError::conflict("Assistant already assigned to this course"));
        }

        teaching_assistants::ActiveModel {
            course_id: Set(course_id),
            assistant_id: Set(assistant.id),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| LmsError::database_operation(format!("添加助教失败: {e}")))?;
        insert_staff_enrollment(&txn, course_id, account_id).await?;

        txn.commit().await?;
        Ok(assistant_participant(assistant, account))
    }

    /// 移除助教及其教职参与记录
    pub async fn remove_course_assistant_impl(
        &self,
        course_id: i64,
        assistant_id: i64,
    ) -> Result<bool> {
        let txn = self.db.begin().await?;

        let result = TeachingAssistants::delete_many()
            .filter(teaching_assistants::Column::CourseId.eq(course_id))
            .filter(teaching_assistants::Column::AssistantId.eq(assistant_id))
            .exec(&txn)
            .await
            .map_err(|e| LmsError::database_operation(format!("移除助教失败: {e}")))?;
        if result.rows_affected == 0 {
            return Ok(false);
        }

        if let Some(assistant) = Assistants::find_by_id(assistant_id).one(&txn).await? {
            OtherEnrollments::delete_many()
                .filter(other_enrollments::Column::CourseId.eq(course_id))
                .filter(other_enrollments::Column::AccountId.eq(assistant.account_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(true)
    }
}

/// 写入教职参与记录，已存在时返回 false
async fn insert_staff_enrollment<C: ConnectionTrait>(
    db: &C,
    course_id: i64,
    account_id: i64,
) -> Result<bool> {
    let existing = OtherEnrollments::find()
        .filter(other_enrollments::Column::CourseId.eq(course_id))
        .filter(other_enrollments::Column::AccountId.eq(account_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(false);
    }

    other_enrollments::ActiveModel {
        course_id: Set(course_id),
        account_id: Set(account_id),
        enrolled_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(true)
}

fn assistant_participant(assistant: assistants::Model, account: accounts::Model) -> Participant {
    Participant {
        account_id: account.id,
        participant_id: assistant.id,
        role: AccountRole::Assistant,
        username: account.username,
        first_name: assistant.first_name,
        last_name: assistant.last_name,
    }
}
