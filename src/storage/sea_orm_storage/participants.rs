//! 参与者身份解析
//!
//! 学生以 students.id 标识，教职人员以 accounts.id 标识；
//! 这里批量加载账号与角色资料，把两类 id 统一解析为 [`Participant`]。

use std::collections::HashMap;

use crate::entity::{accounts, assistants, other_enrollments, students, teachers};
use crate::entity::{enrollments, prelude::*};
use crate::errors::Result;
use crate::models::accounts::{AccountRole, Person};
use crate::models::courses::Participant;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

/// 按角色查找账号的资料行
pub(super) async fn find_profile<C: ConnectionTrait>(
    db: &C,
    account_id: i64,
    role: AccountRole,
) -> Result<Option<Person>> {
    let person = match role {
        AccountRole::Student => Students::find()
            .filter(students::Column::AccountId.eq(account_id))
            .one(db)
            .await?
            .map(|m| m.into_person()),
        AccountRole::Teacher => Teachers::find()
            .filter(teachers::Column::AccountId.eq(account_id))
            .one(db)
            .await?
            .map(|m| m.into_person()),
        AccountRole::Assistant => Assistants::find()
            .filter(assistants::Column::AccountId.eq(account_id))
            .one(db)
            .await?
            .map(|m| m.into_person()),
        AccountRole::Administrator => None,
    };
    Ok(person)
}

/// 批量加载一组账号的资料，按 account_id 索引
pub(super) async fn load_profiles<C: ConnectionTrait>(
    db: &C,
    account_ids: &[i64],
) -> Result<HashMap<i64, Person>> {
    let mut profiles = HashMap::new();
    if account_ids.is_empty() {
        return Ok(profiles);
    }

    let ids = account_ids.iter().copied();
    for m in Students::find()
        .filter(students::Column::AccountId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        profiles.insert(m.account_id, m.into_person());
    }
    for m in Teachers::find()
        .filter(teachers::Column::AccountId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        profiles.insert(m.account_id, m.into_person());
    }
    for m in Assistants::find()
        .filter(assistants::Column::AccountId.is_in(ids))
        .all(db)
        .await?
    {
        profiles.insert(m.account_id, m.into_person());
    }
    Ok(profiles)
}

/// 账号与资料目录
#[derive(Debug, Default)]
pub(super) struct Directory {
    accounts: HashMap<i64, accounts::Model>,
    students: HashMap<i64, students::Model>,
    profiles: HashMap<i64, Person>,
}

impl Directory {
    /// 加载给定学生（students.id）与教职账号（accounts.id）的身份信息
    pub(super) async fn load<C: ConnectionTrait>(
        db: &C,
        student_ids: &[i64],
        account_ids: &[i64],
    ) -> Result<Self> {
        let students: HashMap<i64, students::Model> = if student_ids.is_empty() {
            HashMap::new()
        } else {
            Students::find()
                .filter(students::Column::Id.is_in(student_ids.iter().copied()))
                .all(db)
                .await?
                .into_iter()
                .map(|m| (m.id, m))
                .collect()
        };

        let mut wanted: Vec<i64> = students.values().map(|s| s.account_id).collect();
        wanted.extend_from_slice(account_ids);
        wanted.sort_unstable();
        wanted.dedup();

        let accounts: HashMap<i64, accounts::Model> = if wanted.is_empty() {
            HashMap::new()
        } else {
            Accounts::find()
                .filter(accounts::Column::Id.is_in(wanted.iter().copied()))
                .all(db)
                .await?
                .into_iter()
                .map(|m| (m.id, m))
                .collect()
        };

        let profiles = load_profiles(db, account_ids).await?;

        Ok(Self {
            accounts,
            students,
            profiles,
        })
    }

    pub(super) fn student(&self, student_id: i64) -> Option<Participant> {
        let student = self.students.get(&student_id)?;
        let account = self.accounts.get(&student.account_id)?;
        Some(Participant {
            account_id: account.id,
            participant_id: student.id,
            role: AccountRole::Student,
            username: account.username.clone(),
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
        })
    }

    /// 教职参与者；没有资料行的账号（管理员）以账号 id 作为参与者 id
    pub(super) fn staff(&self, account_id: i64) -> Option<Participant> {
        let account = self.accounts.get(&account_id)?;
        let role = account
            .role
            .parse::<AccountRole>()
            .unwrap_or(AccountRole::Teacher);
        let profile = self.profiles.get(&account_id);
        Some(Participant {
            account_id,
            participant_id: profile.map(|p| p.id).unwrap_or(account_id),
            role,
            username: account.username.clone(),
            first_name: profile.map(|p| p.first_name.clone()).unwrap_or_default(),
            last_name: profile.map(|p| p.last_name.clone()).unwrap_or_default(),
        })
    }
}

/// 课程中已加入的学生与教职人员
#[derive(Debug, Default)]
pub(super) struct Roster {
    pub students: Vec<Participant>,
    pub staff: Vec<Participant>,
}

impl Roster {
    pub(super) async fn load<C: ConnectionTrait>(db: &C, course_id: i64) -> Result<Self> {
        let student_ids: Vec<i64> = Enrollments::find()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .order_by_asc(enrollments::Column::EnrolledAt)
            .all(db)
            .await?
            .into_iter()
            .map(|e| e.student_id)
            .collect();
        let staff_ids: Vec<i64> = OtherEnrollments::find()
            .filter(other_enrollments::Column::CourseId.eq(course_id))
            .order_by_asc(other_enrollments::Column::EnrolledAt)
            .all(db)
            .await?
            .into_iter()
            .map(|e| e.account_id)
            .collect();

        let directory = Directory::load(db, &student_ids, &staff_ids).await?;
        Ok(Self {
            students: student_ids
                .iter()
                .filter_map(|id| directory.student(*id))
                .collect(),
            staff: staff_ids
                .iter()
                .filter_map(|id| directory.staff(*id))
                .collect(),
        })
    }
}
