use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::accounts::AccountRole;
use crate::models::courses::Participant;

/// 提交来源
///
/// 学生提交存放在 `submissions`（所有者为 students.id），
/// 教师 / 助教的提交存放在 `other_submissions`（所有者为 accounts.id）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "submission.ts")]
pub enum SubmissionKind {
    Student,
    Other,
}

impl SubmissionKind {
    /// 由请求中的角色字符串选择提交类型，`student` 以外一律视为教职人员
    pub fn from_role(role: &str) -> Self {
        if role.trim().eq_ignore_ascii_case(AccountRole::STUDENT) {
            SubmissionKind::Student
        } else {
            SubmissionKind::Other
        }
    }

    pub fn for_account_role(role: AccountRole) -> Self {
        match role {
            AccountRole::Student => SubmissionKind::Student,
            _ => SubmissionKind::Other,
        }
    }
}

/// 评分状态
///
/// - `ungraded`：从未评分，grade 为空
/// - `graded`：已确认的成绩
/// - `cleared`：通过重新评分显式清除，grade 为空
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "submission.ts")]
pub enum GradeState {
    Ungraded,
    Graded,
    Cleared,
}

impl GradeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradeState::Ungraded => "ungraded",
            GradeState::Graded => "graded",
            GradeState::Cleared => "cleared",
        }
    }

    pub fn is_confirmed(&self) -> bool {
        *self == GradeState::Graded
    }
}

impl std::fmt::Display for GradeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GradeState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ungraded" => Ok(GradeState::Ungraded),
            "graded" => Ok(GradeState::Graded),
            "cleared" => Ok(GradeState::Cleared),
            _ => Err(format!("Invalid grade state: {s}")),
        }
    }
}

// 提交附件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionFile {
    pub file_path: String,
    pub original_name: String,
}

// 提交
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct Submission {
    pub id: i64,
    pub kind: SubmissionKind,
    pub assignment_id: i64,
    /// Student 为 students.id，Other 为 accounts.id
    pub owner_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub grade: Option<f64>,
    pub grade_state: GradeState,
    pub confirmed: bool,
    pub graded_by: Option<i64>,
    pub graded_at: Option<DateTime<Utc>>,
    pub files: Vec<SubmissionFile>,
}

/// 汇总视图中的提交，两类提交统一为同一结构
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct SubmissionEntry {
    pub submission_id: i64,
    pub kind: SubmissionKind,
    pub role: AccountRole,
    pub account_id: i64,
    pub participant_id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub submitted_at: DateTime<Utc>,
    pub grade: Option<f64>,
    pub grade_state: GradeState,
    pub confirmed: bool,
    pub graded_by: Option<i64>,
    pub files: Vec<SubmissionFile>,
}

impl SubmissionEntry {
    /// 由提交与其所属参与者组装
    pub fn new(submission: Submission, owner: &Participant) -> Self {
        Self {
            submission_id: submission.id,
            kind: submission.kind,
            role: owner.role,
            account_id: owner.account_id,
            participant_id: owner.participant_id,
            username: owner.username.clone(),
            first_name: owner.first_name.clone(),
            last_name: owner.last_name.clone(),
            submitted_at: submission.submitted_at,
            grade: submission.grade,
            grade_state: submission.grade_state,
            confirmed: submission.confirmed,
            graded_by: submission.graded_by,
            files: submission.files,
        }
    }
}

// 评分审计记录
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct GradeAudit {
    pub id: i64,
    pub kind: SubmissionKind,
    pub submission_id: i64,
    pub old_grade: Option<f64>,
    pub new_grade: Option<f64>,
    pub old_state: GradeState,
    pub new_state: GradeState,
    pub graded_by: i64,
    pub changed_at: DateTime<Utc>,
}

/// 评分变更
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradeChange {
    /// 给出成绩并确认
    Set(f64),
    /// 清除成绩，等待重新评分
    Clear,
}

impl GradeChange {
    pub fn grade(&self) -> Option<f64> {
        match self {
            GradeChange::Set(grade) => Some(*grade),
            GradeChange::Clear => None,
        }
    }

    pub fn state(&self) -> GradeState {
        match self {
            GradeChange::Set(_) => GradeState::Graded,
            GradeChange::Clear => GradeState::Cleared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_role() {
        assert_eq!(SubmissionKind::from_role("student"), SubmissionKind::Student);
        assert_eq!(SubmissionKind::from_role("Student "), SubmissionKind::Student);
        assert_eq!(SubmissionKind::from_role("teacher"), SubmissionKind::Other);
        assert_eq!(SubmissionKind::from_role("assistant"), SubmissionKind::Other);
        assert_eq!(SubmissionKind::from_role(""), SubmissionKind::Other);
    }

    #[test]
    fn test_grade_state_confirmed() {
        assert!(GradeState::Graded.is_confirmed());
        assert!(!GradeState::Ungraded.is_confirmed());
        assert!(!GradeState::Cleared.is_confirmed());
        assert_eq!("cleared".parse::<GradeState>(), Ok(GradeState::Cleared));
    }

    #[test]
    fn test_grade_change() {
        assert_eq!(GradeChange::Set(88.5).grade(), Some(88.5));
        assert_eq!(GradeChange::Set(88.5).state(), GradeState::Graded);
        assert_eq!(GradeChange::Clear.grade(), None);
        assert_eq!(GradeChange::Clear.state(), GradeState::Cleared);
    }
}
