use serde::Serialize;
use ts_rs::TS;

use super::entities::Assignment;
use crate::models::courses::Participant;
use crate::models::submissions::{Submission, SubmissionEntry};

/// 一份作业的提交汇总
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct AssignmentOverview {
    pub assignment: Assignment,
    /// 学生提交与教职人员提交统一成同一结构
    pub submissions: Vec<SubmissionEntry>,
    /// 已加入课程但没有提交记录的参与者，每人只出现一次
    pub not_submitted: Vec<Participant>,
}

/// 调用者视角的作业及其本人提交
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct MyAssignment {
    pub assignment: Assignment,
    pub submission: Option<Submission>,
}
