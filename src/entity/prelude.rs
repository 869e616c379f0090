//! 预导入模块，方便使用

pub use super::accounts::{
    ActiveModel as AccountActiveModel, Entity as Accounts, Model as AccountModel,
};
pub use super::assignment_materials::Entity as AssignmentMaterials;
pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::assistants::Entity as Assistants;
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::enrollments::Entity as Enrollments;
pub use super::grade_audit_other_submissions::Entity as GradeAuditOtherSubmissions;
pub use super::grade_audits::Entity as GradeAudits;
pub use super::materials::{
    ActiveModel as MaterialActiveModel, Entity as Materials, Model as MaterialModel,
};
pub use super::other_enrollments::Entity as OtherEnrollments;
pub use super::other_submission_files::Entity as OtherSubmissionFiles;
pub use super::other_submissions::{
    ActiveModel as OtherSubmissionActiveModel, Entity as OtherSubmissions,
    Model as OtherSubmissionModel,
};
pub use super::students::Entity as Students;
pub use super::submission_files::Entity as SubmissionFiles;
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
pub use super::teachers::Entity as Teachers;
pub use super::teaching_assistants::Entity as TeachingAssistants;
