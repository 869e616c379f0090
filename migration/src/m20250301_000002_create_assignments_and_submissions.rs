use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_accounts_and_courses::{Accounts, Courses, Profiles};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 作业表
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignments::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Assignments::Title).string().not_null())
                    .col(ColumnDef::new(Assignments::Description).text().null())
                    .col(ColumnDef::new(Assignments::DueDate).big_integer().null())
                    .col(ColumnDef::new(Assignments::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Assignments::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Assignments::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assignments::Table, Assignments::CourseId)
                            .to(Courses::Table, Courses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 作业资料表
        manager
            .create_table(
                Table::create()
                    .table(AssignmentMaterials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssignmentMaterials::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssignmentMaterials::AssignmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentMaterials::FilePath)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentMaterials::OriginalName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssignmentMaterials::UploadedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AssignmentMaterials::Table, AssignmentMaterials::AssignmentId)
                            .to(Assignments::Table, Assignments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 课程资料表
        manager
            .create_table(
                Table::create()
                    .table(Materials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Materials::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Materials::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Materials::Title).string().not_null())
                    .col(ColumnDef::new(Materials::FilePath).string().not_null())
                    .col(ColumnDef::new(Materials::OriginalName).string().not_null())
                    .col(ColumnDef::new(Materials::UploadedBy).big_integer().not_null())
                    .col(ColumnDef::new(Materials::UploadedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Materials::Table, Materials::CourseId)
                            .to(Courses::Table, Courses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 学生提交表
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Submissions::AssignmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::StudentId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Submissions::SubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::Grade).double().null())
                    .col(
                        ColumnDef::new(Submissions::GradeState)
                            .string()
                            .not_null()
                            .default("ungraded"),
                    )
                    .col(ColumnDef::new(Submissions::GradedBy).big_integer().null())
                    .col(ColumnDef::new(Submissions::GradedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::AssignmentId)
                            .to(Assignments::Table, Assignments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::StudentId)
                            .to(Profiles::Students, Profiles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 教职人员提交表
        manager
            .create_table(
                Table::create()
                    .table(OtherSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtherSubmissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OtherSubmissions::AssignmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtherSubmissions::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtherSubmissions::SubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtherSubmissions::Grade).double().null())
                    .col(
                        ColumnDef::new(OtherSubmissions::GradeState)
                            .string()
                            .not_null()
                            .default("ungraded"),
                    )
                    .col(ColumnDef::new(OtherSubmissions::GradedBy).big_integer().null())
                    .col(ColumnDef::new(OtherSubmissions::GradedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(OtherSubmissions::Table, OtherSubmissions::AssignmentId)
                            .to(Assignments::Table, Assignments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OtherSubmissions::Table, OtherSubmissions::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 提交附件表（一对多，取代逗号拼接的路径字符串）
        manager
            .create_table(
                Table::create()
                    .table(SubmissionFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubmissionFiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubmissionFiles::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SubmissionFiles::FilePath).string().not_null())
                    .col(
                        ColumnDef::new(SubmissionFiles::OriginalName)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SubmissionFiles::Table, SubmissionFiles::SubmissionId)
                            .to(Submissions::Table, Submissions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OtherSubmissionFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtherSubmissionFiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OtherSubmissionFiles::OtherSubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtherSubmissionFiles::FilePath)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtherSubmissionFiles::OriginalName)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                OtherSubmissionFiles::Table,
                                OtherSubmissionFiles::OtherSubmissionId,
                            )
                            .to(OtherSubmissions::Table, OtherSubmissions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 评分审计表
        manager
            .create_table(
                Table::create()
                    .table(GradeAudits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeAudits::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradeAudits::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeAudits::OldGrade).double().null())
                    .col(ColumnDef::new(GradeAudits::NewGrade).double().null())
                    .col(ColumnDef::new(GradeAudits::OldState).string().not_null())
                    .col(ColumnDef::new(GradeAudits::NewState).string().not_null())
                    .col(ColumnDef::new(GradeAudits::GradedBy).big_integer().not_null())
                    .col(ColumnDef::new(GradeAudits::ChangedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeAudits::Table, GradeAudits::SubmissionId)
                            .to(Submissions::Table, Submissions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GradeAuditOtherSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeAuditOtherSubmissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradeAuditOtherSubmissions::OtherSubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeAuditOtherSubmissions::OldGrade)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradeAuditOtherSubmissions::NewGrade)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradeAuditOtherSubmissions::OldState)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeAuditOtherSubmissions::NewState)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeAuditOtherSubmissions::GradedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeAuditOtherSubmissions::ChangedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                GradeAuditOtherSubmissions::Table,
                                GradeAuditOtherSubmissions::OtherSubmissionId,
                            )
                            .to(OtherSubmissions::Table, OtherSubmissions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个参与者每份作业只有一条提交
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uk_submissions_assignment_student")
                    .table(Submissions::Table)
                    .col(Submissions::AssignmentId)
                    .col(Submissions::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uk_other_submissions_assignment_account")
                    .table(OtherSubmissions::Table)
                    .col(OtherSubmissions::AssignmentId)
                    .col(OtherSubmissions::AccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignments_course_id")
                    .table(Assignments::Table)
                    .col(Assignments::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_materials_course_id")
                    .table(Materials::Table)
                    .col(Materials::CourseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(GradeAuditOtherSubmissions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(GradeAudits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OtherSubmissionFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubmissionFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OtherSubmissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Materials::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssignmentMaterials::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Assignments {
    Table,
    Id,
    CourseId,
    Title,
    Description,
    DueDate,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AssignmentMaterials {
    Table,
    Id,
    AssignmentId,
    FilePath,
    OriginalName,
    UploadedAt,
}

#[derive(DeriveIden)]
enum Materials {
    Table,
    Id,
    CourseId,
    Title,
    FilePath,
    OriginalName,
    UploadedBy,
    UploadedAt,
}

#[derive(DeriveIden)]
enum Submissions {
    Table,
    Id,
    AssignmentId,
    StudentId,
    SubmittedAt,
    Grade,
    GradeState,
    GradedBy,
    GradedAt,
}

#[derive(DeriveIden)]
enum OtherSubmissions {
    Table,
    Id,
    AssignmentId,
    AccountId,
    SubmittedAt,
    Grade,
    GradeState,
    GradedBy,
    GradedAt,
}

#[derive(DeriveIden)]
enum SubmissionFiles {
    Table,
    Id,
    SubmissionId,
    FilePath,
    OriginalName,
}

#[derive(DeriveIden)]
enum OtherSubmissionFiles {
    Table,
    Id,
    OtherSubmissionId,
    FilePath,
    OriginalName,
}

#[derive(DeriveIden)]
enum GradeAudits {
    Table,
    Id,
    SubmissionId,
    OldGrade,
    NewGrade,
    OldState,
    NewState,
    GradedBy,
    ChangedAt,
}

#[derive(DeriveIden)]
enum GradeAuditOtherSubmissions {
    Table,
    Id,
    OtherSubmissionId,
    OldGrade,
    NewGrade,
    OldState,
    NewState,
    GradedBy,
    ChangedAt,
}
