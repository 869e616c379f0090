use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::errors::LmsError;
use crate::models::accounts::{AccountRole, AccountWithProfile, NewAccount};
use crate::models::assignments::NewAssignment;
use crate::models::courses::{Course, CourseRole, NewCourse};
use crate::models::materials::NewMaterial;
use crate::models::submissions::{GradeChange, GradeState, SubmissionKind};
use crate::utils::upload::StoredFile;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

async fn memory_storage() -> SeaOrmStorage {
    SeaOrmStorage::in_memory()
        .await
        .expect("in-memory sqlite with migrations")
}

async fn account(storage: &SeaOrmStorage, username: &str, role: AccountRole) -> AccountWithProfile {
    storage
        .create_account_impl(NewAccount {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            role,
            first_name: username.to_uppercase(),
            last_name: "Test".to_string(),
        })
        .await
        .expect("create account")
}

fn profile_id(account: &AccountWithProfile) -> i64 {
    account.profile.as_ref().map(|p| p.id).expect("profile row")
}

async fn course(storage: &SeaOrmStorage, owner: &AccountWithProfile) -> Course {
    storage
        .create_course_impl(NewCourse {
            teacher_id: profile_id(owner),
            owner_account_id: owner.account.id,
            course_name: "Systems Programming".to_string(),
            description: None,
            image_path: Some("/courses/cover.png".to_string()),
        })
        .await
        .expect("create course")
}

async fn assignment(storage: &SeaOrmStorage, course_id: i64, created_by: i64, title: &str) -> i64 {
    storage
        .create_assignment_impl(NewAssignment {
            course_id,
            title: title.to_string(),
            description: None,
            due_date: None,
            created_by,
            materials: vec![stored("/materials/brief.pdf")],
        })
        .await
        .expect("create assignment")
        .id
}

fn stored(path: &str) -> StoredFile {
    StoredFile {
        file_path: path.to_string(),
        original_name: path.rsplit('/').next().unwrap_or(path).to_string(),
        size: 1,
    }
}

#[tokio::test]
async fn test_create_account_writes_profile() {
    let storage = memory_storage().await;
    let student = account(&storage, "alice", AccountRole::Student).await;
    let admin = account(&storage, "root", AccountRole::Administrator).await;

    assert_eq!(student.account.role, AccountRole::Student);
    assert_eq!(
        student.profile.as_ref().map(|p| p.first_name.as_str()),
        Some("ALICE")
    );
    assert!(admin.profile.is_none());
    assert_eq!(Students::find().count(&storage.db).await.unwrap(), 1);

    let duplicate = storage
        .create_account_impl(NewAccount {
            username: "alice".into(),
            email: "other@example.com".into(),
            password_hash: "hash".into(),
            role: AccountRole::Teacher,
            first_name: String::new(),
            last_name: String::new(),
        })
        .await;
    assert!(matches!(duplicate, Err(LmsError::Conflict(_))));
    assert_eq!(Teachers::find().count(&storage.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_course_roles() {
    let storage = memory_storage().await;
    let teacher = account(&storage, "turing", AccountRole::Teacher).await;
    let assistant = account(&storage, "ada", AccountRole::Assistant).await;
    let student = account(&storage, "alice", AccountRole::Student).await;
    let outsider = account(&storage, "bob", AccountRole::Student).await;
    let course = course(&storage, &teacher).await;

    storage
        .add_course_assistant_impl(course.id, assistant.account.id)
        .await
        .unwrap();
    assert!(
        storage
            .enroll_student_impl(course.id, student.account.id)
            .await
            .unwrap()
    );
    assert!(
        !storage
            .enroll_student_impl(course.id, student.account.id)
            .await
            .unwrap()
    );

    for (who, expected) in [
        (&teacher, Some(CourseRole::Owner)),
        (&assistant, Some(CourseRole::Assistant)),
        (&student, Some(CourseRole::Student)),
        (&outsider, None),
    ] {
        let role = storage
            .get_course_role_impl(course.id, who.account.id, who.account.role)
            .await
            .unwrap();
        assert_eq!(role, expected, "role of {}", who.account.username);
    }

    let listed = storage
        .list_courses_for_account_impl(student.account.id, student.account.role)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].teacher_name, "TURING Test");
}

#[tokio::test]
async fn test_overview_counts_and_not_submitted() {
    let storage = memory_storage().await;
    let teacher = account(&storage, "turing", AccountRole::Teacher).await;
    let alice = account(&storage, "alice", AccountRole::Student).await;
    let bob = account(&storage, "bob", AccountRole::Student).await;
    let course = course(&storage, &teacher).await;
    for s in [&alice, &bob] {
        storage
            .enroll_student_impl(course.id, s.account.id)
            .await
            .unwrap();
    }

    let first = assignment(&storage, course.id, teacher.account.id, "Lab 1").await;
    let second = assignment(&storage, course.id, teacher.account.id, "Lab 2").await;

    storage
        .upsert_submission_impl(
            SubmissionKind::Student,
            first,
            profile_id(&alice),
            vec![stored("/submissions/a.pdf")],
        )
        .await
        .unwrap();
    storage
        .upsert_submission_impl(
            SubmissionKind::Other,
            first,
            teacher.account.id,
            vec![stored("/submissions/t.pdf")],
        )
        .await
        .unwrap();

    let overviews = storage.list_assignment_overviews_impl(course.id).await.unwrap();
    assert_eq!(overviews.len(), 2);

    let lab1 = &overviews[0];
    assert_eq!(lab1.assignment.id, first);
    assert_eq!(lab1.assignment.materials.len(), 1);
    assert_eq!(lab1.submissions.len(), 2);
    assert!(
        lab1.submissions
            .iter()
            .any(|e| e.kind == SubmissionKind::Student && e.username == "alice")
    );
    assert!(
        lab1.submissions
            .iter()
            .any(|e| e.kind == SubmissionKind::Other && e.role == AccountRole::Teacher)
    );
    let missing: Vec<&str> = lab1
        .not_submitted
        .iter()
        .map(|p| p.username.as_str())
        .collect();
    assert_eq!(missing, vec!["bob"]);

    let lab2 = &overviews[1];
    assert_eq!(lab2.assignment.id, second);
    assert!(lab2.submissions.is_empty());
    assert_eq!(lab2.not_submitted.len(), 3);

    let mine = storage
        .list_my_assignments_impl(course.id, SubmissionKind::Student, profile_id(&alice))
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine[0].submission.is_some());
    assert!(mine[1].submission.is_none());
}

#[tokio::test]
async fn test_resubmission_keeps_id_and_replaces_files() {
    let storage = memory_storage().await;
    let teacher = account(&storage, "turing", AccountRole::Teacher).await;
    let alice = account(&storage, "alice", AccountRole::Student).await;
    let course = course(&storage, &teacher).await;
    let lab = assignment(&storage, course.id, teacher.account.id, "Lab 1").await;

    let (first, replaced) = storage
        .upsert_submission_impl(
            SubmissionKind::Student,
            lab,
            profile_id(&alice),
            vec![stored("/submissions/v1.pdf")],
        )
        .await
        .unwrap();
    assert!(replaced.is_empty());
    assert_eq!(first.grade_state, GradeState::Ungraded);

    storage
        .apply_grade_impl(
            SubmissionKind::Student,
            first.id,
            GradeChange::Set(90.0),
            teacher.account.id,
        )
        .await
        .unwrap();

    let (second, replaced) = storage
        .upsert_submission_impl(
            SubmissionKind::Student,
            lab,
            profile_id(&alice),
            vec![stored("/submissions/v2.pdf"), stored("/submissions/v2.txt")],
        )
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(replaced, vec!["/submissions/v1.pdf".to_string()]);
    assert_eq!(second.files.len(), 2);
    assert_eq!(second.grade, Some(90.0));
    assert_eq!(Submissions::find().count(&storage.db).await.unwrap(), 1);
    assert_eq!(SubmissionFiles::find().count(&storage.db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_grade_then_regrade_writes_audits() {
    let storage = memory_storage().await;
    let teacher = account(&storage, "turing", AccountRole::Teacher).await;
    let assistant = account(&storage, "ada", AccountRole::Assistant).await;
    let course = course(&storage, &teacher).await;
    let lab = assignment(&storage, course.id, teacher.account.id, "Lab 1").await;

    let (submission, _) = storage
        .upsert_submission_impl(SubmissionKind::Other, lab, assistant.account.id, vec![])
        .await
        .unwrap();

    let graded = storage
        .apply_grade_impl(
            SubmissionKind::Other,
            submission.id,
            GradeChange::Set(87.5),
            teacher.account.id,
        )
        .await
        .unwrap()
        .expect("submission exists");
    assert_eq!(graded.grade, Some(87.5));
    assert!(graded.confirmed);
    assert_eq!(graded.graded_by, Some(teacher.account.id));

    let cleared = storage
        .apply_grade_impl(
            SubmissionKind::Other,
            submission.id,
            GradeChange::Clear,
            teacher.account.id,
        )
        .await
        .unwrap()
        .expect("submission exists");
    assert_eq!(cleared.grade, None);
    assert!(!cleared.confirmed);
    assert_eq!(cleared.grade_state, GradeState::Cleared);

    let history = storage
        .list_grade_history_impl(SubmissionKind::Other, submission.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].new_state, GradeState::Cleared);
    assert_eq!(history[0].old_grade, Some(87.5));
    assert_eq!(history[1].old_state, GradeState::Ungraded);
    assert_eq!(history[1].new_grade, Some(87.5));

    // 学生提交表中同 id 的记录不存在
    let missing = storage
        .apply_grade_impl(
            SubmissionKind::Student,
            submission.id,
            GradeChange::Set(1.0),
            teacher.account.id,
        )
        .await
        .unwrap();
    assert!(missing.is_none());
    assert_eq!(GradeAudits::find().count(&storage.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_course_cascades() {
    let storage = memory_storage().await;
    let teacher = account(&storage, "turing", AccountRole::Teacher).await;
    let assistant = account(&storage, "ada", AccountRole::Assistant).await;
    let alice = account(&storage, "alice", AccountRole::Student).await;
    let course = course(&storage, &teacher).await;
    storage
        .add_course_assistant_impl(course.id, assistant.account.id)
        .await
        .unwrap();
    storage
        .enroll_student_impl(course.id, alice.account.id)
        .await
        .unwrap();
    let lab = assignment(&storage, course.id, teacher.account.id, "Lab 1").await;
    let (submission, _) = storage
        .upsert_submission_impl(
            SubmissionKind::Student,
            lab,
            profile_id(&alice),
            vec![stored("/submissions/a.pdf")],
        )
        .await
        .unwrap();
    storage
        .apply_grade_impl(
            SubmissionKind::Student,
            submission.id,
            GradeChange::Set(70.0),
            assistant.account.id,
        )
        .await
        .unwrap();
    let (staff_submission, _) = storage
        .upsert_submission_impl(
            SubmissionKind::Other,
            lab,
            assistant.account.id,
            vec![stored("/submissions/t.pdf")],
        )
        .await
        .unwrap();
    storage
        .apply_grade_impl(
            SubmissionKind::Other,
            staff_submission.id,
            GradeChange::Set(95.0),
            teacher.account.id,
        )
        .await
        .unwrap();
    storage
        .create_material_impl(NewMaterial {
            course_id: course.id,
            title: "Slides".into(),
            file_path: "/courseMaterials/slides.pdf".into(),
            original_name: "slides.pdf".into(),
            uploaded_by: teacher.account.id,
        })
        .await
        .unwrap();

    let mut removed = storage
        .delete_course_impl(course.id)
        .await
        .unwrap()
        .expect("course exists");
    removed.sort();
    assert_eq!(
        removed,
        vec![
            "/courseMaterials/slides.pdf".to_string(),
            "/courses/cover.png".to_string(),
            "/materials/brief.pdf".to_string(),
            "/submissions/a.pdf".to_string(),
            "/submissions/t.pdf".to_string(),
        ]
    );

    let db = &storage.db;
    assert_eq!(Courses::find().count(db).await.unwrap(), 0);
    assert_eq!(Assignments::find().count(db).await.unwrap(), 0);
    assert_eq!(AssignmentMaterials::find().count(db).await.unwrap(), 0);
    assert_eq!(Submissions::find().count(db).await.unwrap(), 0);
    assert_eq!(SubmissionFiles::find().count(db).await.unwrap(), 0);
    assert_eq!(GradeAudits::find().count(db).await.unwrap(), 0);
    assert_eq!(OtherSubmissions::find().count(db).await.unwrap(), 0);
    assert_eq!(OtherSubmissionFiles::find().count(db).await.unwrap(), 0);
    assert_eq!(GradeAuditOtherSubmissions::find().count(db).await.unwrap(), 0);
    assert_eq!(Materials::find().count(db).await.unwrap(), 0);
    assert_eq!(Enrollments::find().count(db).await.unwrap(), 0);
    assert_eq!(OtherEnrollments::find().count(db).await.unwrap(), 0);
    assert_eq!(TeachingAssistants::find().count(db).await.unwrap(), 0);
    // 账号本身保留
    assert_eq!(Accounts::find().count(db).await.unwrap(), 3);

    assert!(storage.delete_course_impl(course.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_assignment_keeps_siblings() {
    let storage = memory_storage().await;
    let teacher = account(&storage, "turing", AccountRole::Teacher).await;
    let alice = account(&storage, "alice", AccountRole::Student).await;
    let course = course(&storage, &teacher).await;
    storage
        .enroll_student_impl(course.id, alice.account.id)
        .await
        .unwrap();
    let doomed = assignment(&storage, course.id, teacher.account.id, "Lab 1").await;
    let kept = assignment(&storage, course.id, teacher.account.id, "Lab 2").await;

    let (student_submission, _) = storage
        .upsert_submission_impl(
            SubmissionKind::Student,
            doomed,
            profile_id(&alice),
            vec![stored("/submissions/x.pdf")],
        )
        .await
        .unwrap();
    storage
        .apply_grade_impl(
            SubmissionKind::Student,
            student_submission.id,
            GradeChange::Set(60.0),
            teacher.account.id,
        )
        .await
        .unwrap();
    let (staff_submission, _) = storage
        .upsert_submission_impl(
            SubmissionKind::Other,
            doomed,
            teacher.account.id,
            vec![stored("/submissions/y.pdf")],
        )
        .await
        .unwrap();
    storage
        .apply_grade_impl(
            SubmissionKind::Other,
            staff_submission.id,
            GradeChange::Set(100.0),
            teacher.account.id,
        )
        .await
        .unwrap();
    storage
        .upsert_submission_impl(
            SubmissionKind::Student,
            kept,
            profile_id(&alice),
            vec![stored("/submissions/z.pdf")],
        )
        .await
        .unwrap();

    let mut removed = storage
        .delete_assignment_impl(doomed)
        .await
        .unwrap()
        .expect("assignment exists");
    removed.sort();
    assert_eq!(
        removed,
        vec![
            "/materials/brief.pdf".to_string(),
            "/submissions/x.pdf".to_string(),
            "/submissions/y.pdf".to_string(),
        ]
    );

    let db = &storage.db;
    assert!(Assignments::find_by_id(doomed).one(db).await.unwrap().is_none());
    assert!(Assignments::find_by_id(kept).one(db).await.unwrap().is_some());
    assert_eq!(AssignmentMaterials::find().count(db).await.unwrap(), 1);
    assert_eq!(Submissions::find().count(db).await.unwrap(), 1);
    assert_eq!(SubmissionFiles::find().count(db).await.unwrap(), 1);
    assert_eq!(GradeAudits::find().count(db).await.unwrap(), 0);
    assert_eq!(OtherSubmissions::find().count(db).await.unwrap(), 0);
    assert_eq!(OtherSubmissionFiles::find().count(db).await.unwrap(), 0);
    assert_eq!(GradeAuditOtherSubmissions::find().count(db).await.unwrap(), 0);
    assert_eq!(Courses::find().count(db).await.unwrap(), 1);
    assert_eq!(Enrollments::find().count(db).await.unwrap(), 1);

    assert!(storage.delete_assignment_impl(doomed).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_account_with_unknown_role_fails() {
    let storage = memory_storage().await;
    let now = chrono::Utc::now().timestamp();
    let ghost = AccountActiveModel {
        username: Set("ghost".to_string()),
        email: Set("ghost@example.com".to_string()),
        password_hash: Set("hash".to_string()),
        role: Set("janitor".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&storage.db)
    .await
    .unwrap();

    let result = storage.delete_account_impl(ghost.id).await;
    assert!(matches!(result, Err(LmsError::DatabaseOperation(_))));
    assert_eq!(Accounts::find().count(&storage.db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_account_rules() {
    let storage = memory_storage().await;
    let teacher = account(&storage, "turing", AccountRole::Teacher).await;
    let alice = account(&storage, "alice", AccountRole::Student).await;
    let course = course(&storage, &teacher).await;
    storage
        .enroll_student_impl(course.id, alice.account.id)
        .await
        .unwrap();
    let lab = assignment(&storage, course.id, teacher.account.id, "Lab 1").await;
    storage
        .upsert_submission_impl(
            SubmissionKind::Student,
            lab,
            profile_id(&alice),
            vec![stored("/submissions/a.pdf")],
        )
        .await
        .unwrap();

    let owns_courses = storage.delete_account_impl(teacher.account.id).await;
    assert!(matches!(owns_courses, Err(LmsError::Conflict(_))));
    assert!(
        storage
            .get_account_by_id_impl(teacher.account.id)
            .await
            .unwrap()
            .is_some()
    );

    let removed = storage
        .delete_account_impl(alice.account.id)
        .await
        .unwrap()
        .expect("account exists");
    assert_eq!(removed, vec!["/submissions/a.pdf".to_string()]);
    assert_eq!(Students::find().count(&storage.db).await.unwrap(), 0);
    assert_eq!(Enrollments::find().count(&storage.db).await.unwrap(), 0);
    assert_eq!(Submissions::find().count(&storage.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_materials_listing() {
    let storage = memory_storage().await;
    let teacher = account(&storage, "turing", AccountRole::Teacher).await;
    let course = course(&storage, &teacher).await;

    let material = storage
        .create_material_impl(NewMaterial {
            course_id: course.id,
            title: "Syllabus".into(),
            file_path: "/courseMaterials/syllabus.pdf".into(),
            original_name: "syllabus.pdf".into(),
            uploaded_by: teacher.account.id,
        })
        .await
        .unwrap();

    let listed = storage.list_materials_impl(course.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Syllabus");

    let deleted = storage.delete_material_impl(material.id).await.unwrap();
    assert_eq!(
        deleted.map(|m| m.file_path),
        Some("/courseMaterials/syllabus.pdf".to_string())
    );
    assert!(storage.list_materials_impl(course.id).await.unwrap().is_empty());
    assert!(storage.delete_material_impl(material.id).await.unwrap().is_none());
}
