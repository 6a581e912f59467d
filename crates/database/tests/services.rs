use chrono::{TimeZone, Utc};
use database::{
    entities::{content, course, module, profile, student},
    error::ServiceError,
    services::{
        account::{AccountPolicy, AccountService, NewAccount},
        content::{ContentItem, ContentService, ItemChanges, NewItem},
        course::{CourseService, NewCourse},
        module::{ModuleChange, ModuleFields, ModuleService},
        quiz::{QuizProgress, QuizService},
        review::ReviewService,
        subject::SubjectService,
    },
};
use migration::{Migrator, MigratorTrait};
use models::{content::ItemPayload, rating::Rating};
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

async fn setup() -> DatabaseConnection {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&conn, None).await.unwrap();
    conn
}

fn account(username: &str, is_student: bool, is_teacher: bool) -> NewAccount {
    NewAccount {
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        is_student,
        is_teacher,
    }
}

fn fields(title: &str) -> ModuleFields {
    ModuleFields {
        title: title.to_owned(),
        description: format!("About {title}"),
        content: None,
    }
}

/// A teacher with one course in a fresh subject
async fn teacher_with_course(conn: &DatabaseConnection, title: &str) -> (i32, course::Model) {
    let (teacher, _) =
        AccountService::create_account(conn, account("teacher", false, true), AccountPolicy::default())
            .await
            .unwrap();
    let subject = SubjectService::create(conn, "Programming".to_owned(), None)
        .await
        .unwrap();
    let course = CourseService::create(
        conn,
        NewCourse {
            owner_id: teacher.id,
            subject_id: subject.id,
            title: title.to_owned(),
            overview: "Overview".to_owned(),
        },
    )
    .await
    .unwrap();

    (teacher.id, course)
}

fn text(owner_id: i32, title: &str) -> NewItem {
    NewItem {
        owner_id,
        title: title.to_owned(),
        payload: ItemPayload::Text {
            content: format!("{title} body"),
        },
        order: None,
    }
}

#[tokio::test]
async fn test_module_orders_are_scoped_per_course() {
    let conn = &setup().await;
    let (teacher_id, first) = teacher_with_course(conn, "Rust").await;
    let second = CourseService::create(
        conn,
        NewCourse {
            owner_id: teacher_id,
            subject_id: first.subject_id,
            title: "Go".to_owned(),
            overview: String::new(),
        },
    )
    .await
    .unwrap();

    let a = ModuleService::create(conn, first.id, fields("Basics"), None).await.unwrap();
    let b = ModuleService::create(conn, first.id, fields("Traits"), None).await.unwrap();
    let c = ModuleService::create(conn, second.id, fields("Goroutines"), None).await.unwrap();

    assert_eq!((a.order, b.order, c.order), (0, 1, 0));
    assert_eq!(a.label(), "0. Basics");
}

#[tokio::test]
async fn test_explicit_order_is_kept() {
    let conn = &setup().await;
    let (_, course) = teacher_with_course(conn, "Rust").await;

    let module = ModuleService::create(conn, course.id, fields("Late"), Some(7)).await.unwrap();
    let next = ModuleService::create(conn, course.id, fields("Later"), None).await.unwrap();

    assert_eq!(module.order, 7);
    assert_eq!(next.order, 8);
}

#[tokio::test]
async fn test_contents_are_ordered_and_resolved() {
    let conn = &setup().await;
    let (teacher_id, course) = teacher_with_course(conn, "Rust").await;
    let module = ModuleService::create(conn, course.id, fields("Basics"), None).await.unwrap();
    let other = ModuleService::create(conn, course.id, fields("Traits"), None).await.unwrap();

    let (first, _) = ContentService::create(conn, module.id, text(teacher_id, "Intro")).await.unwrap();
    let (second, item) = ContentService::create(
        conn,
        module.id,
        NewItem {
            owner_id: teacher_id,
            title: "Talk".to_owned(),
            payload: ItemPayload::Video {
                url: "https://www.youtube.com/watch?v=abc123".to_owned(),
            },
            order: None,
        },
    )
    .await
    .unwrap();
    let (elsewhere, _) = ContentService::create(conn, other.id, text(teacher_id, "Other")).await.unwrap();

    assert_eq!((first.order, second.order, elsewhere.order), (0, 1, 0));
    assert!(matches!(item, ContentItem::Video(_)));

    let listed = ContentService::list_for_module(conn, module.id).await.unwrap();
    let titles: Vec<_> = listed
        .iter()
        .map(|(_, item)| item.as_ref().unwrap().title().to_owned())
        .collect();
    assert_eq!(titles, ["Intro", "Talk"]);
}

#[tokio::test]
async fn test_update_item_rejects_other_kind() {
    let conn = &setup().await;
    let (teacher_id, course) = teacher_with_course(conn, "Rust").await;
    let module = ModuleService::create(conn, course.id, fields("Basics"), None).await.unwrap();
    let (slot, _) = ContentService::create(conn, module.id, text(teacher_id, "Intro")).await.unwrap();

    let result = ContentService::update_item(
        conn,
        &slot,
        ItemChanges {
            title: "Intro".to_owned(),
            payload: Some(ItemPayload::Video {
                url: "https://vimeo.com/1".to_owned(),
            }),
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::Invalid { field: "kind", .. })));

    let updated = ContentService::update_item(
        conn,
        &slot,
        ItemChanges {
            title: "Welcome".to_owned(),
            payload: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.title(), "Welcome");
    assert_eq!(
        updated.payload(),
        ItemPayload::Text {
            content: "Intro body".to_owned()
        }
    );
}

#[tokio::test]
async fn test_reorder_swaps_positions() {
    let conn = &setup().await;
    let (_, course) = teacher_with_course(conn, "Rust").await;
    let a = ModuleService::create(conn, course.id, fields("A"), None).await.unwrap();
    let b = ModuleService::create(conn, course.id, fields("B"), None).await.unwrap();

    let updated = ModuleService::reorder(conn, course.id, &[(a.id, 1), (b.id, 0)])
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let titles: Vec<_> = ModuleService::list_for_course(conn, course.id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(titles, ["B", "A"]);
}

#[tokio::test]
async fn test_taken_order_is_an_integrity_error() {
    let conn = &setup().await;
    let (teacher_id, first) = teacher_with_course(conn, "Rust").await;
    let second = CourseService::create(
        conn,
        NewCourse {
            owner_id: teacher_id,
            subject_id: first.subject_id,
            title: "Go".to_owned(),
            overview: String::new(),
        },
    )
    .await
    .unwrap();

    ModuleService::create(conn, first.id, fields("Basics"), Some(3)).await.unwrap();

    let clash = ModuleService::create(conn, first.id, fields("Again"), Some(3)).await;
    assert!(clash.is_err());
    assert_eq!(ModuleService::list_for_course(conn, first.id).await.unwrap().len(), 1);

    let elsewhere = ModuleService::create(conn, second.id, fields("Basics"), Some(3))
        .await
        .unwrap();
    assert_eq!(elsewhere.order, 3);
}

#[tokio::test]
async fn test_full_scope_reports_an_error_instead_of_wrapping() {
    let conn = &setup().await;
    let (_, course) = teacher_with_course(conn, "Rust").await;

    ModuleService::create(conn, course.id, fields("Last"), Some(i32::MAX)).await.unwrap();

    let overflow = ModuleService::create(conn, course.id, fields("Next"), None).await;
    assert!(overflow.is_err());
}

#[tokio::test]
async fn test_reorder_parks_below_existing_orders() {
    let conn = &setup().await;
    let (_, course) = teacher_with_course(conn, "Rust").await;
    let a = ModuleService::create(conn, course.id, fields("A"), None).await.unwrap();
    let b = ModuleService::create(conn, course.id, fields("B"), None).await.unwrap();
    let c = ModuleService::create(conn, course.id, fields("C"), None).await.unwrap();

    // A row already sitting where the first parked value used to go
    ModuleService::reorder(conn, course.id, &[(a.id, -1)]).await.unwrap();

    let updated = ModuleService::reorder(conn, course.id, &[(b.id, 5), (c.id, 4)])
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let orders: Vec<_> = ModuleService::list_for_course(conn, course.id)
        .await
        .unwrap()
        .into_iter()
        .map(|m| (m.title, m.order))
        .collect();
    assert_eq!(
        orders,
        [("A".to_owned(), -1), ("C".to_owned(), 4), ("B".to_owned(), 5)]
    );
}

#[tokio::test]
async fn test_slugs_are_unique_within_a_month() {
    let conn = &setup().await;
    let (teacher_id, _) = teacher_with_course(conn, "Warmup").await;
    let subject = SubjectService::create(conn, "Music".to_owned(), None).await.unwrap();
    let new_course = || NewCourse {
        owner_id: teacher_id,
        subject_id: subject.id,
        title: "Intro to Jazz".to_owned(),
        overview: String::new(),
    };

    let march = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
    let late_march = Utc.with_ymd_and_hms(2024, 3, 28, 10, 0, 0).unwrap();
    let april = Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap();

    let first = CourseService::create_at(conn, new_course(), march).await.unwrap();
    let second = CourseService::create_at(conn, new_course(), late_march).await.unwrap();
    let third = CourseService::create_at(conn, new_course(), april).await.unwrap();

    assert_eq!(first.slug, "intro-to-jazz");
    assert_eq!(second.slug, "intro-to-jazz-2");
    assert_eq!(third.slug, "intro-to-jazz");

    let found = CourseService::get_by_slug(conn, "intro-to-jazz").await.unwrap().unwrap();
    assert_eq!(found.id, third.id);
}

#[tokio::test]
async fn test_list_filters_by_subject_and_paginates() {
    let conn = &setup().await;
    let (teacher_id, _) = teacher_with_course(conn, "Rust").await;
    let music = SubjectService::create(conn, "Music".to_owned(), None).await.unwrap();
    for title in ["Jazz", "Blues", "Soul"] {
        CourseService::create(
            conn,
            NewCourse {
                owner_id: teacher_id,
                subject_id: music.id,
                title: title.to_owned(),
                overview: String::new(),
            },
        )
        .await
        .unwrap();
    }

    let (page, total) = CourseService::list(conn, Some("music"), 1, 2).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert!(page.iter().all(|(_, subject)| subject.as_ref().unwrap().slug == "music"));

    let (all, total) = CourseService::list(conn, None, 1, 10).await.unwrap();
    assert_eq!((all.len(), total), (4, 4));

    let counts = SubjectService::list_with_counts(conn).await.unwrap();
    let music_count = counts.iter().find(|(s, _)| s.slug == "music").unwrap().1;
    assert_eq!(music_count, 3);
}

#[tokio::test]
async fn test_account_gets_one_profile() {
    let conn = &setup().await;
    let (user, profile) =
        AccountService::create_account(conn, account("ann", true, false), AccountPolicy::default())
            .await
            .unwrap();

    assert_eq!(profile.user_id, user.id);
    assert_eq!(profile.award_points, 0);
    assert!(student::Entity::find_by_id(user.id).one(conn).await.unwrap().is_some());

    let duplicate =
        AccountService::create_account(conn, account("ann", true, false), AccountPolicy::default())
            .await;
    assert!(matches!(duplicate, Err(ServiceError::Invalid { field: "username", .. })));

    AccountService::award_points(conn, user.id, 3).await.unwrap();
    AccountService::award_points(conn, user.id, 2).await.unwrap();
    let profiles = profile::Entity::find()
        .filter(profile::Column::UserId.eq(user.id))
        .all(conn)
        .await
        .unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].award_points, 5);
}

#[tokio::test]
async fn test_unique_email_policy() {
    let conn = &setup().await;
    let policy = AccountPolicy { unique_email: true };
    let mut other = account("bob", false, false);
    other.email = "ann@example.com".to_owned();

    AccountService::create_account(conn, account("ann", false, false), policy)
        .await
        .unwrap();
    let result = AccountService::create_account(conn, other.clone(), policy).await;
    assert!(matches!(result, Err(ServiceError::Invalid { field: "email", .. })));

    let relaxed = AccountService::create_account(conn, other, AccountPolicy::default()).await;
    assert!(relaxed.is_ok());
}

#[tokio::test]
async fn test_reviews_and_average_rating() {
    let conn = &setup().await;
    let (teacher_id, course) = teacher_with_course(conn, "Rust").await;

    assert_eq!(CourseService::average_rating(conn, course.id).await.unwrap(), None);

    for value in [5, 4] {
        ReviewService::create(conn, course.id, teacher_id, Rating::new(value).unwrap(), "ok".to_owned())
            .await
            .unwrap();
    }

    let reviews = ReviewService::list_for_course(conn, course.id).await.unwrap();
    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].1.as_ref().unwrap().username, "teacher");

    let detail = CourseService::get_detail(conn, &course.slug).await.unwrap().unwrap();
    assert_eq!(detail.average_rating, Some(4.5));

    let missing = ReviewService::create(conn, 999, teacher_id, Rating::new(3).unwrap(), String::new()).await;
    assert!(matches!(missing, Err(ServiceError::NotFound("course"))));
}

#[tokio::test]
async fn test_deleting_course_removes_modules_and_contents() {
    let conn = &setup().await;
    let (teacher_id, course) = teacher_with_course(conn, "Rust").await;
    let module = ModuleService::create(conn, course.id, fields("Basics"), None).await.unwrap();
    ContentService::create(conn, module.id, text(teacher_id, "Intro")).await.unwrap();

    assert!(CourseService::delete(conn, course.id).await.unwrap());

    assert_eq!(module::Entity::find().count(conn).await.unwrap(), 0);
    assert_eq!(content::Entity::find().count(conn).await.unwrap(), 0);
}

#[tokio::test]
async fn test_enrollment_is_idempotent() {
    let conn = &setup().await;
    let (_, course) = teacher_with_course(conn, "Rust").await;
    let (student, _) =
        AccountService::create_account(conn, account("sam", true, false), AccountPolicy::default())
            .await
            .unwrap();
    assert!(!CourseService::is_enrolled(conn, course.id, student.id).await.unwrap());

    CourseService::enroll_student(conn, course.id, student.id).await.unwrap();
    CourseService::enroll_student(conn, course.id, student.id).await.unwrap();

    let joined = CourseService::list_joined(conn, student.id).await.unwrap();
    assert_eq!(joined.len(), 1);
    assert!(CourseService::is_enrolled(conn, course.id, student.id).await.unwrap());
    let detail = CourseService::get_detail(conn, &course.slug).await.unwrap().unwrap();
    assert_eq!(detail.student_count, 1);
}

#[tokio::test]
async fn test_formset_applies_deletes_updates_and_creates() {
    let conn = &setup().await;
    let (_, course) = teacher_with_course(conn, "Rust").await;
    let keep = ModuleService::create(conn, course.id, fields("Keep"), None).await.unwrap();
    let drop = ModuleService::create(conn, course.id, fields("Drop"), None).await.unwrap();

    let modules = ModuleService::apply_formset(
        conn,
        course.id,
        vec![
            ModuleChange::Update(keep.id, fields("Kept")),
            ModuleChange::Delete(drop.id),
            ModuleChange::Create(fields("New")),
        ],
    )
    .await
    .unwrap();

    let summary: Vec<_> = modules.iter().map(|m| (m.title.as_str(), m.order)).collect();
    assert_eq!(summary, [("Kept", 0), ("New", 1)]);

    let foreign = ModuleService::apply_formset(conn, course.id + 1, vec![ModuleChange::Delete(keep.id)]).await;
    assert!(matches!(foreign, Err(ServiceError::NotFound("module"))));
}

#[tokio::test]
async fn test_quiz_flow_scores_and_awards_points() {
    let conn = &setup().await;
    let (teacher, _) =
        AccountService::create_account(conn, account("teacher", false, true), AccountPolicy::default())
            .await
            .unwrap();
    let (student, _) =
        AccountService::create_account(conn, account("sam", true, false), AccountPolicy::default())
            .await
            .unwrap();

    let tag = QuizService::create_tag(conn, "Math".to_owned(), None).await.unwrap();
    assert_eq!(tag.color, "#007bff");
    let quiz = QuizService::create_quiz(conn, teacher.id, "Sums".to_owned(), tag.id).await.unwrap();
    let q1 = QuizService::add_question(conn, quiz.id, "1 + 1".to_owned()).await.unwrap();
    let q2 = QuizService::add_question(conn, quiz.id, "2 + 2".to_owned()).await.unwrap();
    let right = QuizService::add_answer(conn, q1.id, "2".to_owned(), true).await.unwrap();
    QuizService::add_answer(conn, q1.id, "3".to_owned(), false).await.unwrap();
    QuizService::add_answer(conn, q2.id, "4".to_owned(), true).await.unwrap();
    let wrong = QuizService::add_answer(conn, q2.id, "5".to_owned(), false).await.unwrap();

    assert!(QuizService::available_quizzes(conn, student.id).await.unwrap().is_empty());
    QuizService::set_interests(conn, student.id, &[tag.id]).await.unwrap();
    assert_eq!(QuizService::available_quizzes(conn, student.id).await.unwrap().len(), 1);

    let (next, answers) = QuizService::next_question(conn, student.id, quiz.id).await.unwrap().unwrap();
    assert_eq!(next.id, q1.id);
    assert_eq!(answers.len(), 2);

    let progress = QuizService::submit_answer(conn, student.id, quiz.id, right.id).await.unwrap();
    assert_eq!(progress, QuizProgress::Pending { remaining: 1 });

    // Answering the same question twice is refused
    let again = QuizService::submit_answer(conn, student.id, quiz.id, right.id).await;
    assert!(matches!(again, Err(ServiceError::Invalid { field: "answer", .. })));

    let QuizProgress::Completed { score, passed, correct, total, .. } =
        QuizService::submit_answer(conn, student.id, quiz.id, wrong.id).await.unwrap()
    else {
        panic!("quiz should be completed");
    };
    assert_eq!((correct, total), (1, 2));
    assert_eq!(score, 50.0);
    assert!(passed);

    let (_, profile) = AccountService::get(conn, student.id).await.unwrap().unwrap();
    assert_eq!(profile.unwrap().award_points, 1);

    let taken = QuizService::taken_quizzes(conn, student.id).await.unwrap();
    assert_eq!(taken.len(), 1);
    assert!(QuizService::available_quizzes(conn, student.id).await.unwrap().is_empty());

    let retake = QuizService::submit_answer(conn, student.id, quiz.id, right.id).await;
    assert!(matches!(retake, Err(ServiceError::Invalid { field: "quiz", .. })));
}
