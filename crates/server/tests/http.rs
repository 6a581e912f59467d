use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use database::services::{
    account::{AccountPolicy, AccountService, NewAccount},
    course::{CourseService, NewCourse},
    subject::SubjectService,
};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use serde_json::{Value, json};
use server::{app, config::AppConfig, state::AppState};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "X-EDUCA-BOUNDARY";

struct TestApp {
    router: Router,
    db: DatabaseConnection,
    media: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let media = TempDir::new().unwrap();
        let config = AppConfig {
            database_url: "sqlite::memory:".to_owned(),
            bind_addr: "127.0.0.1:0".to_owned(),
            media_root: media.path().to_path_buf(),
            media_url: "/media/".to_owned(),
            enforce_unique_email: false,
            run_migrations: false,
        };

        Self {
            router: app(AppState::new(db.clone(), config)),
            db,
            media,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn user(&self, username: &str, is_student: bool, is_teacher: bool) -> i32 {
        let (user, _) = AccountService::create_account(
            &self.db,
            NewAccount {
                username: username.to_owned(),
                email: format!("{username}@example.com"),
                first_name: String::new(),
                last_name: String::new(),
                is_student,
                is_teacher,
            },
            AccountPolicy::default(),
        )
        .await
        .unwrap();
        user.id
    }

    async fn course(&self, owner_id: i32, title: &str) -> (i32, String) {
        let subject = SubjectService::create(&self.db, "Programming".to_owned(), None)
            .await
            .unwrap();
        let course = CourseService::create(
            &self.db,
            NewCourse {
                owner_id,
                subject_id: subject.id,
                title: title.to_owned(),
                overview: "Overview".to_owned(),
            },
        )
        .await
        .unwrap();
        (course.id, course.slug)
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, user_id: i32, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn as_user(uri: &str, user_id: i32) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .body(Body::empty())
        .unwrap()
}

fn multipart(uri: &str, user_id: i32, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn upload(uri: &str, user_id: i32, title: &str, file_name: &str, bytes: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n\
         --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n{bytes}\r\n\
         --{BOUNDARY}--\r\n"
    );

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_passes_through() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::builder()
                .uri("/health")
                .header(header::HOST, "example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_course_subdomain_redirects_to_detail() {
    let app = TestApp::new().await;
    let teacher = app.user("teacher", false, true).await;
    let (_, slug) = app.course(teacher, "Rust Basics").await;
    assert_eq!(slug, "rust-basics");

    let response = app
        .send(
            Request::builder()
                .uri("/health")
                .header(header::HOST, "rust-basics.example.com")
                .header("x-forwarded-proto", "https")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://example.com/course/rust-basics/"
    );
}

#[tokio::test]
async fn test_unknown_course_subdomain_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::builder()
                .uri("/health")
                .header(header::HOST, "missing.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_www_and_bare_hosts_are_not_courses() {
    let app = TestApp::new().await;

    for host in ["www.example.com", "example.com", "localhost:3000", "127.0.0.1:3000"] {
        let response = app
            .send(
                Request::builder()
                    .uri("/health")
                    .header(header::HOST, host)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "{host}");
    }
}

#[tokio::test]
async fn test_course_detail_by_slug() {
    let app = TestApp::new().await;
    let teacher = app.user("teacher", false, true).await;
    app.course(teacher, "Rust Basics").await;

    let response = app.send(get("/course/rust-basics/")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["course"]["title"], "Rust Basics");
    assert_eq!(body["course"]["subject"], "Programming");
    assert_eq!(body["owner"]["username"], "teacher");
    assert!(
        body["owner"]["avatar_url"]
            .as_str()
            .unwrap()
            .starts_with("https://www.gravatar.com/avatar/")
    );

    let missing = app.send(get("/course/nope/")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_course_list_links_pages() {
    let app = TestApp::new().await;
    let teacher = app.user("teacher", false, true).await;
    let subject = SubjectService::create(&app.db, "Programming".to_owned(), None)
        .await
        .unwrap();
    for title in ["One", "Two", "Three"] {
        CourseService::create(
            &app.db,
            NewCourse {
                owner_id: teacher,
                subject_id: subject.id,
                title: title.to_owned(),
                overview: "Overview".to_owned(),
            },
        )
        .await
        .unwrap();
    }

    let response = app
        .send(get("/courses?subject=programming&per_page=2&page=1"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["courses"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total_items"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(
        body["pagination"]["next"],
        "subject=programming&per_page=2&page=2"
    );
    assert_eq!(body["pagination"]["prev"], Value::Null);
}

#[tokio::test]
async fn test_authentication_is_required() {
    let app = TestApp::new().await;

    let response = app.send(get("/accounts/me")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let unknown = app.send(as_user("/accounts/me", 999)).await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_students_cannot_create_courses() {
    let app = TestApp::new().await;
    let student = app.user("sam", true, false).await;

    let response = app
        .send(json_request(
            "POST",
            "/courses",
            student,
            json!({ "subject": 1, "title": "Mine", "overview": "x" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_course_form_reports_field_errors() {
    let app = TestApp::new().await;
    let teacher = app.user("teacher", false, true).await;

    let response = app
        .send(json_request(
            "POST",
            "/courses",
            teacher,
            json!({ "title": "", "overview": "Overview" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["errors"]["title"][0], "This field is required.");
    assert_eq!(body["errors"]["subject"][0], "This field is required.");
}

#[tokio::test]
async fn test_teacher_builds_a_course() {
    let app = TestApp::new().await;
    let teacher = app.user("teacher", false, true).await;
    let subject = SubjectService::create(&app.db, "Programming".to_owned(), None)
        .await
        .unwrap();

    let response = app
        .send(json_request(
            "POST",
            "/courses",
            teacher,
            json!({ "subject": subject.id, "title": "Rust Basics", "overview": "Learn Rust" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let course = body_json(response).await;
    let course_id = course["id"].as_i64().unwrap();
    assert_eq!(course["slug"], "rust-basics");

    let formset = app
        .send(as_user(
            &format!("/courses/{course_id}/modules/formset"),
            teacher,
        ))
        .await;
    assert_eq!(formset.status(), StatusCode::OK);
    let formset = body_json(formset).await;
    assert_eq!(formset["extra"], 2);
    assert_eq!(formset["rows"].as_array().unwrap().len(), 2);

    let saved = app
        .send(json_request(
            "POST",
            &format!("/courses/{course_id}/modules/formset"),
            teacher,
            json!({ "rows": [
                { "title": "Basics", "description": "Start here" },
                { "title": "", "description": "" }
            ] }),
        ))
        .await;
    assert_eq!(saved.status(), StatusCode::OK);
    let modules = body_json(saved).await;
    assert_eq!(modules[0]["label"], "0. Basics");
    let module_id = modules[0]["id"].as_i64().unwrap();

    let created = app
        .send(multipart(
            &format!("/modules/{module_id}/contents/text"),
            teacher,
            &[("title", "Welcome"), ("content", "Hello <there>")],
        ))
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let content = body_json(created).await;
    assert_eq!(content["kind"], "text");
    assert_eq!(content["order"], 0);
    assert_eq!(content["item"]["html"], "<p>Hello &lt;there&gt;</p>");

    let listed = app
        .send(as_user(&format!("/modules/{module_id}/contents"), teacher))
        .await;
    assert_eq!(listed.status(), StatusCode::OK);
    let listed = body_json(listed).await;
    assert_eq!(listed["contents"].as_array().unwrap().len(), 1);
    assert_eq!(listed["contents"][0]["item"]["title"], "Welcome");
}

#[tokio::test]
async fn test_contents_need_a_valid_kind_and_payload() {
    let app = TestApp::new().await;
    let teacher = app.user("teacher", false, true).await;
    let (course_id, _) = app.course(teacher, "Rust").await;

    let saved = app
        .send(json_request(
            "POST",
            &format!("/courses/{course_id}/modules/formset"),
            teacher,
            json!({ "rows": [{ "title": "Basics", "description": "Start here" }] }),
        ))
        .await;
    let module_id = body_json(saved).await[0]["id"].as_i64().unwrap();

    let unknown = app
        .send(multipart(
            &format!("/modules/{module_id}/contents/audio"),
            teacher,
            &[("title", "Song")],
        ))
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let missing_url = app
        .send(multipart(
            &format!("/modules/{module_id}/contents/video"),
            teacher,
            &[("title", "Talk")],
        ))
        .await;
    assert_eq!(missing_url.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(missing_url).await["errors"]["url"][0],
        "This field is required."
    );
}

#[tokio::test]
async fn test_failed_content_write_keeps_no_upload() {
    let app = TestApp::new().await;
    let teacher = app.user("teacher", false, true).await;
    let (course_id, _) = app.course(teacher, "Rust").await;

    let saved = app
        .send(json_request(
            "POST",
            &format!("/courses/{course_id}/modules/formset"),
            teacher,
            json!({ "rows": [{ "title": "Basics", "description": "Start here" }] }),
        ))
        .await;
    let module_id = body_json(saved).await[0]["id"].as_i64().unwrap();
    let uri = format!("/modules/{module_id}/contents/image");

    let stored = app
        .send(upload(&uri, teacher, "Diagram", "diagram.png", "png-bytes"))
        .await;
    assert_eq!(stored.status(), StatusCode::CREATED);

    app.db
        .execute_unprepared(
            "CREATE TRIGGER reject_contents BEFORE INSERT ON contents \
             BEGIN SELECT RAISE(ABORT, 'contents are frozen'); END",
        )
        .await
        .unwrap();

    let failed = app
        .send(upload(&uri, teacher, "Diagram", "diagram.png", "png-bytes"))
        .await;
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let images: Vec<_> = std::fs::read_dir(app.media.path().join("images"))
        .unwrap()
        .collect();
    assert_eq!(images.len(), 1);
}

#[tokio::test]
async fn test_reorder_rejects_out_of_range_positions() {
    let app = TestApp::new().await;
    let teacher = app.user("teacher", false, true).await;
    let student = app.user("student", true, false).await;
    let (course_id, _) = app.course(teacher, "Rust").await;

    let saved = app
        .send(json_request(
            "POST",
            &format!("/courses/{course_id}/modules/formset"),
            teacher,
            json!({ "rows": [
                { "title": "Basics", "description": "Start here" },
                { "title": "Traits", "description": "Then this" }
            ] }),
        ))
        .await;
    let modules = body_json(saved).await;
    let first = modules[0]["id"].as_i64().unwrap();
    let second = modules[1]["id"].as_i64().unwrap();
    let uri = format!("/courses/{course_id}/modules/order");

    let too_large = app
        .send(json_request("POST", &uri, teacher, json!({ first.to_string(): i32::MAX })))
        .await;
    assert_eq!(too_large.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let negative = app
        .send(json_request("POST", &uri, teacher, json!({ first.to_string(): -1 })))
        .await;
    assert_eq!(negative.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(negative).await["errors"][first.to_string()][0],
        "Ensure this value is greater than or equal to 0."
    );

    let forbidden = app
        .send(json_request("POST", &uri, student, json!({ first.to_string(): 1 })))
        .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let swapped = app
        .send(json_request(
            "POST",
            &uri,
            teacher,
            json!({ first.to_string(): 1, second.to_string(): 0 }),
        ))
        .await;
    assert_eq!(swapped.status(), StatusCode::OK);
    assert_eq!(body_json(swapped).await["updated"], 2);
}

#[tokio::test]
async fn test_other_teachers_courses_look_missing() {
    let app = TestApp::new().await;
    let owner = app.user("owner", false, true).await;
    let other = app.user("other", false, true).await;
    let (course_id, _) = app.course(owner, "Rust").await;

    let response = app
        .send(as_user(&format!("/courses/{course_id}/modules/formset"), other))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let deleted = app
        .send(
            Request::builder()
                .method("DELETE")
                .uri(format!("/courses/{course_id}"))
                .header("x-user-id", other.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(deleted.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_student_enrolls_and_reviews() {
    let app = TestApp::new().await;
    let teacher = app.user("teacher", false, true).await;
    let student = app.user("sam", true, false).await;
    let (course_id, _) = app.course(teacher, "Rust").await;

    let enrolled = app
        .send(json_request(
            "POST",
            &format!("/courses/{course_id}/enroll"),
            student,
            json!({}),
        ))
        .await;
    assert_eq!(enrolled.status(), StatusCode::NO_CONTENT);

    let joined = body_json(app.send(as_user("/courses/joined", student)).await).await;
    assert_eq!(joined[0]["id"], course_id);

    let bad = app
        .send(json_request(
            "POST",
            &format!("/courses/{course_id}/reviews"),
            student,
            json!({ "rating": 9, "comment": "Great" }),
        ))
        .await;
    assert_eq!(bad.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let review = app
        .send(json_request(
            "POST",
            &format!("/courses/{course_id}/reviews"),
            student,
            json!({ "rating": 4, "comment": "Great" }),
        ))
        .await;
    assert_eq!(review.status(), StatusCode::CREATED);

    let reviews = body_json(app.send(get(&format!("/courses/{course_id}/reviews"))).await).await;
    assert_eq!(reviews["average_rating"], 4.0);
    assert_eq!(reviews["reviews"][0]["user"]["username"], "sam");
}

#[tokio::test]
async fn test_sign_up_and_edit_profile() {
    let app = TestApp::new().await;

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/accounts")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "username": "ann", "email": "ann@example.com", "is_student": true })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let account = body_json(response).await;
    let user_id = account["id"].as_i64().unwrap() as i32;
    assert_eq!(account["profile"]["award_points"], 0);
    assert_eq!(
        account["permissions"],
        json!(["courses.add_review", "students.take_quiz"])
    );

    let profile = app
        .send(json_request(
            "PUT",
            "/accounts/me/profile",
            user_id,
            json!({ "location": "Lisbon", "birthdate": "1990-05-17" }),
        ))
        .await;
    assert_eq!(profile.status(), StatusCode::OK);
    assert_eq!(body_json(profile).await["birthdate"], "1990-05-17");

    let duplicate = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/accounts")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "username": "ann", "email": "other@example.com" }).to_string(),
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_student_takes_a_quiz() {
    let app = TestApp::new().await;
    let teacher = app.user("teacher", false, true).await;
    let student = app.user("sam", true, false).await;

    let tag = body_json(
        app.send(json_request("POST", "/tags", teacher, json!({ "name": "Math" })))
            .await,
    )
    .await;
    assert_eq!(tag["color"], "#007bff");
    let tag_id = tag["id"].as_i64().unwrap();

    let quiz = body_json(
        app.send(json_request(
            "POST",
            "/quizzes",
            teacher,
            json!({ "name": "Sums", "tag": tag_id }),
        ))
        .await,
    )
    .await;
    let quiz_id = quiz["quiz"]["id"].as_i64().unwrap();

    let question = body_json(
        app.send(json_request(
            "POST",
            &format!("/quizzes/{quiz_id}/questions"),
            teacher,
            json!({ "text": "1 + 1?" }),
        ))
        .await,
    )
    .await;
    let question_id = question["id"].as_i64().unwrap();

    let right = body_json(
        app.send(json_request(
            "POST",
            &format!("/questions/{question_id}/answers"),
            teacher,
            json!({ "text": "2", "is_correct": true }),
        ))
        .await,
    )
    .await;

    let interests = app
        .send(json_request(
            "PUT",
            "/students/me/interests",
            student,
            json!({ "tags": [tag_id] }),
        ))
        .await;
    assert_eq!(interests.status(), StatusCode::OK);

    let available = body_json(app.send(as_user("/students/me/quizzes", student)).await).await;
    assert_eq!(available[0]["id"], quiz_id);

    let next = body_json(
        app.send(as_user(&format!("/students/me/quizzes/{quiz_id}/next"), student))
            .await,
    )
    .await;
    assert_eq!(next["text"], "1 + 1?");
    assert!(next["answers"][0].get("is_correct").is_none());

    let progress = app
        .send(json_request(
            "POST",
            &format!("/students/me/quizzes/{quiz_id}/answers"),
            student,
            json!({ "answer": right["id"] }),
        ))
        .await;
    assert_eq!(progress.status(), StatusCode::OK);
    let progress = body_json(progress).await;
    assert_eq!(progress["status"], "completed");
    assert_eq!(progress["score"], 100.0);
    assert_eq!(progress["passed"], true);

    let taken = body_json(app.send(as_user("/students/me/taken", student)).await).await;
    assert_eq!(taken[0]["quiz_name"], "Sums");

    let me = body_json(app.send(as_user("/accounts/me", student)).await).await;
    assert_eq!(me["profile"]["award_points"], 1);

    let teacher_taking = app.send(as_user("/students/me/quizzes", teacher)).await;
    assert_eq!(teacher_taking.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_form_descriptors() {
    let app = TestApp::new().await;

    let response = app.send(get("/forms/course")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let form = body_json(response).await;
    assert_eq!(form["name"], "course");
    assert_eq!(form["fields"][1]["name"], "title");
    assert_eq!(form["fields"][1]["max_length"], 200);
    assert_eq!(form["fields"][1]["attrs"]["class"], "form-control");

    let formset = body_json(app.send(get("/forms/module-formset")).await).await;
    assert_eq!(formset["extra"], 2);

    let missing = app.send(get("/forms/nope")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new().await;

    let response = app.send(get("/api-docs/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert_eq!(doc["info"]["title"], "Educa API");
}
