//! HTTP 层端到端测试
//!
//! 每个用例使用独立的内存 SQLite 和临时上传目录。

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use chrono::{Duration, Utc};
use futures_util::future::join_all;
use serde_json::{Value, json};
use tempfile::TempDir;

use rust_assignment_tracker::config::AppConfig;
use rust_assignment_tracker::models::AppStartTime;
use rust_assignment_tracker::models::users::entities::{Role, User};
use rust_assignment_tracker::runtime::lifetime::startup::{StartupContext, prepare_server_startup};
use rust_assignment_tracker::utils::jwt::JwtUtils;

const BOUNDARY: &str = "----tracker-test-boundary";
const PDF: &[u8] = b"%PDF-1.4\n% essay body for tests\n";
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

struct TestEnv {
    ctx: StartupContext,
    dir: TempDir,
}

impl TestEnv {
    fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }

    fn stored_file_count(&self) -> usize {
        std::fs::read_dir(self.upload_dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

async fn setup() -> TestEnv {
    setup_with(|_| {}).await
}

async fn setup_with(adjust: impl FnOnce(&mut AppConfig)) -> TestEnv {
    let dir = tempfile::tempdir().unwrap();

    let mut config = AppConfig::defaults().unwrap();
    config.database.url = "sqlite::memory:".to_string();
    config.database.pool_size = 1;
    config.upload.dir = dir.path().join("uploads").to_string_lossy().into_owned();
    // 降低哈希开销
    config.argon2.memory_cost = 1024;
    config.argon2.time_cost = 1;
    config.argon2.parallelism = 1;
    adjust(&mut config);

    let ctx = prepare_server_startup(
        config,
        AppStartTime {
            start_datetime: Utc::now(),
        },
    )
    .await
    .unwrap();

    TestEnv { ctx, dir }
}

macro_rules! init_app {
    ($env:expr) => {{
        let ctx = $env.ctx.clone();
        test::init_service(App::new().configure(move |cfg| ctx.configure(cfg))).await
    }};
}

async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

async fn register<S, B>(app: &S, email: &str, role: &str) -> (String, i64)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": email,
            "password": "secret123",
            "firstName": "Test",
            "lastName": "User",
            "role": role,
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    (
        body["data"]["token"].as_str().unwrap().to_string(),
        body["data"]["user"]["id"].as_i64().unwrap(),
    )
}

fn due_in(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339()
}

fn parse_time(value: &Value) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(value.as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

async fn create_assignment<S, B>(app: &S, token: &str, body: Value) -> i64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/assignments")
        .insert_header(bearer(token))
        .set_json(body)
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "create assignment failed: {body}");
    body["data"]["id"].as_i64().unwrap()
}

fn hw1(require_file: bool) -> Value {
    json!({
        "title": "HW1",
        "description": "Write an essay",
        "dueDate": due_in(7),
        "maxPoints": 100,
        "requireFileUpload": require_file,
    })
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File {
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn submission_request(token: &str, parts: &[Part<'_>]) -> Request {
    test::TestRequest::post()
        .uri("/api/submissions")
        .insert_header(bearer(token))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(parts))
        .to_request()
}

fn essay_submission(token: &str, assignment_id: i64) -> Request {
    let id = assignment_id.to_string();
    submission_request(
        token,
        &[
            Part::Text("assignmentId", &id),
            Part::Text("notes", "first draft"),
            Part::File {
                filename: "essay.pdf",
                content_type: "application/pdf",
                data: PDF,
            },
        ],
    )
}

fn get(uri: &str, token: &str) -> Request {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(bearer(token))
        .to_request()
}

fn grade_request(token: &str, submission_id: i64, body: Value) -> Request {
    test::TestRequest::put()
        .uri(&format!("/api/submissions/{submission_id}/grade"))
        .insert_header(bearer(token))
        .set_json(body)
        .to_request()
}

#[actix_web::test]
async fn test_health_without_auth() {
    let env = setup().await;
    let app = init_app!(env);

    let req = test::TestRequest::get().uri("/api/system/health").to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["systemName"], "Assignment Tracker");
}

#[actix_web::test]
async fn test_register_login_and_me() {
    let env = setup().await;
    let app = init_app!(env);

    let (token, id) = register(&app, "t@x.com", "teacher").await;

    // 重复邮箱
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "email": "t@x.com",
            "password": "another1",
            "firstName": "Other",
            "lastName": "Person",
            "role": "student",
        }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3002);

    // 密码错误
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "t@x.com", "password": "wrong-password"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2000);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "t@x.com", "password": "secret123"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["role"], "teacher");
    assert!(body["data"]["expiresIn"].as_i64().unwrap() > 0);
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let (status, body) = send(&app, get("/api/auth/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["email"], "t@x.com");
}

#[actix_web::test]
async fn test_register_rejects_invalid_input() {
    let env = setup().await;
    let app = init_app!(env);

    let cases = [
        (json!({"email": "not-an-email", "password": "secret123", "firstName": "A", "lastName": "B", "role": "student"}), 3001),
        (json!({"email": "a@x.com", "password": "123", "firstName": "A", "lastName": "B", "role": "student"}), 3003),
        (json!({"email": "a@x.com", "password": "secret123", "firstName": " ", "lastName": "B", "role": "student"}), 3004),
        (json!({"email": "a@x.com", "password": "secret123", "firstName": "A", "lastName": "B", "role": "admin"}), 1000),
    ];

    for (payload, code) in cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(payload)
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["code"], code, "{body}");
    }
}

#[actix_web::test]
async fn test_me_token_failures() {
    let env = setup().await;
    let app = init_app!(env);

    // 缺少令牌
    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    // 无法解析的令牌
    let (status, body) = send(&app, get("/api/auth/me", "garbage.token.value")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2001);

    let ghost = User {
        id: 9999,
        email: "ghost@x.com".to_string(),
        password_hash: String::new(),
        first_name: "Ghost".to_string(),
        last_name: "User".to_string(),
        role: Role::Student,
        created_at: Utc::now(),
    };

    // 已过期
    let expired =
        JwtUtils::generate_token_with_expiry(&ghost, &env.ctx.config.jwt, Duration::hours(-1))
            .unwrap();
    let (status, body) = send(&app, get("/api/auth/me", &expired)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2001);

    // 签名有效但账户不存在
    let valid = JwtUtils::generate_token(&ghost, &env.ctx.config.jwt).unwrap();
    let (status, body) = send(&app, get("/api/auth/me", &valid)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3000);
}

#[actix_web::test]
async fn test_full_submission_and_grading_flow() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, student_id) = register(&app, "s@x.com", "student").await;

    let assignment_id = create_assignment(&app, &teacher, hw1(true)).await;

    // 学生能看到作业
    let (status, body) = send(&app, get("/api/assignments", &student)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "HW1");

    let (status, body) = send(&app, essay_submission(&student, assignment_id)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let submission_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["studentId"], student_id);
    assert_eq!(body["data"]["notes"], "first draft");
    assert!(body["data"]["grade"].is_null());
    let file = &body["data"]["files"][0];
    assert_eq!(file["originalName"], "essay.pdf");
    assert_eq!(file["contentType"], "application/pdf");
    assert_eq!(file["size"], PDF.len());
    let stored_name = file["storedName"].as_str().unwrap().to_string();
    assert!(stored_name.ends_with(".pdf"));
    assert!(env.upload_dir().join(&stored_name).is_file());

    let (status, body) = send(&app, get("/api/my-submissions", &student)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["assignment"]["title"], "HW1");

    let uri = format!("/api/assignments/{assignment_id}/submissions");
    let (status, body) = send(&app, get(&uri, &teacher)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["student"]["email"], "s@x.com");
    assert_eq!(body["data"][0]["id"], submission_id);

    let (_, body) = send(&app, get("/api/stats", &student)).await;
    assert_eq!(
        body["data"],
        json!({"activeAssignments": 0, "completedAssignments": 1, "pendingGrading": 1})
    );
    let (_, body) = send(&app, get("/api/stats", &teacher)).await;
    assert_eq!(
        body["data"],
        json!({"totalAssignments": 1, "totalSubmissions": 1, "pendingReviews": 1})
    );

    let (status, body) = send(
        &app,
        grade_request(&teacher, submission_id, json!({"grade": 95, "feedback": "Great work"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["grade"], 95);
    assert_eq!(body["data"]["feedback"], "Great work");
    assert!(body["data"]["gradedAt"].is_string());

    let (_, body) = send(&app, get("/api/stats", &teacher)).await;
    assert_eq!(body["data"]["pendingReviews"], 0);
    let (_, body) = send(&app, get("/api/stats", &student)).await;
    assert_eq!(body["data"]["pendingGrading"], 0);

    let (_, body) = send(&app, get("/api/my-submissions", &student)).await;
    assert_eq!(body["data"][0]["grade"], 95);

    // 下载原文件
    let resp = test::call_service(
        &app,
        get(&format!("/api/files/{stored_name}"), &teacher),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = test::read_body(resp).await;
    assert_eq!(&bytes[..], PDF);
}

#[actix_web::test]
async fn test_duplicate_submission_rejected() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let assignment_id = create_assignment(&app, &teacher, hw1(true)).await;

    let (status, _) = send(&app, essay_submission(&student, assignment_id)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, essay_submission(&student, assignment_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5001);

    let (_, body) = send(&app, get("/api/my-submissions", &student)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    // 被拒绝的上传不留在磁盘上
    assert_eq!(env.stored_file_count(), 1);
}

#[actix_web::test]
async fn test_concurrent_submissions_accept_exactly_one() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let assignment_id = create_assignment(&app, &teacher, hw1(true)).await;

    let results = join_all(
        (0..5).map(|_| send(&app, essay_submission(&student, assignment_id))),
    )
    .await;

    let accepted = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::OK)
        .count();
    assert_eq!(accepted, 1);
    for (status, body) in results.iter().filter(|(s, _)| *s != StatusCode::OK) {
        assert_eq!(*status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 5001);
    }

    let uri = format!("/api/assignments/{assignment_id}/submissions");
    let (_, body) = send(&app, get(&uri, &teacher)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(env.stored_file_count(), 1);
}

#[actix_web::test]
async fn test_file_requirement() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let required = create_assignment(&app, &teacher, hw1(true)).await;
    let optional = create_assignment(&app, &teacher, hw1(false)).await;

    let id = required.to_string();
    let (status, body) = send(
        &app,
        submission_request(&student, &[Part::Text("assignmentId", &id)]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5003);

    let id = optional.to_string();
    let (status, body) = send(
        &app,
        submission_request(
            &student,
            &[Part::Text("assignmentId", &id), Part::Text("notes", "link in notes")],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["files"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_file_requirement_can_be_disabled() {
    let env = setup_with(|c| c.policy.enforce_file_requirement = false).await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let id = create_assignment(&app, &teacher, hw1(true)).await.to_string();

    let (status, _) = send(
        &app,
        submission_request(&student, &[Part::Text("assignmentId", &id)]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_upload_type_checks() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let id = create_assignment(&app, &teacher, hw1(true)).await.to_string();

    // 不在白名单中
    let (status, body) = send(
        &app,
        submission_request(
            &student,
            &[
                Part::Text("assignmentId", &id),
                Part::File {
                    filename: "photo.png",
                    content_type: "image/png",
                    data: PNG,
                },
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6001);

    // 声明为 PDF 但内容不是
    let (status, body) = send(
        &app,
        submission_request(
            &student,
            &[
                Part::Text("assignmentId", &id),
                Part::File {
                    filename: "fake.pdf",
                    content_type: "application/pdf",
                    data: b"just some text pretending",
                },
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6001);

    // 第二个文件不合法时第一个也要清理
    let (status, _) = send(
        &app,
        submission_request(
            &student,
            &[
                Part::Text("assignmentId", &id),
                Part::File {
                    filename: "essay.pdf",
                    content_type: "application/pdf",
                    data: PDF,
                },
                Part::File {
                    filename: "photo.png",
                    content_type: "image/png",
                    data: PNG,
                },
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, get("/api/my-submissions", &student)).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(env.stored_file_count(), 0);
}

#[actix_web::test]
async fn test_oversize_upload_rejected() {
    let env = setup_with(|c| c.upload.max_size = 16).await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let assignment_id = create_assignment(&app, &teacher, hw1(true)).await;

    assert!(PDF.len() > 16);
    let (status, body) = send(&app, essay_submission(&student, assignment_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6002);
    assert_eq!(env.stored_file_count(), 0);
}

#[actix_web::test]
async fn test_submit_to_unknown_or_missing_assignment() {
    let env = setup().await;
    let app = init_app!(env);

    let (student, _) = register(&app, "s@x.com", "student").await;

    let (status, body) = send(&app, essay_submission(&student, 424242)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4000);

    let (status, body) = send(
        &app,
        submission_request(&student, &[Part::Text("notes", "no id")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);

    let (status, _) = send(
        &app,
        submission_request(&student, &[Part::Text("assignmentId", "abc")]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(env.stored_file_count(), 0);
}

#[actix_web::test]
async fn test_due_date_enforcement() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;

    let closed = create_assignment(
        &app,
        &teacher,
        json!({
            "title": "Closed",
            "description": "",
            "dueDate": due_in(-1),
            "maxPoints": 10,
        }),
    )
    .await;
    let late_ok = create_assignment(
        &app,
        &teacher,
        json!({
            "title": "Late OK",
            "description": "",
            "dueDate": due_in(-1),
            "maxPoints": 10,
            "allowLateSubmissions": true,
        }),
    )
    .await;

    let (status, body) = send(&app, essay_submission(&student, closed)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5002);

    let (status, _) = send(&app, essay_submission(&student, late_ok)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(env.stored_file_count(), 1);
}

#[actix_web::test]
async fn test_due_date_check_can_be_disabled() {
    let env = setup_with(|c| c.policy.enforce_due_date = false).await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let closed = create_assignment(
        &app,
        &teacher,
        json!({
            "title": "Closed",
            "description": "",
            "dueDate": due_in(-1),
            "maxPoints": 10,
        }),
    )
    .await;

    let (status, _) = send(&app, essay_submission(&student, closed)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_due_date_keeps_milliseconds() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let assignment_id = create_assignment(
        &app,
        &teacher,
        json!({
            "title": "Timed",
            "description": "",
            "dueDate": "2030-01-01T00:00:00.750Z",
            "maxPoints": 10,
        }),
    )
    .await;
    let uri = format!("/api/assignments/{assignment_id}");

    let (status, body) = send(&app, get(&uri, &teacher)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse_time(&body["data"]["dueDate"]),
        parse_time(&json!("2030-01-01T00:00:00.750Z"))
    );

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&teacher))
        .set_json(json!({"dueDate": "2031-06-30T12:00:00.125+02:00"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse_time(&body["data"]["dueDate"]),
        parse_time(&json!("2031-06-30T10:00:00.125Z"))
    );
}

#[actix_web::test]
async fn test_grading_rules() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let assignment_id = create_assignment(&app, &teacher, hw1(true)).await;
    let (_, body) = send(&app, essay_submission(&student, assignment_id)).await;
    let submission_id = body["data"]["id"].as_i64().unwrap();

    // 允许超过满分
    let (status, body) = send(
        &app,
        grade_request(&teacher, submission_id, json!({"grade": 150})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Submission graded successfully");
    assert_eq!(body["data"]["grade"], 150);
    assert!(body["data"]["feedback"].is_null());

    let (status, body) = send(
        &app,
        grade_request(&teacher, submission_id, json!({"grade": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5004);

    // 重新评分覆盖旧值
    let (status, body) = send(
        &app,
        grade_request(&teacher, submission_id, json!({"grade": 80, "feedback": "revised"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Submission re-graded successfully");
    assert_eq!(body["data"]["grade"], 80);
    assert_eq!(body["data"]["feedback"], "revised");

    let (status, body) = send(
        &app,
        grade_request(&teacher, 777_777, json!({"grade": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 5000);
}

#[actix_web::test]
async fn test_concurrent_grading_is_consistent() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let assignment_id = create_assignment(&app, &teacher, hw1(true)).await;
    let (_, body) = send(&app, essay_submission(&student, assignment_id)).await;
    let submission_id = body["data"]["id"].as_i64().unwrap();

    let results = join_all([
        send(
            &app,
            grade_request(&teacher, submission_id, json!({"grade": 70, "feedback": "seventy"})),
        ),
        send(
            &app,
            grade_request(&teacher, submission_id, json!({"grade": 90, "feedback": "ninety"})),
        ),
    ])
    .await;
    assert!(results.iter().all(|(status, _)| *status == StatusCode::OK));

    let uri = format!("/api/assignments/{assignment_id}/submissions");
    let (_, body) = send(&app, get(&uri, &teacher)).await;
    let graded = &body["data"][0];
    // 分数和评语来自同一次评分
    match graded["grade"].as_i64() {
        Some(70) => assert_eq!(graded["feedback"], "seventy"),
        Some(90) => assert_eq!(graded["feedback"], "ninety"),
        other => panic!("unexpected grade {other:?}"),
    }
}

#[actix_web::test]
async fn test_role_enforcement() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let assignment_id = create_assignment(&app, &teacher, hw1(true)).await;

    // 学生不能创建作业
    let req = test::TestRequest::post()
        .uri("/api/assignments")
        .insert_header(bearer(&student))
        .set_json(hw1(true))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 1003);

    // 教师不能提交
    let (status, _) = send(&app, essay_submission(&teacher, assignment_id)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, get("/api/my-submissions", &teacher)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/assignments/{assignment_id}/submissions");
    let (status, _) = send(&app, get(&uri, &student)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, grade_request(&student, 1, json!({"grade": 100}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/assignments/{assignment_id}"))
        .insert_header(bearer(&student))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // 状态未改变
    let (_, body) = send(&app, get("/api/assignments", &teacher)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(env.stored_file_count(), 0);

    // 未登录
    let req = test::TestRequest::get().uri("/api/assignments").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);
}

#[actix_web::test]
async fn test_only_owner_manages_assignment() {
    let env = setup().await;
    let app = init_app!(env);

    let (owner, _) = register(&app, "owner@x.com", "teacher").await;
    let (other, _) = register(&app, "other@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let assignment_id = create_assignment(&app, &owner, hw1(true)).await;
    let (_, body) = send(&app, essay_submission(&student, assignment_id)).await;
    let submission_id = body["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/assignments/{assignment_id}");

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&other))
        .set_json(json!({"title": "Hijacked"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 4002);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&other))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 4002);

    let (status, _) = send(&app, get(&format!("{uri}/submissions"), &other)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, grade_request(&other, submission_id, json!({"grade": 1}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 4002);

    // 其他教师的列表里看不到
    let (_, body) = send(&app, get("/api/assignments", &other)).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, get(&uri, &owner)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "HW1");
    let (_, body) = send(&app, get(&format!("{uri}/submissions"), &owner)).await;
    assert!(body["data"][0]["grade"].is_null());
}

#[actix_web::test]
async fn test_update_and_delete_assignment() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (student, _) = register(&app, "s@x.com", "student").await;
    let assignment_id = create_assignment(&app, &teacher, hw1(true)).await;
    let uri = format!("/api/assignments/{assignment_id}");

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&teacher))
        .set_json(json!({"title": "HW1 (revised)", "allowLateSubmissions": true}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "HW1 (revised)");
    assert_eq!(body["data"]["allowLateSubmissions"], true);
    assert_eq!(body["data"]["maxPoints"], 100);
    assert_eq!(body["data"]["description"], "Write an essay");

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&teacher))
        .set_json(json!({"maxPoints": 0}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4001);

    let (status, _) = send(&app, essay_submission(&student, assignment_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(env.stored_file_count(), 1);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&teacher))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);

    // 作业、提交和文件一并删除
    let (status, body) = send(&app, get(&uri, &teacher)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4000);
    let (_, body) = send(&app, get("/api/my-submissions", &student)).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(env.stored_file_count(), 0);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&teacher))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_stats_across_assignments() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;
    let (idle_teacher, _) = register(&app, "idle@x.com", "teacher").await;
    let (alice, _) = register(&app, "alice@x.com", "student").await;
    let (bob, _) = register(&app, "bob@x.com", "student").await;

    let first = create_assignment(&app, &teacher, hw1(true)).await;
    let second = create_assignment(&app, &teacher, hw1(true)).await;

    let (_, body) = send(&app, essay_submission(&alice, first)).await;
    let graded_id = body["data"]["id"].as_i64().unwrap();
    send(&app, essay_submission(&alice, second)).await;
    send(&app, essay_submission(&bob, first)).await;

    let (status, _) = send(&app, grade_request(&teacher, graded_id, json!({"grade": 88}))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/api/stats", &teacher)).await;
    assert_eq!(
        body["data"],
        json!({"totalAssignments": 2, "totalSubmissions": 3, "pendingReviews": 2})
    );

    let (_, body) = send(&app, get("/api/stats", &idle_teacher)).await;
    assert_eq!(
        body["data"],
        json!({"totalAssignments": 0, "totalSubmissions": 0, "pendingReviews": 0})
    );

    let (_, body) = send(&app, get("/api/stats", &alice)).await;
    assert_eq!(
        body["data"],
        json!({"activeAssignments": 0, "completedAssignments": 2, "pendingGrading": 1})
    );

    let (_, body) = send(&app, get("/api/stats", &bob)).await;
    assert_eq!(
        body["data"],
        json!({"activeAssignments": 1, "completedAssignments": 1, "pendingGrading": 1})
    );
}

#[actix_web::test]
async fn test_file_download_errors() {
    let env = setup().await;
    let app = init_app!(env);

    let (student, _) = register(&app, "s@x.com", "student").await;

    let (status, body) = send(&app, get("/api/files/1700000000-missing.pdf", &student)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6000);

    let (status, body) = send(&app, get("/api/files/..secret", &student)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6004);

    let req = test::TestRequest::get()
        .uri("/api/files/1700000000-missing.pdf")
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_malformed_parameters() {
    let env = setup().await;
    let app = init_app!(env);

    let (teacher, _) = register(&app, "t@x.com", "teacher").await;

    let req = test::TestRequest::post()
        .uri("/api/assignments")
        .insert_header(bearer(&teacher))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);

    let (status, body) = send(&app, get("/api/assignments/not-a-number", &teacher)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);

    let mut invalid = hw1(true);
    invalid["maxPoints"] = json!(0);
    let req = test::TestRequest::post()
        .uri("/api/assignments")
        .insert_header(bearer(&teacher))
        .set_json(invalid)
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4001);
}
