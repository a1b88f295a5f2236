//! Integration tests for lcm-admin API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Subject/level/lesson CRUD through the router
//! - Lesson save keeping homework result and deadline
//! - Reordering
//! - Form resolution and announcement generation
//! - Sheet-based save endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use lcm_admin::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over a fresh in-memory database (auth disabled)
async fn setup_app() -> Router {
    // Single connection: every connection to :memory: is a separate database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    lcm_common::db::create_documents_table(&pool).await.unwrap();

    build_router(AppState::from_pool(pool, None))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: send a request and return status + JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// ENG with levels A1, A2, B1; A1 has lessons 1 and 2
async fn seed(app: &Router) {
    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/api/subjects",
            json!({"subject_code": "eng", "subject_name": "English"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    for level in ["A1", "A2", "B1"] {
        let (status, _) = send(
            app,
            json_request("POST", "/api/subjects/ENG/levels", json!({"level_code": level})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    for _ in 0..2 {
        let (status, _) = send(
            app,
            json_request("POST", "/api/subjects/ENG/levels/A1/lessons", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let (status, body) = send(&app, empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "lcm-admin");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_catalog_reflects_created_hierarchy() {
    let app = setup_app().await;
    seed(&app).await;

    let (status, body) = send(&app, empty_request("GET", "/api/catalog")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let subjects = body["subjects"].as_array().unwrap();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0]["code"], "ENG");
    assert_eq!(subjects[0]["name"], "English");

    let levels: Vec<&str> = subjects[0]["levels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["code"].as_str().unwrap())
        .collect();
    assert_eq!(levels, vec!["A1", "A2", "B1"]);

    assert_eq!(body["subject_names"]["ENG"], "English");
    assert!(body["data"]["ENG"]["A1"]["lesson_2"].is_object());
}

#[tokio::test]
async fn test_duplicate_subject_conflicts() {
    let app = setup_app().await;
    seed(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/subjects",
            json!({"subject_code": "ENG", "subject_name": "Again"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_create_level_for_missing_subject() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/subjects/NOPE/levels", json!({"level_code": "A1"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_save_lesson_keeps_homework_and_deadline() {
    let app = setup_app().await;
    seed(&app).await;

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/subjects/ENG/levels/A1/lessons/1",
            json!({"lesson_content": "Greetings", "homework_result": "Done", "deadline": ""}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Second save must not overwrite the stored homework result
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/subjects/ENG/levels/A1/lessons/1",
            json!({"lesson_content": "Greetings v2", "homework_result": "Other", "deadline": "Friday"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lesson"]["lesson_content"], "Greetings v2");
    assert_eq!(body["lesson"]["homework_result"], "Done");
    assert_eq!(body["lesson"]["deadline"], "Friday");

    let (status, _) = send(
        &app,
        json_request("PUT", "/api/subjects/ENG/levels/A1/lessons/9", json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_subject_removes_everything() {
    let app = setup_app().await;
    seed(&app).await;
    send(
        &app,
        json_request("PUT", "/api/student-books/A1", json!({"url": "https://books/a1"})),
    )
    .await;

    let (status, _) = send(&app, empty_request("DELETE", "/api/subjects/ENG")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, empty_request("GET", "/api/catalog")).await;
    assert!(body["subjects"].as_array().unwrap().is_empty());
    assert_eq!(body["student_books"], json!({}));

    let (status, _) = send(&app, empty_request("DELETE", "/api/subjects/ENG")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lesson_create_and_delete() {
    let app = setup_app().await;
    seed(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/subjects/ENG/levels/A1/lessons",
            json!({"lesson_number": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        empty_request("DELETE", "/api/subjects/ENG/levels/A1/lessons/1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, empty_request("GET", "/api/form?subject=ENG&level=A1")).await;
    assert_eq!(body["lesson_numbers"], json!([2]));
}

#[tokio::test]
async fn test_reorder_adjacent_levels() {
    let app = setup_app().await;
    seed(&app).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/order/subjects/ENG/levels", json!({"from": 0, "to": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["updates"],
        json!([
            {"code": "A2", "display_order": 0},
            {"code": "A1", "display_order": 1}
        ])
    );

    let (_, body) = send(&app, empty_request("GET", "/api/form?subject=ENG")).await;
    assert_eq!(body["level_codes"], json!(["A2", "A1", "B1"]));

    let (status, body) = send(
        &app,
        json_request("POST", "/api/order/subjects/ENG/levels", json!({"from": 2, "to": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updates"], json!([]));

    let (status, _) = send(
        &app,
        json_request("POST", "/api/order/subjects", json!({"from": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/order/subjects", json!({"from": 0, "to": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_form_resolution() {
    let app = setup_app().await;
    seed(&app).await;
    send(
        &app,
        json_request(
            "PUT",
            "/api/subjects/ENG/levels/A1/lessons/2",
            json!({"video": "https://video/2"}),
        ),
    )
    .await;

    // Level selection picks the first lesson
    let (_, body) = send(&app, empty_request("GET", "/api/form?subject=ENG&level=A1")).await;
    assert_eq!(body["selection"]["lesson_number"], 1);

    let (_, body) = send(
        &app,
        empty_request("GET", "/api/form?subject=ENG&level=A1&lesson=2"),
    )
    .await;
    assert_eq!(body["selection"]["lesson_number"], 2);
    assert_eq!(body["form"]["video"], "https://video/2");

    // A lesson that does not exist is ignored
    let (_, body) = send(
        &app,
        empty_request("GET", "/api/form?subject=ENG&level=A1&lesson=7"),
    )
    .await;
    assert_eq!(body["selection"]["lesson_number"], 1);
}

#[tokio::test]
async fn test_generate_announcement() {
    let app = setup_app().await;
    seed(&app).await;
    send(
        &app,
        json_request(
            "PUT",
            "/api/subjects/ENG/levels/A1/lessons/2",
            json!({"lesson_content": "Past simple", "video": "https://video/2"}),
        ),
    )
    .await;
    send(
        &app,
        json_request("PUT", "/api/student-books/A1", json!({"url": "https://books/a1"})),
    )
    .await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/generate",
            json!({
                "subject": "ENG",
                "level": "A1",
                "lesson_number": 2,
                "greeting": "Hello class",
                "include": {"student_book": true, "video": false}
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["content"],
        "Hello class\n**📌 Nội dung buổi học số 2**\nPast simple\n**📚 Student Book:**\nhttps://books/a1"
    );

    let (status, _) = send(
        &app,
        json_request("POST", "/api/generate", json!({"subject": "ENG"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sheet_based_saves() {
    let app = setup_app().await;
    seed(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/save-data",
            json!({"sheet": "A1", "lesson": "lesson_1", "data": {"lesson_content": "Via sheet"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/save-student-book",
            json!({"sheet": "ENG/A1", "studentBook": "https://books/sheet"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        empty_request("GET", "/api/form?subject=ENG&level=A1&lesson=1"),
    )
    .await;
    assert_eq!(body["form"]["lesson_content"], "Via sheet");
    assert_eq!(body["student_book"], "https://books/sheet");

    let (status, _) = send(
        &app,
        json_request("POST", "/api/save-data", json!({"sheet": "A1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/save-data",
            json!({"sheet": "ENG/A1", "lesson": "lesson_5", "data": {}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_reports_recent_actions() {
    let app = setup_app().await;
    seed(&app).await;

    let (status, body) = send(&app, empty_request("GET", "/api/status")).await;
    assert_eq!(status, StatusCode::OK);

    let targets: Vec<&str> = body["statuses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["target"].as_str().unwrap())
        .collect();
    assert!(targets.contains(&"create-subject"));
    assert!(targets.contains(&"create-lesson:ENG/A1"));
    assert!(body["statuses"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["status"] == "success"));
}
