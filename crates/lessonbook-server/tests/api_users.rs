mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::TestApp;
use serde_json::{json, Value};

fn join_body(id: &str, pw: &str, pw_con: &str) -> Value {
    json!({ "name": "Lee", "phone": "010-1234", "id": id, "pw": pw, "pwCon": pw_con })
}

#[tokio::test]
async fn join_then_login() {
    let app = TestApp::new();

    let (status, body) = app.post("/api/user/join", join_body("tutor", "s3cret", "s3cret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Data saved successfully");

    let (status, body) = app
        .post("/api/user/login", json!({ "id": "tutor", "pw": "s3cret" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"], "tutor");
    assert_eq!(body["user"]["name"], "Lee");
    assert!(body["user"].get("pwHash").is_none());
    assert!(body["user"].get("pw").is_none());

    let conn = app.pool.get().unwrap();
    let stored: String = conn
        .query_row("SELECT pw_hash FROM users WHERE id = 'tutor'", [], |row| row.get(0))
        .unwrap();
    assert_ne!(stored, "s3cret");
    let logins: i64 = conn
        .query_row("SELECT COUNT(*) FROM logins WHERE id = 'tutor'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(logins, 1);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.post("/api/user/join", join_body("a", "right", "right")).await;

    let (status, body) = app
        .post("/api/user/login", json!({ "id": "a", "pw": "wrong" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid credentials" }));

    let (status, body) = app
        .post("/api/user/login", json!({ "id": "nobody", "pw": "right" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid credentials" }));
}

#[tokio::test]
async fn check_reports_taken_ids() {
    let app = TestApp::new();
    let (status, body) = app.post("/api/user/check", json!({ "id": "tutor" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "exists": false }));

    app.post("/api/user/join", join_body("tutor", "pw", "pw")).await;
    let (_, body) = app.post("/api/user/check", json!({ "id": "tutor" })).await;
    assert_eq!(body, json!({ "exists": true }));
}

#[tokio::test]
async fn duplicate_join_conflicts() {
    let app = TestApp::new();
    app.post("/api/user/join", join_body("tutor", "pw", "pw")).await;

    let (status, body) = app.post("/api/user/join", join_body("tutor", "pw2", "pw2")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "User id already exists" }));
}

#[tokio::test]
async fn mismatched_confirmation_is_rejected() {
    let app = TestApp::new();
    let (status, _) = app.post("/api/user/join", join_body("tutor", "pw", "pw-typo")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.post("/api/user/check", json!({ "id": "tutor" })).await;
    assert_eq!(body, json!({ "exists": false }));
}

#[tokio::test]
async fn logout_clears_login_row_from_cookie() {
    let app = TestApp::new();
    app.post("/api/user/join", join_body("tutor", "pw", "pw")).await;
    app.post("/api/user/login", json!({ "id": "tutor", "pw": "pw" })).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/user/logout")
        .header(header::COOKIE, "user=j%3A%7B%22id%22%3A%22tutor%22%7D")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    let conn = app.pool.get().unwrap();
    let logins: i64 = conn
        .query_row("SELECT COUNT(*) FROM logins WHERE id = 'tutor'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(logins, 0);
}

#[tokio::test]
async fn logout_handles_percent_sign_in_id() {
    let app = TestApp::new();
    app.post("/api/user/join", join_body("100%", "pw", "pw")).await;
    let (status, _) = app
        .post("/api/user/login", json!({ "id": "100%", "pw": "pw" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Express encoding of j:{"id":"100%"}
    let request = Request::builder()
        .method("POST")
        .uri("/api/user/logout")
        .header(header::COOKIE, "user=j%3A%7B%22id%22%3A%22100%25%22%7D")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    let conn = app.pool.get().unwrap();
    let logins: i64 = conn
        .query_row("SELECT COUNT(*) FROM logins WHERE id = '100%'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(logins, 0);
}

#[tokio::test]
async fn logout_without_cookie_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.send("POST", "/api/user/logout", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing user cookie" }));
}
