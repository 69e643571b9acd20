#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use lessonbook_server::{create_router, db, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub pool: db::DbPool,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("lessonbook.db");
        let sqlite_path = path.to_str().expect("temp path is utf-8").to_string();

        let pool = db::create_pool(&sqlite_path, 4, 5_000).expect("failed to create pool");
        let router = create_router(AppState { db: pool.clone() });

        Self {
            router,
            pool,
            _dir: dir,
        }
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.dispatch(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, None).await
    }

    /// Inserts a lesson row with an explicit timestamp.
    pub fn seed_lesson(&self, user_id: &str, name: &str, day: &str) {
        let conn = self.pool.get().unwrap();
        conn.execute(
            "INSERT INTO lesson_records (user_id, name, phone, lesson_day) VALUES (?1, ?2, '010', ?3)",
            rusqlite::params![user_id, name, day],
        )
        .unwrap();
    }

    pub fn seed_payment(&self, user_id: &str, name: &str, pay: i64, day: &str) {
        let conn = self.pool.get().unwrap();
        conn.execute(
            "INSERT INTO payments (user_id, name, pay, pay_day) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user_id, name, pay, day],
        )
        .unwrap();
    }

    pub async fn register(&self, user_id: &str, name: &str, lesson: i64) {
        let (status, _) = self
            .post(
                "/api/member",
                serde_json::json!({ "userId": user_id, "name": name, "phone": "010", "lesson": lesson }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    pub async fn balance(&self, user_id: &str, name: &str) -> i64 {
        let (status, body) = self
            .get(&format!("/api/member/detail/{name}?userId={user_id}"))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["lesson"].as_i64().expect("member should exist")
    }
}
