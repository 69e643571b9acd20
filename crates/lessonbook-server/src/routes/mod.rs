mod lessons;
mod members;
mod payments;
mod posts;
mod users;

use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;

use crate::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub(crate) fn message(text: &'static str) -> Json<MessageResponse> {
    Json(MessageResponse { message: text })
}

async fn health() -> &'static str {
    "ok"
}

pub fn create_router(state: AppState) -> Router {
    let ledger_routes = Router::new()
        // Members
        .route("/api/member", get(members::list).post(members::register))
        .route(
            "/api/member/{name}",
            put(members::set_balance).delete(members::remove),
        )
        .route("/api/member/charge/{name}", put(members::charge))
        .route("/api/member/cancel/{name}", put(members::cancel))
        .route("/api/member/detail/{name}", get(members::detail))
        .route("/api/member/complete/{name}", post(members::complete))
        .route("/api/member/uncomplete/{name}", post(members::uncomplete))
        // Lesson log
        .route("/api/lessonList", post(lessons::log))
        .route(
            "/api/lessonList/today",
            get(lessons::names_on).delete(lessons::undo_last_for_today),
        )
        .route("/api/lessonList/detail/{name}", get(lessons::for_member))
        .route("/api/lessonList/{name}", delete(lessons::undo_last))
        .route("/api/lessonListmonth", get(lessons::for_month))
        // Payment log
        .route("/api/payList", post(payments::record))
        .route("/api/payList/detail/{name}", get(payments::for_member))
        .route("/api/payListmonth", get(payments::for_month));

    let post_routes = Router::new()
        .route("/api/newsList", get(posts::list))
        .route("/api/posts/{post_id}", get(posts::get))
        .route("/api/write", post(posts::create))
        .route("/api/update/{post_id}", put(posts::update))
        .route("/api/delete/{post_id}", delete(posts::delete));

    let user_routes = Router::new()
        .route("/api/user/join", post(users::join))
        .route("/api/user/check", post(users::check_id))
        .route("/api/user/login", post(users::login))
        .route("/api/user/logout", post(users::logout));

    Router::new()
        .route("/health", get(health))
        .merge(ledger_routes)
        .merge(post_routes)
        .merge(user_routes)
        .with_state(state)
}
