use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::db::with_conn;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery, OwnerQuery};
use crate::models::{LessonName, LessonRecord};
use crate::routes::{message, AppState, MessageResponse};
use crate::services::ledger;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLessonRequest {
    pub user_id: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthQuery {
    pub month: u32,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayQuery {
    /// `YYYY-MM-DD`
    pub date: NaiveDate,
    pub user_id: String,
}

/// POST /api/lessonList
pub async fn log(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LogLessonRequest>,
) -> AppResult<Json<MessageResponse>> {
    if body.user_id.is_empty() || body.name.is_empty() {
        return Err(AppError::BadRequest("userId and name are required".into()));
    }

    let LogLessonRequest { user_id, name, phone } = body;
    let (owner, member) = (user_id.clone(), name.clone());
    let lesson_id = with_conn(&state.db, move |conn| {
        ledger::log_lesson(conn, &owner, &member, &phone)
    })
    .await?;

    tracing::info!(%user_id, %name, lesson_id, "Lesson data saved");
    Ok(message("Lesson data saved successfully"))
}

/// DELETE /api/lessonList/{name}?userId=
pub async fn undo_last(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = owner.user_id.clone();
    let member = name.clone();
    let removed = with_conn(&state.db, move |conn| {
        ledger::undo_last_lesson(conn, &member, &user_id)
    })
    .await?;

    tracing::info!(user_id = %owner.user_id, %name, removed, "Lesson data deleted");
    Ok(message("Lesson data deleted successfully"))
}

/// DELETE /api/lessonList/today?userId=
///
/// `today` is also the static path for the day listing, which shadows the
/// `{name}` route, so a member with that name is routed here.
pub async fn undo_last_for_today(
    State(state): State<AppState>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = owner.user_id.clone();
    let removed = with_conn(&state.db, move |conn| {
        ledger::undo_last_lesson(conn, "today", &user_id)
    })
    .await?;

    tracing::info!(user_id = %owner.user_id, name = "today", removed, "Lesson data deleted");
    Ok(message("Lesson data deleted successfully"))
}

/// GET /api/lessonList/detail/{name}?userId=
pub async fn for_member(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> AppResult<Json<Vec<LessonRecord>>> {
    let lessons = with_conn(&state.db, move |conn| {
        ledger::lessons_for_member(conn, &name, &owner.user_id)
    })
    .await?;
    Ok(Json(lessons))
}

/// GET /api/lessonListmonth?month=&userId=
pub async fn for_month(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MonthQuery>,
) -> AppResult<Json<Vec<LessonRecord>>> {
    let lessons = with_conn(&state.db, move |conn| {
        ledger::lessons_for_month(conn, query.month, &query.user_id)
    })
    .await?;
    Ok(Json(lessons))
}

/// GET /api/lessonList/today?date=&userId=
pub async fn names_on(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DayQuery>,
) -> AppResult<Json<Vec<LessonName>>> {
    let names = with_conn(&state.db, move |conn| {
        ledger::lesson_names_on(conn, query.date, &query.user_id)
    })
    .await?;
    Ok(Json(names))
}
