use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::db::with_conn;
use crate::error::{AppError, AppResult};
use crate::extract::{lenient_i64, ApiJson, ApiPath, ApiQuery, OwnerQuery};
use crate::models::Member;
use crate::routes::{message, AppState, MessageResponse};
use crate::services::ledger::{self, NewMember};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMemberRequest {
    pub user_id: String,
    pub name: String,
    pub phone: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub lesson: i64,
}

#[derive(Debug, Deserialize)]
pub struct LessonCountRequest {
    #[serde(deserialize_with = "lenient_i64")]
    pub lesson: i64,
}

#[derive(Debug, Serialize)]
pub struct MemberChangeResponse {
    pub message: &'static str,
    pub member: Member,
}

/// GET /api/member?userId=
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> AppResult<Json<Vec<Member>>> {
    let members = with_conn(&state.db, move |conn| {
        ledger::list_members(conn, &owner.user_id)
    })
    .await?;
    Ok(Json(members))
}

/// GET /api/member/detail/{name}?userId=
///
/// Answers `null` when nobody on the roster has that name.
pub async fn detail(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> AppResult<Json<Option<Member>>> {
    let member = with_conn(&state.db, move |conn| {
        ledger::find_member(conn, &name, &owner.user_id)
    })
    .await?;
    Ok(Json(member))
}

/// POST /api/member
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterMemberRequest>,
) -> AppResult<Json<MessageResponse>> {
    if body.user_id.is_empty() || body.name.is_empty() {
        return Err(AppError::BadRequest("userId and name are required".into()));
    }

    let member = NewMember {
        user_id: body.user_id,
        name: body.name,
        phone: body.phone,
        lesson: body.lesson,
    };
    let member = with_conn(&state.db, move |conn| {
        ledger::register_member(conn, &member)?;
        Ok(member)
    })
    .await?;

    tracing::info!(user_id = %member.user_id, name = %member.name, lesson = member.lesson, "Member registered");
    Ok(message("Data saved successfully"))
}

/// PUT /api/member/{name}?userId=
///
/// Sets the balance to the given value after a lesson. Logging the lesson
/// is a separate call to `POST /api/lessonList`.
pub async fn set_balance(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
    ApiJson(body): ApiJson<LessonCountRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = owner.user_id.clone();
    let member = name.clone();
    let affected = with_conn(&state.db, move |conn| {
        ledger::set_lesson_balance(conn, &member, &user_id, body.lesson)
    })
    .await?;

    tracing::info!(user_id = %owner.user_id, %name, lesson = body.lesson, affected, "Lesson balance set");
    Ok(message("Lesson data updated successfully"))
}

/// PUT /api/member/charge/{name}?userId=
pub async fn charge(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
    ApiJson(body): ApiJson<LessonCountRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = owner.user_id.clone();
    let member = name.clone();
    let affected = with_conn(&state.db, move |conn| {
        ledger::charge_lessons(conn, &member, &user_id, body.lesson)
    })
    .await?;

    tracing::info!(user_id = %owner.user_id, %name, delta = body.lesson, affected, "Member lesson increased");
    Ok(message("Member lesson increased successfully"))
}

/// PUT /api/member/cancel/{name}?userId=
pub async fn cancel(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = owner.user_id.clone();
    let member = name.clone();
    let affected = with_conn(&state.db, move |conn| {
        ledger::cancel_lesson(conn, &member, &user_id)
    })
    .await?;

    tracing::info!(user_id = %owner.user_id, %name, affected, "Lesson cancelled");
    Ok(message("Member lesson increased successfully"))
}

/// DELETE /api/member/{name}?userId=
pub async fn remove(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = owner.user_id.clone();
    let member = name.clone();
    let affected = with_conn(&state.db, move |conn| {
        ledger::remove_member(conn, &member, &user_id)
    })
    .await?;

    tracing::info!(user_id = %owner.user_id, %name, affected, "Member deleted");
    Ok(message("Member deleted successfully"))
}

/// POST /api/member/complete/{name}?userId=
pub async fn complete(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> AppResult<Json<MemberChangeResponse>> {
    let member = with_conn(&state.db, move |conn| {
        ledger::complete_lesson(conn, &name, &owner.user_id)
    })
    .await?;

    tracing::info!(user_id = %member.user_id, name = %member.name, lesson = member.lesson, "Lesson completed");
    Ok(Json(MemberChangeResponse {
        message: "Lesson completed successfully",
        member,
    }))
}

/// POST /api/member/uncomplete/{name}?userId=
pub async fn uncomplete(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> AppResult<Json<MemberChangeResponse>> {
    let member = with_conn(&state.db, move |conn| {
        ledger::uncomplete_lesson(conn, &name, &owner.user_id)
    })
    .await?;

    tracing::info!(user_id = %member.user_id, name = %member.name, lesson = member.lesson, "Lesson completion undone");
    Ok(Json(MemberChangeResponse {
        message: "Lesson completion undone successfully",
        member,
    }))
}
