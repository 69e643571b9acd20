use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use crate::auth::{password, session};
use crate::db::with_conn;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::models::{User, UserPublic};
use crate::routes::{message, AppState, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub name: String,
    pub phone: String,
    pub id: String,
    pub pw: String,
    #[serde(rename = "pwCon")]
    pub pw_con: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckIdRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct CheckIdResponse {
    pub exists: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub id: String,
    pub pw: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: UserPublic,
}

fn user_exists(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        rusqlite::params![id],
        |row| row.get(0),
    )
}

/// POST /api/user/join
pub async fn join(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<JoinRequest>,
) -> AppResult<Json<MessageResponse>> {
    if body.id.is_empty() {
        return Err(AppError::BadRequest("id is required".into()));
    }
    if body.pw.is_empty() {
        return Err(AppError::BadRequest("pw is required".into()));
    }
    if body.pw != body.pw_con {
        return Err(AppError::BadRequest("Password confirmation does not match".into()));
    }

    let id = body.id.clone();
    with_conn(&state.db, move |conn| {
        if user_exists(conn, &body.id)? {
            return Err(AppError::Conflict("User id already exists".into()));
        }

        let pw_hash = password::hash_password(&body.pw)?;
        let result = conn.execute(
            "INSERT INTO users (id, pw_hash, name, phone) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![body.id, pw_hash, body.name, body.phone],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(AppError::Conflict("User id already exists".into()))
            }
            Err(e) => Err(AppError::Database(e)),
        }
    })
    .await?;

    tracing::info!(%id, "User registered");
    Ok(message("Data saved successfully"))
}

/// POST /api/user/check
pub async fn check_id(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CheckIdRequest>,
) -> AppResult<Json<CheckIdResponse>> {
    let exists = with_conn(&state.db, move |conn| Ok(user_exists(conn, &body.id)?)).await?;
    Ok(Json(CheckIdResponse { exists }))
}

/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = with_conn(&state.db, move |conn| {
        let user = conn
            .query_row(
                "SELECT id, pw_hash, name, phone, created_at FROM users WHERE id = ?1",
                rusqlite::params![body.id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        pw_hash: row.get(1)?,
                        name: row.get(2)?,
                        phone: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

        if !password::verify_password(&body.pw, &user.pw_hash)? {
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }

        session::record_login(conn, &user.id)?;
        Ok(user)
    })
    .await?;

    tracing::info!(id = %user.id, "User logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        user: user.into(),
    }))
}

/// POST /api/user/logout
///
/// The `user` cookie is written by the front end after login; it is trusted
/// as-is to name the login row to clear.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let user_id = jar
        .get(session::USER_COOKIE)
        .and_then(|c| session::user_id_from_cookie(c.value()))
        .ok_or_else(|| AppError::BadRequest("Missing user cookie".into()))?;

    let id = user_id.clone();
    let removed = with_conn(&state.db, move |conn| session::delete_login(conn, &id)).await?;

    tracing::info!(%user_id, removed, "Login info deleted");

    let removal = Cookie::build(session::USER_COOKIE)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();

    Ok((jar.add(removal), message("Logout successful")))
}
