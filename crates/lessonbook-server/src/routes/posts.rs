use axum::{extract::State, Json};
use rusqlite::OptionalExtension;
use serde::Deserialize;

use crate::db::with_conn;
use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::models::Post;
use crate::routes::{message, AppState, MessageResponse};

const POST_COLS: &str = "post_id, id, title, content, created_at";

/// Body for both create and full replacement.
#[derive(Debug, Deserialize)]
pub struct PostBody {
    pub id: String,
    pub title: String,
    pub content: String,
}

fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<Post> {
    Ok(Post {
        post_id: row.get(0)?,
        id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// GET /api/newsList
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Post>>> {
    let posts = with_conn(&state.db, |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {POST_COLS} FROM posts ORDER BY post_id DESC"
        ))?;
        let rows = stmt.query_map([], row_to_post)?;
        let posts: Result<Vec<_>, _> = rows.collect();
        Ok(posts?)
    })
    .await?;
    Ok(Json(posts))
}

/// GET /api/posts/{postId}
pub async fn get(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i64>,
) -> AppResult<Json<Post>> {
    let post = with_conn(&state.db, move |conn| {
        let post = conn
            .query_row(
                &format!("SELECT {POST_COLS} FROM posts WHERE post_id = ?1"),
                rusqlite::params![post_id],
                row_to_post,
            )
            .optional()?;
        Ok(post)
    })
    .await?
    .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
    Ok(Json(post))
}

/// POST /api/write
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PostBody>,
) -> AppResult<Json<MessageResponse>> {
    let author = body.id.clone();
    let post_id = with_conn(&state.db, move |conn| {
        conn.execute(
            "INSERT INTO posts (id, title, content) VALUES (?1, ?2, ?3)",
            rusqlite::params![body.id, body.title, body.content],
        )?;
        Ok(conn.last_insert_rowid())
    })
    .await?;

    tracing::info!(post_id, %author, "Post saved");
    Ok(message("Post saved successfully"))
}

/// PUT /api/update/{postId}
///
/// Replaces author, title and content. Updating a missing post is not an error.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i64>,
    ApiJson(body): ApiJson<PostBody>,
) -> AppResult<Json<MessageResponse>> {
    let affected = with_conn(&state.db, move |conn| {
        let affected = conn.execute(
            "UPDATE posts SET id = ?1, title = ?2, content = ?3 WHERE post_id = ?4",
            rusqlite::params![body.id, body.title, body.content, post_id],
        )?;
        Ok(affected)
    })
    .await?;

    tracing::info!(post_id, affected, "Post updated");
    Ok(message("Post updated successfully"))
}

/// DELETE /api/delete/{postId}
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i64>,
) -> AppResult<Json<MessageResponse>> {
    let affected = with_conn(&state.db, move |conn| {
        let affected = conn.execute(
            "DELETE FROM posts WHERE post_id = ?1",
            rusqlite::params![post_id],
        )?;
        Ok(affected)
    })
    .await?;

    tracing::info!(post_id, affected, "Post deleted");
    Ok(message("Post deleted successfully"))
}
