//! Login bookkeeping. A row in `logins` marks a user as signed in; the
//! `user` cookie set by the front end names which row logout should clear.

use rusqlite::Connection;

use crate::error::AppResult;

pub const USER_COOKIE: &str = "user";

pub fn record_login(conn: &Connection, user_id: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO logins (id) VALUES (?1)
         ON CONFLICT(id) DO UPDATE SET logged_in_at = datetime('now', 'localtime')",
        rusqlite::params![user_id],
    )?;
    Ok(())
}

/// Returns the number of rows removed (0 or 1).
pub fn delete_login(conn: &Connection, user_id: &str) -> AppResult<usize> {
    let removed = conn.execute("DELETE FROM logins WHERE id = ?1", rusqlite::params![user_id])?;
    Ok(removed)
}

/// Extracts the user id from a `user` cookie value as the cookie jar hands
/// it out (already percent-decoded).
///
/// Accepts a bare id, a JSON object with an `id` field, or the `j:`-prefixed
/// JSON form Express' cookie-parser writes.
pub fn user_id_from_cookie(value: &str) -> Option<String> {
    let value = value.trim();
    let json = value.strip_prefix("j:").unwrap_or(value);

    if json.starts_with('{') {
        let parsed: serde_json::Value = serde_json::from_str(json).ok()?;
        return parsed
            .get("id")
            .and_then(|id| id.as_str())
            .filter(|id| !id.is_empty())
            .map(str::to_string);
    }

    (!value.is_empty()).then(|| value.to_string())
}
