pub(crate) mod migrations;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

use crate::error::AppResult;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("failed to create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to create database pool: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("failed to run migrations: {0}")]
    Migration(#[from] rusqlite::Error),
}

pub fn create_pool(sqlite_path: &str, max_size: u32, busy_timeout_ms: u64) -> Result<DbPool, DbError> {
    if let Some(parent) = Path::new(sqlite_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(sqlite_path)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(move |conn| {
            conn.execute_batch(&format!(
                "PRAGMA journal_mode = WAL;
                 PRAGMA busy_timeout = {busy_timeout_ms};"
            ))
        });

    let pool = Pool::builder().max_size(max_size).build(manager)?;

    let conn = pool.get()?;
    migrations::run(&conn)?;

    Ok(pool)
}

/// Runs `f` against a pooled connection on the blocking thread pool.
pub async fn with_conn<F, T>(pool: &DbPool, f: F) -> AppResult<T>
where
    F: FnOnce(&mut Connection) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut *conn)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_schema_and_is_reopenable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/ledger.db");
        let path = path.to_str().unwrap();

        let pool = create_pool(path, 2, 1_000).unwrap();
        let conn = pool.get().unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(
            tables,
            vec!["lesson_records", "logins", "members", "payments", "posts", "users"]
        );
        drop(stmt);
        drop(conn);
        drop(pool);

        // Second open runs migrations again without error.
        let pool = create_pool(path, 2, 1_000).unwrap();
        let version: i64 = pool
            .get()
            .unwrap()
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
