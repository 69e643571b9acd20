use rusqlite::Connection;

const SCHEMA: &str = include_str!("schema.sql");

/// Bumped whenever `schema.sql` gains a step that `IF NOT EXISTS` can't express.
const SCHEMA_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> rusqlite::Result<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    conn.execute_batch(SCHEMA)?;

    if current < SCHEMA_VERSION {
        tracing::info!(from = current, to = SCHEMA_VERSION, "Migrated database schema");
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    }

    Ok(())
}
