//! Reference DDL for the three tables the handlers expect.
//!
//! The server never runs this; provisioning the schema belongs to whoever
//! provisions the database. Tests and local setups use it to get a usable file.

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Timestamps are stored as ISO-8601 UTC text with millisecond precision.
pub const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS messages (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        text        TEXT NOT NULL,
        timestamp   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        user_name   TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_messages_timestamp
        ON messages(timestamp);

    CREATE TABLE IF NOT EXISTS profiles (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     TEXT NOT NULL UNIQUE,
        nickname    TEXT NOT NULL,
        avatar      TEXT,
        bio         TEXT,
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );

    CREATE TABLE IF NOT EXISTS news (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        content     TEXT NOT NULL,
        image_url   TEXT,
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        author_id   TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_news_created
        ON news(created_at);
";

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Create the database file at `path` (if missing) and its tables.
pub fn create_database(path: &Path) -> Result<()> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    create_tables(&conn)?;

    info!("Database schema ready at {}", path.display());
    Ok(())
}
