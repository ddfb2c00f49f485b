//! One function per SQL statement. Each takes the request's connection so a
//! handler can run everything it needs on a single connection.

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{MessageRow, NewsRow, ProfileRow};

// -- Messages --

pub fn list_messages(conn: &Connection) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, text, timestamp, user_name FROM messages ORDER BY timestamp ASC, id ASC",
    )?;

    let rows = stmt
        .query_map([], message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn insert_message(conn: &Connection, text: &str, user_name: &str) -> Result<MessageRow> {
    let row = conn.query_row(
        "INSERT INTO messages (text, user_name) VALUES (?1, ?2)
         RETURNING id, text, timestamp, user_name",
        (text, user_name),
        message_from_row,
    )?;
    Ok(row)
}

/// Returns the number of rows removed; zero is not an error.
pub fn delete_message(conn: &Connection, id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM messages WHERE id = ?1", [id])?)
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get(2)?,
        user_name: row.get(3)?,
    })
}

// -- News --

// LEFT JOIN profiles so posts without a (known) author still come back.
const NEWS_SELECT: &str = "SELECT n.id, n.title, n.content, n.image_url, n.created_at, n.author_id,
        p.nickname, p.avatar
     FROM news n
     LEFT JOIN profiles p ON n.author_id = p.user_id";

pub fn list_news(conn: &Connection) -> Result<Vec<NewsRow>> {
    let mut stmt = conn.prepare(&format!("{NEWS_SELECT} ORDER BY n.created_at DESC, n.id DESC"))?;

    let rows = stmt
        .query_map([], news_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn get_news(conn: &Connection, id: i64) -> Result<Option<NewsRow>> {
    let row = conn
        .query_row(&format!("{NEWS_SELECT} WHERE n.id = ?1"), [id], news_from_row)
        .optional()?;
    Ok(row)
}

/// Insert a post and read it back through the author join.
///
/// Both statements share one transaction, so a concurrent delete cannot
/// slip in between the insert and the read.
pub fn insert_news(
    conn: &Connection,
    title: &str,
    content: &str,
    image_url: Option<&str>,
    author_id: Option<&str>,
) -> Result<NewsRow> {
    let tx = conn.unchecked_transaction()?;

    let id: i64 = tx.query_row(
        "INSERT INTO news (title, content, image_url, author_id) VALUES (?1, ?2, ?3, ?4)
         RETURNING id",
        rusqlite::params![title, content, image_url, author_id],
        |row| row.get(0),
    )?;
    let row = tx.query_row(&format!("{NEWS_SELECT} WHERE n.id = ?1"), [id], news_from_row)?;

    tx.commit()?;
    Ok(row)
}

pub fn delete_news(conn: &Connection, id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM news WHERE id = ?1", [id])?)
}

fn news_from_row(row: &Row<'_>) -> rusqlite::Result<NewsRow> {
    Ok(NewsRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        image_url: row.get(3)?,
        created_at: row.get(4)?,
        author_id: row.get(5)?,
        nickname: row.get(6)?,
        avatar: row.get(7)?,
    })
}

// -- Profiles --

pub fn get_profile(conn: &Connection, user_id: &str) -> Result<Option<ProfileRow>> {
    let row = conn
        .query_row(
            "SELECT id, user_id, nickname, avatar, bio, created_at FROM profiles WHERE user_id = ?1",
            [user_id],
            profile_from_row,
        )
        .optional()?;
    Ok(row)
}

/// Insert a profile, or overwrite nickname/avatar/bio of the existing one.
/// `id` and `created_at` of an existing row are left untouched.
pub fn upsert_profile(
    conn: &Connection,
    user_id: &str,
    nickname: &str,
    avatar: Option<&str>,
    bio: Option<&str>,
) -> Result<ProfileRow> {
    let row = conn.query_row(
        "INSERT INTO profiles (user_id, nickname, avatar, bio) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (user_id) DO UPDATE SET
            nickname = excluded.nickname,
            avatar = excluded.avatar,
            bio = excluded.bio
         RETURNING id, user_id, nickname, avatar, bio, created_at",
        rusqlite::params![user_id, nickname, avatar, bio],
        profile_from_row,
    )?;
    Ok(row)
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        nickname: row.get(2)?,
        avatar: row.get(3)?,
        bio: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn messages_come_back_oldest_first() {
        let conn = open();
        let first = insert_message(&conn, "first", "Al").unwrap();
        let second = insert_message(&conn, "second", "Bo").unwrap();
        assert!(second.id > first.id);
        assert!(second.timestamp >= first.timestamp);

        let rows = list_messages(&conn).unwrap();
        let texts: Vec<_> = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[test]
    fn delete_reports_affected_rows() {
        let conn = open();
        let msg = insert_message(&conn, "bye", "Al").unwrap();

        assert_eq!(delete_message(&conn, msg.id).unwrap(), 1);
        assert_eq!(delete_message(&conn, msg.id).unwrap(), 0);
        assert!(list_messages(&conn).unwrap().is_empty());
    }

    #[test]
    fn news_joins_author_profile() {
        let conn = open();
        upsert_profile(&conn, "u1", "Alice", Some("a.png"), None).unwrap();

        let with_author = insert_news(&conn, "t1", "c1", None, Some("u1")).unwrap().id;
        let orphan = insert_news(&conn, "t2", "c2", Some("data:image/png;base64,AA=="), Some("ghost"))
            .unwrap()
            .id;

        let row = get_news(&conn, with_author).unwrap().unwrap();
        assert_eq!(row.nickname.as_deref(), Some("Alice"));
        assert_eq!(row.avatar.as_deref(), Some("a.png"));

        let row = get_news(&conn, orphan).unwrap().unwrap();
        assert_eq!(row.author_id.as_deref(), Some("ghost"));
        assert!(row.nickname.is_none());
        assert!(row.avatar.is_none());

        // Newest first.
        let ids: Vec<_> = list_news(&conn).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, [orphan, with_author]);

        assert!(get_news(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn insert_news_returns_committed_joined_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lobby.db");
        schema::create_database(&path).unwrap();
        let writer = Connection::open(&path).unwrap();
        let reader = Connection::open(&path).unwrap();
        upsert_profile(&writer, "u1", "Alice", None, None).unwrap();

        let row = insert_news(&writer, "t", "c", None, Some("u1")).unwrap();
        assert_eq!(row.nickname.as_deref(), Some("Alice"));
        assert!(writer.is_autocommit(), "transaction left open");

        // Visible to another connection once the call returns.
        let seen = get_news(&reader, row.id).unwrap().unwrap();
        assert_eq!(seen.title, "t");
        assert_eq!(seen.nickname.as_deref(), Some("Alice"));
    }

    #[test]
    fn upsert_keeps_identity() {
        let conn = open();
        let first = upsert_profile(&conn, "u1", "Alice", Some("a.png"), Some("hi")).unwrap();
        let second = upsert_profile(&conn, "u1", "Alicia", None, Some("hello")).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.nickname, "Alicia");
        assert!(second.avatar.is_none());
        assert_eq!(second.bio.as_deref(), Some("hello"));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM profiles WHERE user_id = 'u1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
