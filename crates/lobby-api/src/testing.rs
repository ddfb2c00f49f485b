use lobby_db::{Database, schema};
use tempfile::TempDir;

use crate::request::HandlerResponse;

/// A fresh database file with the reference schema. Keep the `TempDir` alive.
pub(crate) fn temp_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lobby.db");
    schema::create_database(&path).unwrap();
    let db = Database::from_url(path.to_str().unwrap());
    (dir, db)
}

/// A database URL that cannot be opened.
pub(crate) fn unreachable_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::from_url(dir.path().join("missing.db").to_str().unwrap());
    (dir, db)
}

pub(crate) fn body_json(resp: &HandlerResponse) -> serde_json::Value {
    serde_json::from_str(&resp.body).unwrap()
}
