pub mod models;
pub mod queries;
pub mod schema;

use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

pub use rusqlite::Connection as DbConnection;

/// How long a statement waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the relational store.
///
/// Holds only the database location. Every call to [`Database::with_conn`]
/// opens a fresh connection and closes it before returning, so nothing is
/// shared between requests.
#[derive(Debug, Clone)]
pub struct Database {
    location: String,
}

impl Database {
    /// Build a handle from a `DATABASE_URL` value.
    ///
    /// Accepts `sqlite://path`, `sqlite:path`, `file:` URIs and bare paths.
    pub fn from_url(url: &str) -> Self {
        Self {
            location: location_from_url(url),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Open a connection, run `f` on it and close it on every exit path.
    ///
    /// The database must already exist; a missing file is a connection error.
    pub fn with_conn<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, E>,
        E: From<anyhow::Error>,
    {
        let conn = self.connect()?;
        let result = f(&conn);

        if let Err((_, e)) = conn.close() {
            warn!("Failed to close connection to {}: {}", self.location, e);
        }
        result
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.location,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to connect to database at {}", self.location))?;

        conn.busy_timeout(BUSY_TIMEOUT)?;

        debug!("Opened connection to {}", self.location);
        Ok(conn)
    }
}

fn location_from_url(url: &str) -> String {
    let url = url.trim();
    if let Some(rest) = url.strip_prefix("sqlite://") {
        rest.to_string()
    } else if let Some(rest) = url.strip_prefix("sqlite:") {
        rest.to_string()
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_forms() {
        assert_eq!(Database::from_url("sqlite:///var/lib/lobby.db").location(), "/var/lib/lobby.db");
        assert_eq!(Database::from_url("sqlite://lobby.db").location(), "lobby.db");
        assert_eq!(Database::from_url("sqlite:lobby.db").location(), "lobby.db");
        assert_eq!(Database::from_url("file:lobby.db?cache=shared").location(), "file:lobby.db?cache=shared");
        assert_eq!(Database::from_url(" ./lobby.db\n").location(), "./lobby.db");
    }

    #[test]
    fn missing_database_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::from_url(dir.path().join("absent.db").to_str().unwrap());

        let result: Result<()> = db.with_conn(|_| Ok(()));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to connect"));
    }

    #[test]
    fn each_call_gets_its_own_connection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lobby.db");
        schema::create_database(&path).unwrap();
        let db = Database::from_url(path.to_str().unwrap());

        // A temp table lives only as long as the connection that made it.
        db.with_conn(|conn| {
            conn.execute_batch("CREATE TEMP TABLE scratch (x INTEGER)")?;
            Ok::<_, anyhow::Error>(())
        })
        .unwrap();

        let exists: i64 = db
            .with_conn(|conn| {
                Ok::<_, anyhow::Error>(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_temp_master WHERE name = 'scratch'",
                    [],
                    |r| r.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(exists, 0);
    }
}
