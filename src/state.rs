use std::path::PathBuf;

use rusqlite::Connection;

use crate::db::sqlite::open_database;
use crate::db::DatabaseError;

/// Shared handler state. Each request opens its own connection; SQLite
/// serializes writers, and no connection outlives a request.
#[derive(Debug, Clone)]
pub struct AppState {
    db_path: PathBuf,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        open_database(&self.db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_db_creates_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("telecare.db"));

        let conn = state.open_db().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'pacientes'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);

        // A second open against the same file is fine
        state.open_db().unwrap();
    }
}
