use std::fs;
use std::path::Path;
use std::sync::Arc;

use rusqlite::{Connection, OpenFlags};

use crate::canvas::item::ResourceKind;
use crate::store::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: Arc<String>,
}

impl SqliteStore {
    pub fn new(path: String) -> Self {
        Self {
            path: Arc::new(path),
        }
    }

    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    pub fn ensure_parent_dir(&self) -> StoreResult<()> {
        if let Some(parent) = Path::new(self.path.as_str()).parent() {
            fs::create_dir_all(parent).map_err(|err| StoreError::OpenFailed(err.to_string()))?;
        }
        Ok(())
    }

    pub fn open(&self) -> StoreResult<Connection> {
        self.ensure_parent_dir()?;
        Connection::open_with_flags(
            self.path.as_str(),
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .map_err(|err| StoreError::OpenFailed(err.to_string()))
    }

    /// Creates one table per resource kind. Safe to run on every open.
    pub fn migrate(&self, conn: &Connection) -> StoreResult<()> {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|err| StoreError::MigrationFailed(err.to_string()))?;
        for kind in ResourceKind::ALL {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY);",
                kind.table()
            ))
            .map_err(|err| StoreError::MigrationFailed(err.to_string()))?;
        }
        Ok(())
    }

    pub fn touch(&self) -> StoreResult<()> {
        let conn = self.open()?;
        self.migrate(&conn)?;
        Ok(())
    }

    pub fn with_connection<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.open()?;
        self.migrate(&conn)?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rusqlite::params;

    use super::SqliteStore;
    use crate::store::error::StoreError;

    fn temp_store() -> (SqliteStore, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("coursewatch-test-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("seen.db");
        (SqliteStore::new(path.to_string_lossy().to_string()), dir)
    }

    fn table_names(store: &SqliteStore) -> Vec<String> {
        store
            .with_connection(|conn| {
                let mut stmt = conn
                    .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                    .map_err(|err| StoreError::QueryFailed(err.to_string()))?;
                let rows = stmt
                    .query_map([], |row| row.get::<_, String>(0))
                    .map_err(|err| StoreError::QueryFailed(err.to_string()))?;
                rows.collect::<Result<Vec<_>, _>>()
                    .map_err(|err| StoreError::QueryFailed(err.to_string()))
            })
            .unwrap()
    }

    #[test]
    fn sqlite_store_creates_one_table_per_kind() {
        let (store, dir) = temp_store();
        store.touch().unwrap();
        assert_eq!(
            table_names(&store),
            vec!["announcements", "assignments", "quizzes"]
        );
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn migrate_twice_keeps_schema_and_rows() {
        let (store, dir) = temp_store();
        store.touch().unwrap();
        store
            .with_connection(|conn| {
                conn.execute("INSERT INTO quizzes (id) VALUES (?1)", params![7_i64])
                    .map_err(|err| StoreError::QueryFailed(err.to_string()))?;
                Ok(())
            })
            .unwrap();
        store.touch().unwrap();
        store.touch().unwrap();

        assert_eq!(table_names(&store).len(), 3);
        let count: i64 = store
            .with_connection(|conn| {
                conn.query_row("SELECT COUNT(*) FROM quizzes", [], |row| row.get(0))
                    .map_err(|err| StoreError::QueryFailed(err.to_string()))
            })
            .unwrap();
        assert_eq!(count, 1);
        fs::remove_dir_all(&dir).ok();
    }
}
