use rusqlite::{Connection, OptionalExtension, params};

use crate::canvas::item::ResourceKind;
use crate::store::db::SqliteStore;
use crate::store::error::{StoreError, StoreResult};

/// Durable set of item ids that have already been announced, partitioned by kind.
pub trait SeenStore: Send + Sync {
    fn exists(&self, kind: ResourceKind, id: i64) -> StoreResult<bool>;

    /// Commits the id. Recording an id that is already present is a no-op.
    fn record(&self, kind: ResourceKind, id: i64) -> StoreResult<()>;
}

#[derive(Debug, Clone)]
pub struct SqliteSeenStore {
    store: SqliteStore,
}

impl SqliteSeenStore {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn count(&self, kind: ResourceKind) -> StoreResult<u64> {
        self.store.with_connection(|conn| {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", kind.table()), [], |row| {
                    row.get(0)
                })
                .map_err(|err| StoreError::QueryFailed(err.to_string()))?;
            Ok(count as u64)
        })
    }
}

impl SeenStore for SqliteSeenStore {
    fn exists(&self, kind: ResourceKind, id: i64) -> StoreResult<bool> {
        self.store.with_connection(|conn| seen_exists(conn, kind, id))
    }

    fn record(&self, kind: ResourceKind, id: i64) -> StoreResult<()> {
        self.store.with_connection(|conn| insert_seen(conn, kind, id))
    }
}

fn seen_exists(conn: &Connection, kind: ResourceKind, id: i64) -> StoreResult<bool> {
    let found = conn
        .query_row(
            &format!("SELECT 1 FROM {} WHERE id = ?1", kind.table()),
            params![id],
            |_| Ok(()),
        )
        .optional()
        .map_err(|err| StoreError::QueryFailed(err.to_string()))?;
    Ok(found.is_some())
}

fn insert_seen(conn: &Connection, kind: ResourceKind, id: i64) -> StoreResult<()> {
    // The primary key arbitrates between concurrent writers.
    conn.execute(
        &format!("INSERT OR IGNORE INTO {} (id) VALUES (?1)", kind.table()),
        params![id],
    )
    .map_err(|err| StoreError::QueryFailed(err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{SeenStore, SqliteSeenStore};
    use crate::canvas::item::ResourceKind;
    use crate::store::db::SqliteStore;

    fn temp_seen() -> (SqliteSeenStore, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("coursewatch-seen-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let store = SqliteStore::new(dir.join("seen.db").to_string_lossy().to_string());
        store.touch().unwrap();
        (SqliteSeenStore::new(store), dir)
    }

    #[test]
    fn record_then_exists() {
        let (seen, dir) = temp_seen();
        assert!(!seen.exists(ResourceKind::Assignment, 11).unwrap());
        seen.record(ResourceKind::Assignment, 11).unwrap();
        assert!(seen.exists(ResourceKind::Assignment, 11).unwrap());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn partitions_are_independent() {
        let (seen, dir) = temp_seen();
        seen.record(ResourceKind::Quiz, 5).unwrap();
        assert!(seen.exists(ResourceKind::Quiz, 5).unwrap());
        assert!(!seen.exists(ResourceKind::Assignment, 5).unwrap());
        assert!(!seen.exists(ResourceKind::Announcement, 5).unwrap());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn recording_twice_is_a_no_op() {
        let (seen, dir) = temp_seen();
        seen.record(ResourceKind::Announcement, 3).unwrap();
        seen.record(ResourceKind::Announcement, 3).unwrap();
        assert_eq!(seen.count(ResourceKind::Announcement).unwrap(), 1);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn records_survive_reopening() {
        let (seen, dir) = temp_seen();
        seen.record(ResourceKind::Assignment, 99).unwrap();
        let path = seen.store().path().to_string();
        drop(seen);

        let reopened = SqliteSeenStore::new(SqliteStore::new(path));
        assert!(reopened.exists(ResourceKind::Assignment, 99).unwrap());
        fs::remove_dir_all(&dir).ok();
    }
}
