use crate::config::StoreConfig;
use crate::entity_store::EntityStore;
use crate::error::{StorageError, StorageResult};
use crate::extension_store::ExtensionStore;
use crate::time_series::TimeSeriesStore;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// Shared handle to the SQLite database.
///
/// Cloning is cheap; clones share the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database described by `config`.
    pub fn open(config: &StoreConfig) -> StorageResult<Self> {
        let conn = match &config.path {
            Some(path) => {
                info!(path = %path.display(), "opening database");
                Connection::open(path)?
            }
            None => {
                debug!("opening in-memory database");
                Connection::open_in_memory()?
            }
        };
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        let mode: String = conn.pragma_update_and_check(
            None,
            "journal_mode",
            config.journal_mode.as_pragma(),
            |row| row.get(0),
        )?;
        debug!(journal_mode = %mode, "journal mode set");
        conn.pragma_update(None, "foreign_keys", true)?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens a private in-memory database (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::open(&StoreConfig::in_memory())
    }

    /// Runs `f` inside one transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back when it
    /// returns `Err`, so a failed multi-store write leaves nothing behind.
    pub fn unit_of_work<T, E>(
        &self,
        f: impl FnOnce(&UnitOfWork<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction().map_err(StorageError::from)?;
        let result = f(&UnitOfWork { conn: &tx });
        match result {
            Ok(value) => {
                tx.commit().map_err(StorageError::from)?;
                Ok(value)
            }
            Err(e) => {
                debug!("unit of work failed, rolling back");
                tx.rollback().map_err(StorageError::from)?;
                Err(e)
            }
        }
    }
}

/// The stores available inside one transaction.
pub struct UnitOfWork<'c> {
    conn: &'c Connection,
}

impl<'c> UnitOfWork<'c> {
    pub fn extensions(&self) -> ExtensionStore<'c> {
        ExtensionStore::new(self.conn)
    }

    pub fn time_series(&self) -> TimeSeriesStore<'c> {
        TimeSeriesStore::new(self.conn)
    }

    pub fn entities(&self) -> EntityStore<'c> {
        EntityStore::new(self.conn)
    }
}

fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS entity (
            id TEXT PRIMARY KEY,
            entity_type TEXT NOT NULL,
            name TEXT NOT NULL,
            fqn TEXT NOT NULL,
            json TEXT NOT NULL,
            version REAL NOT NULL,
            updated_at INTEGER NOT NULL,
            updated_by TEXT NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_entity_type_fqn ON entity(entity_type, fqn);

        CREATE TABLE IF NOT EXISTS entity_relationship (
            from_id TEXT NOT NULL,
            to_id TEXT NOT NULL,
            from_entity TEXT NOT NULL,
            to_entity TEXT NOT NULL,
            relation TEXT NOT NULL,
            PRIMARY KEY (from_id, to_id, relation)
        );
        CREATE INDEX IF NOT EXISTS idx_relationship_to ON entity_relationship(to_id, relation);

        CREATE TABLE IF NOT EXISTS tag_usage (
            target_fqn TEXT NOT NULL,
            tag_fqn TEXT NOT NULL,
            json TEXT NOT NULL,
            PRIMARY KEY (target_fqn, tag_fqn)
        );

        CREATE TABLE IF NOT EXISTS entity_version_history (
            id TEXT NOT NULL,
            version REAL NOT NULL,
            json TEXT NOT NULL,
            change_description TEXT,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (id, version)
        );

        CREATE TABLE IF NOT EXISTS entity_extension (
            id TEXT NOT NULL,
            extension TEXT NOT NULL,
            json TEXT NOT NULL,
            PRIMARY KEY (id, extension)
        );

        CREATE TABLE IF NOT EXISTS profiler_time_series (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_fqn TEXT NOT NULL,
            extension TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            operation TEXT,
            json TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_time_series_lookup
            ON profiler_time_series(entity_fqn, extension, timestamp);
        "#,
    )?;
    Ok(())
}
