mod models;
mod queries;

pub use models::*;

use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::error::StoreError;

/// The project's asset database: every asset is indexed by GUID, path and type.
pub struct AssetDatabase {
    pub conn: Connection,
}

impl AssetDatabase {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        tracing::debug!("opened asset database at {}", path.display());
        Ok(AssetDatabase { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = AssetDatabase { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS assets (
                guid TEXT PRIMARY KEY,
                path TEXT NOT NULL UNIQUE,
                asset_type TEXT NOT NULL,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_assets_type ON assets(asset_type);
            ",
        )?;
        Ok(())
    }
}
