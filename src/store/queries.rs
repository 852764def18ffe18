use rusqlite::{OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::AssetDatabase;
use super::models::{AssetEntry, RecordHandle, VERSION_ASSET_TYPE, VersionRecord};
use crate::error::StoreError;

impl AssetDatabase {
    // ── Generic assets ──

    /// GUIDs of every asset of `asset_type`, ordered by path.
    pub fn find_assets(&self, asset_type: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT guid FROM assets WHERE asset_type = ?1 ORDER BY path")?;
        let guids = stmt
            .query_map(params![asset_type], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(guids)
    }

    pub fn guid_to_path(&self, guid: &str) -> Result<String, StoreError> {
        self.conn
            .query_row(
                "SELECT path FROM assets WHERE guid = ?1",
                params![guid],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(guid.to_string()))
    }

    pub fn list_assets(&self, asset_type: &str) -> Result<Vec<AssetEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT guid, path, asset_type, created_at, updated_at
             FROM assets WHERE asset_type = ?1 ORDER BY path",
        )?;
        let entries = stmt
            .query_map(params![asset_type], |row| {
                Ok(AssetEntry {
                    guid: row.get(0)?,
                    path: row.get(1)?,
                    asset_type: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Insert a new asset at `path` and return its GUID.
    pub fn create_asset<T: Serialize>(
        &self,
        path: &str,
        asset_type: &str,
        value: &T,
    ) -> Result<String, StoreError> {
        let guid = Uuid::new_v4().simple().to_string();
        let payload = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO assets (guid, path, asset_type, payload) VALUES (?1, ?2, ?3, ?4)",
            params![guid, path, asset_type, payload],
        )?;
        Ok(guid)
    }

    pub fn load_asset<T: DeserializeOwned>(
        &self,
        path: &str,
        asset_type: &str,
    ) -> Result<T, StoreError> {
        let payload: String = self
            .conn
            .query_row(
                "SELECT payload FROM assets WHERE path = ?1 AND asset_type = ?2",
                params![path, asset_type],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        Ok(serde_json::from_str(&payload)?)
    }

    // ── Version record ──

    /// Locate the single version record, creating it at `default_path` if the project has
    /// none. More than one record is a configuration error that is never repaired here.
    pub fn get_or_create_record(&self, default_path: &str) -> Result<RecordHandle, StoreError> {
        let guids = self.find_assets(VERSION_ASSET_TYPE)?;
        match guids.as_slice() {
            [] => {
                let record = VersionRecord::default();
                let guid = self.create_asset(default_path, VERSION_ASSET_TYPE, &record)?;
                tracing::info!("created version record at {default_path}");
                Ok(RecordHandle {
                    guid,
                    path: default_path.to_string(),
                    record,
                    dirty: false,
                })
            }
            [guid] => {
                let path = self.guid_to_path(guid)?;
                let record = self.load_asset(&path, VERSION_ASSET_TYPE)?;
                Ok(RecordHandle {
                    guid: guid.clone(),
                    path,
                    record,
                    dirty: false,
                })
            }
            _ => {
                let locations = guids
                    .iter()
                    .map(|g| self.guid_to_path(g))
                    .collect::<Result<Vec<_>, _>>()?;
                Err(StoreError::DuplicateRecord { locations })
            }
        }
    }

    /// All version record locations, for tracking down duplicates.
    pub fn record_locations(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .list_assets(VERSION_ASSET_TYPE)?
            .into_iter()
            .map(|a| a.path)
            .collect())
    }

    /// Write a dirty handle back. The write is committed before returning, so later
    /// lookups through this database see the new values.
    pub fn save(&mut self, handle: &mut RecordHandle) -> Result<(), StoreError> {
        if !handle.dirty {
            return Ok(());
        }
        let payload = serde_json::to_string(&handle.record)?;
        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE assets SET payload = ?1, updated_at = datetime('now') WHERE guid = ?2",
            params![payload, handle.guid],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(handle.path.clone()));
        }
        tx.commit()?;
        handle.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionTriple;

    const DEFAULT_PATH: &str = "Assets/Version/Version.asset";

    #[test]
    fn test_empty_store_creates_one_record() {
        let db = AssetDatabase::open_in_memory().unwrap();
        let handle = db.get_or_create_record(DEFAULT_PATH).unwrap();

        assert_eq!(handle.path(), DEFAULT_PATH);
        assert_eq!(handle.record(), &VersionRecord::default());
        assert!(!handle.is_dirty());
        assert_eq!(db.record_locations().unwrap(), vec![DEFAULT_PATH]);
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let db = AssetDatabase::open_in_memory().unwrap();
        let first = db.get_or_create_record(DEFAULT_PATH).unwrap();
        let second = db.get_or_create_record(DEFAULT_PATH).unwrap();

        assert_eq!(first.guid(), second.guid());
        assert_eq!(db.find_assets(VERSION_ASSET_TYPE).unwrap().len(), 1);
    }

    #[test]
    fn test_existing_record_is_loaded() {
        let db = AssetDatabase::open_in_memory().unwrap();
        let existing = VersionRecord {
            game_version: VersionTriple::new(1, 4, 0),
            git_hash: "deadbee".into(),
            build_timestamp: "2025 March 01 - 12:00".into(),
        };
        db.create_asset("Config/Build.asset", VERSION_ASSET_TYPE, &existing)
            .unwrap();

        let handle = db.get_or_create_record(DEFAULT_PATH).unwrap();
        assert_eq!(handle.path(), "Config/Build.asset");
        assert_eq!(handle.record(), &existing);
    }

    #[test]
    fn test_duplicates_fail_without_creating() {
        let db = AssetDatabase::open_in_memory().unwrap();
        for path in ["Assets/b.asset", "Assets/a.asset", "Assets/c.asset"] {
            db.create_asset(path, VERSION_ASSET_TYPE, &VersionRecord::default())
                .unwrap();
        }

        let err = db.get_or_create_record(DEFAULT_PATH).unwrap_err();
        match err {
            StoreError::DuplicateRecord { locations } => {
                assert_eq!(
                    locations,
                    vec!["Assets/a.asset", "Assets/b.asset", "Assets/c.asset"]
                );
            }
            other => panic!("expected DuplicateRecord, got {other:?}"),
        }
        assert_eq!(db.find_assets(VERSION_ASSET_TYPE).unwrap().len(), 3);
    }

    #[test]
    fn test_other_asset_types_are_ignored() {
        let db = AssetDatabase::open_in_memory().unwrap();
        db.create_asset("Assets/Level.asset", "Scene", &serde_json::json!({"name": "x"}))
            .unwrap();

        db.get_or_create_record(DEFAULT_PATH).unwrap();
        assert_eq!(db.record_locations().unwrap(), vec![DEFAULT_PATH]);
        assert_eq!(db.find_assets("Scene").unwrap().len(), 1);
    }

    #[test]
    fn test_mutations_persist_only_on_save() {
        let mut db = AssetDatabase::open_in_memory().unwrap();
        let mut handle = db.get_or_create_record(DEFAULT_PATH).unwrap();

        handle.set_game_version(VersionTriple::new(2, 10, 4));
        handle.set_git_hash("abc1234");
        assert!(handle.is_dirty());

        let reloaded = db.get_or_create_record(DEFAULT_PATH).unwrap();
        assert_eq!(reloaded.record(), &VersionRecord::default());

        db.save(&mut handle).unwrap();
        assert!(!handle.is_dirty());

        let reloaded = db.get_or_create_record(DEFAULT_PATH).unwrap();
        assert_eq!(reloaded.record().game_version, VersionTriple::new(2, 10, 4));
        assert_eq!(reloaded.record().git_hash, "abc1234");
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let db = AssetDatabase::open_in_memory().unwrap();
        db.create_asset(DEFAULT_PATH, VERSION_ASSET_TYPE, &VersionRecord::default())
            .unwrap();
        let err = db
            .create_asset(DEFAULT_PATH, VERSION_ASSET_TYPE, &VersionRecord::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("assets.db");
        let db = AssetDatabase::open(&path).unwrap();
        db.migrate().unwrap();
        db.get_or_create_record(DEFAULT_PATH).unwrap();
        drop(db);

        let db = AssetDatabase::open(&path).unwrap();
        db.migrate().unwrap();
        assert_eq!(db.record_locations().unwrap(), vec![DEFAULT_PATH]);
    }
}
