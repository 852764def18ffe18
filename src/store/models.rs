use serde::{Deserialize, Serialize};

use crate::version::VersionTriple;

/// Asset type name under which version records are indexed.
pub const VERSION_ASSET_TYPE: &str = "Version";

#[derive(Debug, Clone)]
pub struct AssetEntry {
    pub guid: String,
    pub path: String,
    pub asset_type: String,
    pub created_at: String,
    pub updated_at: String,
}

/// The project's current build version, as read by packaging and at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub game_version: VersionTriple,
    pub git_hash: String,
    pub build_timestamp: String,
}

/// A loaded version record plus where it lives. Mutations stay in memory until
/// [`AssetDatabase::save`](super::AssetDatabase::save) is called.
#[derive(Debug, Clone)]
pub struct RecordHandle {
    pub(super) guid: String,
    pub(super) path: String,
    pub(super) record: VersionRecord,
    pub(super) dirty: bool,
}

impl RecordHandle {
    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn record(&self) -> &VersionRecord {
        &self.record
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_game_version(&mut self, version: VersionTriple) {
        self.record.game_version = version;
        self.dirty = true;
    }

    pub fn set_git_hash(&mut self, hash: impl Into<String>) {
        self.record.git_hash = hash.into();
        self.dirty = true;
    }

    pub fn set_build_timestamp(&mut self, timestamp: impl Into<String>) {
        self.record.build_timestamp = timestamp.into();
        self.dirty = true;
    }
}
