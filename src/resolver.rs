//! The pre-build step: stamp the project's version record from git.
//!
//! Every stage is a hard gate. Field updates are held on the in-memory [`RecordHandle`] until
//! the final save, so a failure at any earlier stage leaves the stored record as it was.
//! Nothing is retried and there is no fallback version.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::error::BuildAbortError;
use crate::git::Vcs;
use crate::settings::VersionSink;
use crate::store::{AssetDatabase, RecordHandle};
use crate::version::{VersionTriple, parse_version};

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Location for a new version record if the project has none.
    pub record_path: String,
    /// chrono format string, rendered in UTC.
    pub timestamp_format: String,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            record_path: "Assets/Version/Version.asset".to_string(),
            timestamp_format: crate::config::default_timestamp_format(),
        }
    }
}

impl From<&crate::config::Config> for ResolveOptions {
    fn from(config: &crate::config::Config) -> Self {
        ResolveOptions {
            record_path: config.record_path.clone(),
            timestamp_format: config.timestamp_format.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: VersionTriple,
    pub git_hash: String,
    pub build_timestamp: String,
    pub record_path: String,
}

impl ResolvedVersion {
    /// `major.minor.patch`, as mirrored into the platform build settings.
    pub fn version_string(&self) -> String {
        self.version.to_string()
    }
}

pub fn resolve<V, S>(
    db: &mut AssetDatabase,
    vcs: &V,
    sink: &mut S,
    options: &ResolveOptions,
) -> Result<ResolvedVersion, BuildAbortError>
where
    V: Vcs + ?Sized,
    S: VersionSink + ?Sized,
{
    resolve_at(db, vcs, sink, options, Utc::now())
}

/// [`resolve`] with the build time supplied by the caller.
pub fn resolve_at<V, S>(
    db: &mut AssetDatabase,
    vcs: &V,
    sink: &mut S,
    options: &ResolveOptions,
    now: DateTime<Utc>,
) -> Result<ResolvedVersion, BuildAbortError>
where
    V: Vcs + ?Sized,
    S: VersionSink + ?Sized,
{
    let mut handle = db
        .get_or_create_record(&options.record_path)
        .map_err(BuildAbortError::Store)?;

    let tag = vcs.last_tag().map_err(BuildAbortError::TagLookup)?;
    let version = parse_version(&tag).map_err(BuildAbortError::TagParse)?;
    tracing::debug!("tag {tag} resolved to {version}");
    handle.set_game_version(version);

    let git_hash = vcs.commit_hash().map_err(BuildAbortError::CommitHash)?;
    handle.set_git_hash(git_hash);

    let timestamp = format_timestamp(now, &options.timestamp_format)?;
    handle.set_build_timestamp(timestamp);

    db.save(&mut handle).map_err(BuildAbortError::Persist)?;

    let resolved = resolved_from(&handle);
    sink.set_version_string(&resolved.version_string())
        .map_err(BuildAbortError::Mirror)?;

    tracing::info!(
        "storing version: {}, commit hash: {} and timestamp: {}",
        resolved.version,
        resolved.git_hash,
        resolved.build_timestamp
    );
    Ok(resolved)
}

fn format_timestamp(now: DateTime<Utc>, format: &str) -> Result<String, BuildAbortError> {
    let mut out = String::new();
    write!(out, "{}", now.format(format)).map_err(|_| BuildAbortError::Timestamp {
        format: format.to_string(),
    })?;
    Ok(out)
}

fn resolved_from(handle: &RecordHandle) -> ResolvedVersion {
    let record = handle.record();
    ResolvedVersion {
        version: record.game_version,
        git_hash: record.git_hash.clone(),
        build_timestamp: record.build_timestamp.clone(),
        record_path: handle.path().to_string(),
    }
}
