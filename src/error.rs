use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// A read-only query against git failed.
#[derive(Error, Debug)]
pub enum VcsQueryError {
    #[error("failed to run `{program} {args}`: {source}")]
    Spawn {
        program: String,
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program} {args}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        args: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("`{program} {args}` produced no output")]
    EmptyOutput { program: String, args: String },

    #[error("`{program} {args}` produced output that is not valid UTF-8")]
    InvalidUtf8 { program: String, args: String },
}

/// The tag does not match `[v]MAJOR.MINOR.PATCH[-suffix][...]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("error parsing git tag: {tag}")]
pub struct ParseError {
    pub tag: String,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(
        "more than one version record in the project, please ensure only one exists:\n{}",
        .locations.join("\n")
    )]
    DuplicateRecord { locations: Vec<String> },

    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to prepare asset database at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize project settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("cannot set `{field}`: `{segment}` is not a table")]
    NotATable { field: String, segment: String },

    #[error("invalid settings field `{0}`")]
    InvalidField(String),
}

/// The only error the build pipeline needs to understand. Every variant names the stage
/// that stopped the build.
#[derive(Error, Debug)]
pub enum BuildAbortError {
    #[error("could not get version record: {0}")]
    Store(StoreError),

    #[error("could not get version: {0}")]
    TagLookup(VcsQueryError),

    #[error("could not get version: {0}")]
    TagParse(ParseError),

    #[error("could not get commit hash: {0}")]
    CommitHash(VcsQueryError),

    #[error("invalid build timestamp format: {format:?}")]
    Timestamp { format: String },

    #[error("could not save version record: {0}")]
    Persist(StoreError),

    #[error("could not update project settings: {0}")]
    Mirror(SettingsError),
}

impl BuildAbortError {
    pub fn stage(&self) -> &'static str {
        match self {
            BuildAbortError::Store(StoreError::DuplicateRecord { .. }) => "duplicate-record",
            BuildAbortError::Store(_) => "record-lookup",
            BuildAbortError::TagLookup(_) => "version-lookup",
            BuildAbortError::TagParse(_) => "tag-parse",
            BuildAbortError::CommitHash(_) => "commit-hash-lookup",
            BuildAbortError::Timestamp { .. } => "timestamp",
            BuildAbortError::Persist(_) => "record-save",
            BuildAbortError::Mirror(_) => "settings-mirror",
        }
    }
}
