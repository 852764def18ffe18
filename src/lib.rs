//! Stamp a build with the version from its latest git tag.
//!
//! [`resolver::resolve`] runs once before a build: it parses the latest tag, records the
//! commit hash and a UTC timestamp on the project's single version record, and mirrors the
//! version string into the project settings. Any failure aborts the build.

pub mod config;
pub mod error;
pub mod git;
pub mod resolver;
pub mod settings;
pub mod store;
pub mod version;

pub use error::BuildAbortError;
pub use resolver::{ResolveOptions, ResolvedVersion, resolve};
pub use version::{VersionTriple, parse_version};
