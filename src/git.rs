//! Read-only queries against the version-control checkout.

use std::path::PathBuf;
use std::process::Command;

use crate::error::VcsQueryError;

#[cfg_attr(test, mockall::automock)]
pub trait Vcs {
    /// Name of the most recent tag reachable from the current checkout.
    fn last_tag(&self) -> Result<String, VcsQueryError>;

    /// Identifier of the current commit.
    fn commit_hash(&self) -> Result<String, VcsQueryError>;
}

/// Shells out to the git executable. Every call is a fresh query.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    repo_dir: PathBuf,
    hash_length: Option<u8>,
}

impl GitCli {
    pub fn new(program: impl Into<String>, repo_dir: impl Into<PathBuf>) -> Self {
        GitCli {
            program: program.into(),
            repo_dir: repo_dir.into(),
            hash_length: None,
        }
    }

    /// Abbreviate commit hashes to `len` characters instead of the full hash.
    #[must_use]
    pub fn with_hash_length(mut self, len: Option<u8>) -> Self {
        self.hash_length = len;
        self
    }

    fn run(&self, args: &[&str]) -> Result<String, VcsQueryError> {
        let joined = args.join(" ");
        tracing::debug!("running {} {} in {}", self.program, joined, self.repo_dir.display());

        let output = Command::new(&self.program)
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .output()
            .map_err(|source| VcsQueryError::Spawn {
                program: self.program.clone(),
                args: joined.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(VcsQueryError::Failed {
                program: self.program.clone(),
                args: joined,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| VcsQueryError::InvalidUtf8 {
            program: self.program.clone(),
            args: joined.clone(),
        })?;
        let value = stdout.trim();
        if value.is_empty() {
            return Err(VcsQueryError::EmptyOutput {
                program: self.program.clone(),
                args: joined,
            });
        }
        Ok(value.to_string())
    }
}

impl Vcs for GitCli {
    fn last_tag(&self) -> Result<String, VcsQueryError> {
        self.run(&["describe", "--tags", "--abbrev=0"])
    }

    fn commit_hash(&self) -> Result<String, VcsQueryError> {
        match self.hash_length {
            Some(len) => {
                let short = format!("--short={len}");
                self.run(&["rev-parse", &short, "HEAD"])
            }
            None => self.run(&["rev-parse", "HEAD"]),
        }
    }
}
