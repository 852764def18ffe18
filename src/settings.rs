//! Mirrors the resolved version string into the project's platform build settings.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use toml::{Table, Value};

use crate::error::SettingsError;

#[cfg_attr(test, mockall::automock)]
pub trait VersionSink {
    fn set_version_string(&mut self, version: &str) -> Result<(), SettingsError>;
}

/// A TOML project-settings file where each configured field (a dotted key path such as
/// `player.macos.build_number`) receives the version string.
#[derive(Debug, Clone)]
pub struct ProjectSettingsFile {
    path: PathBuf,
    fields: Vec<String>,
}

impl ProjectSettingsFile {
    pub fn new(path: impl Into<PathBuf>, fields: Vec<String>) -> Self {
        ProjectSettingsFile {
            path: path.into(),
            fields,
        }
    }

    fn read(&self) -> Result<Table, SettingsError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => content.parse::<Table>().map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Table::new()),
            Err(source) => Err(SettingsError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, table: &Table) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(table)?;
        fs::write(&self.path, content).map_err(io_err)
    }
}

impl VersionSink for ProjectSettingsFile {
    fn set_version_string(&mut self, version: &str) -> Result<(), SettingsError> {
        let mut table = self.read()?;
        for field in &self.fields {
            set_dotted(&mut table, field, version)?;
        }
        self.write(&table)?;
        tracing::debug!(
            "wrote version {version} to {} ({})",
            self.path.display(),
            self.fields.join(", ")
        );
        Ok(())
    }
}

fn set_dotted(table: &mut Table, field: &str, value: &str) -> Result<(), SettingsError> {
    let segments: Vec<&str> = field.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(SettingsError::InvalidField(field.to_string()));
    }
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(SettingsError::InvalidField(field.to_string()));
    };

    let mut current = table;
    for segment in parents {
        let entry = current
            .entry((*segment).to_string())
            .or_insert(Value::Table(Table::new()));
        current = match entry {
            Value::Table(t) => t,
            _ => {
                return Err(SettingsError::NotATable {
                    field: field.to_string(),
                    segment: (*segment).to_string(),
                });
            }
        };
    }
    current.insert((*leaf).to_string(), Value::String(value.to_string()));
    Ok(())
}
