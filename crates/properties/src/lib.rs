//! Message webhook property store adapter.
//!
//! Implements [`interceptor::PropertyStore`] over a flat TOML table kept in the
//! plugin's working directory (`message-webhook.toml`). The file is re-written
//! in full on every update, via a temporary file and a rename, so a crash
//! mid-write never leaves a truncated table behind.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File-system access and TOML encoding live here; the
//! [`interceptor`] crate sees only [`interceptor::PropertyStore`].
//!
//! Operators may hand-edit the file. Booleans and numbers written without
//! quotes are accepted and read back as their string form.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use interceptor::{PropertyStore, StoreError};
use tracing::debug;

/// File name of the property table inside the working directory.
pub const PROPERTIES_FILE_NAME: &str = "message-webhook.toml";

/// A [`PropertyStore`] persisted as a TOML file.
#[derive(Debug)]
pub struct FilePropertyStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FilePropertyStore {
    /// Opens (or prepares to create) the property file in `dir`.
    ///
    /// A missing file is an empty store. A file that is not a flat table of
    /// scalar values is reported as [`StoreError::Corrupt`].
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = dir.as_ref().join(PROPERTIES_FILE_NAME);
        let values = match fs::read_to_string(&path) {
            Ok(text) => parse_table(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        debug!(path = %path.display(), entries = values.len(), "Opened property store");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, key: &str, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let text = toml::to_string(values).map_err(|e| StoreError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PropertyStore for FilePropertyStore {
    fn get_property(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set_property(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        let previous = values.insert(key.to_string(), value.to_string());

        if let Err(e) = self.persist(key, &values) {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => values.insert(key.to_string(), old),
                None => values.remove(key),
            };
            return Err(e);
        }

        debug!(key, path = %self.path.display(), "Persisted property");
        Ok(())
    }
}

fn parse_table(text: &str) -> Result<BTreeMap<String, String>, StoreError> {
    let table: toml::Table = toml::from_str(text).map_err(|e| StoreError::Corrupt {
        message: e.to_string(),
    })?;

    table
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                other => {
                    return Err(StoreError::Corrupt {
                        message: format!("property '{key}' has unsupported type {}", other.type_str()),
                    })
                }
            };
            Ok((key, value))
        })
        .collect()
}
