use crate::storage::StorageError;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Durable key-value store: one JSON file per key under a root directory.
///
/// Reads never fail the caller. A missing or unparseable file yields the
/// supplied default; an unparseable file is first moved aside to
/// `<key>.json.corrupt` so a later save cannot overwrite it. Writes go
/// through a temp file and a rename so a crash mid-write leaves the
/// previous value in place.
#[derive(Debug, Clone)]
pub struct KvStore {
    root: PathBuf,
}

impl KvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let path = self.key_path(key);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no stored value for {key}, using default");
                return default;
            }
            Err(err) => {
                warn!("failed to read {}: {err}", path.display());
                return default;
            }
        };

        match serde_json::from_slice(&data) {
            Ok(value) => value,
            Err(err) => {
                let aside = self.corrupt_path(key);
                match fs::rename(&path, &aside) {
                    Ok(()) => warn!(
                        "corrupt value in {} ({err}), moved to {}",
                        path.display(),
                        aside.display()
                    ),
                    Err(rename_err) => warn!(
                        "corrupt value in {} ({err}), could not move it aside: {rename_err}",
                        path.display()
                    ),
                }
                default
            }
        }
    }

    fn corrupt_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json.corrupt"))
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;

        self.write_atomic(key, &bytes)
            .map_err(|source| StorageError::Io {
                key: key.to_string(),
                source,
            })
    }

    fn write_atomic(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        self.ensure_root()?;
        let final_path = self.key_path(key);
        let tmp_path = self.root.join(format!("{key}.json.tmp"));

        if let Err(err) = fs::write(&tmp_path, bytes) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
        match fs::rename(&tmp_path, &final_path) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                if final_path.exists() {
                    fs::remove_file(&final_path)?;
                    fs::rename(&tmp_path, &final_path)?;
                    Ok(())
                } else {
                    Err(rename_err)
                }
            }
        }
    }
}
