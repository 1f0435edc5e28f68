use std::io;
use thiserror::Error;

pub mod store;

pub use store::KvStore;

pub const SETTINGS_KEY: &str = "ss_settings";
pub const HISTORY_KEY: &str = "ss_history";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to serialize value for key {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}
