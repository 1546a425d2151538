//! Store error types.

use thiserror::Error;

/// Errors that can occur when reading or writing the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value is not valid JSON for the requested type.
    #[error("corrupt value under key '{key}': {source}")]
    Corrupt {
        /// Key whose value failed to parse.
        key: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialized.
    #[error("failed to serialize value for key '{key}': {source}")]
    Serialize {
        /// Key being written.
        key: String,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}
