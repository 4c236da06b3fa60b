//! Error types for the dietlog application.

use thiserror::Error;

/// Errors that can occur when persisting application state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot write storage file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}
