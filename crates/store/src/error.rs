//! Store-local error type, folded into `CoordinatorError` at the daemon seam.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("scratch file I/O failed during open_copy: {0}")]
    Scratch(#[from] std::io::Error),

    #[error("measurement blob is not valid: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<StoreError> for ac_core::CoordinatorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Scratch(e) => ac_core::CoordinatorError::Io(e),
            StoreError::Malformed(e) => ac_core::CoordinatorError::Serialization(e),
        }
    }
}
