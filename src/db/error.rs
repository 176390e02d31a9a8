use thiserror::Error;

/// Errors raised by the key-value namespace backing clock records.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// A get or put was rejected by the store
    #[error("Operation error: {0}")]
    Operation(String),

    /// The stored value under a key is not a readable clock record
    #[error("Corrupt value under key {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
            StoreError::Connection(e.to_string())
        } else {
            StoreError::Operation(e.to_string())
        }
    }
}
