//! # Error Types Module
//!
//! This module defines the error types used by the persisted store and by the
//! kitchen controller. Storage failures are non-fatal for the session: callers
//! receive them as values and surface them as warnings.

/// Errors raised while writing to the key-value backend
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// A value could not be serialized to JSON
    Serialization(String),
    /// The backend refused the write because it is full
    QuotaExceeded {
        /// Key that was being written
        key: String,
        /// Bytes the write would have needed
        needed: usize,
        /// Bytes allowed by the backend
        limit: usize,
    },
    /// Backend I/O errors (file system, etc.)
    Backend(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            StorageError::QuotaExceeded { key, needed, limit } => write!(
                f,
                "Storage quota exceeded while writing '{key}': {needed} bytes needed, {limit} allowed"
            ),
            StorageError::Backend(msg) => write!(f, "Storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Errors returned by engine operations
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// No recipe with this id exists in the catalog
    UnknownRecipe(String),
    /// A list index was outside the current list
    InvalidIndex {
        /// Requested index
        index: usize,
        /// Length of the list at the time of the request
        len: usize,
    },
    /// User supplied ingredient text was rejected
    InvalidIngredient(String),
    /// A recipe catalog could not be loaded
    Catalog(String),
    /// A write failed in a way the caller has to handle
    Storage(StorageError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::UnknownRecipe(id) => write!(f, "Unknown recipe: {id}"),
            EngineError::InvalidIndex { index, len } => {
                write!(f, "Index {index} out of range for list of {len} items")
            }
            EngineError::InvalidIngredient(msg) => write!(f, "Invalid ingredient: {msg}"),
            EngineError::Catalog(msg) => write!(f, "Catalog error: {msg}"),
            EngineError::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        EngineError::Storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_error_display() {
        let err = StorageError::QuotaExceeded {
            key: "shopping-list".to_string(),
            needed: 120,
            limit: 64,
        };
        let text = err.to_string();
        assert!(text.contains("shopping-list"));
        assert!(text.contains("120"));
    }

    #[test]
    fn test_engine_error_wraps_storage() {
        let err: EngineError = StorageError::Backend("disk gone".to_string()).into();
        assert_eq!(err.to_string(), "Storage backend error: disk gone");
    }
}
