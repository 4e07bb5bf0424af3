//! Error types for AlderDB.

use thiserror::Error;

/// Result type alias using AlderError.
pub type Result<T> = std::result::Result<T, AlderError>;

/// Errors that can occur in AlderDB operations.
#[derive(Debug, Error)]
pub enum AlderError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Index errors
    #[error("Invalid order: {order} (must be between {min} and {max})")]
    InvalidOrder {
        order: usize,
        min: usize,
        max: usize,
    },

    #[error("B+ tree corrupted: {0}")]
    TreeCorrupted(String),

    // Store errors
    #[error("Store file corrupted: {reason}")]
    StoreCorrupted { reason: String },

    #[error("Bad magic in store file header")]
    BadMagic,

    #[error("Schema slot not found: {0}")]
    SchemaNotFound(u16),

    #[error("Schema area full ({capacity} slots)")]
    SchemaFull { capacity: usize },

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let alder_err: AlderError = io_err.into();
        assert!(matches!(alder_err, AlderError::Io(_)));
        assert!(alder_err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_invalid_order_display() {
        let err = AlderError::InvalidOrder {
            order: 2,
            min: 3,
            max: 100,
        };
        assert_eq!(
            err.to_string(),
            "Invalid order: 2 (must be between 3 and 100)"
        );
    }

    #[test]
    fn test_tree_corrupted_display() {
        let err = AlderError::TreeCorrupted("child not found in parent".to_string());
        assert_eq!(err.to_string(), "B+ tree corrupted: child not found in parent");
    }

    #[test]
    fn test_store_errors_display() {
        let err = AlderError::StoreCorrupted {
            reason: "truncated header".to_string(),
        };
        assert_eq!(err.to_string(), "Store file corrupted: truncated header");

        let err = AlderError::BadMagic;
        assert_eq!(err.to_string(), "Bad magic in store file header");

        let err = AlderError::SchemaNotFound(3);
        assert_eq!(err.to_string(), "Schema slot not found: 3");

        let err = AlderError::SchemaFull { capacity: 8 };
        assert_eq!(err.to_string(), "Schema area full (8 slots)");
    }

    #[test]
    fn test_config_error_display() {
        let err = AlderError::ConfigError("missing path".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing path");
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(AlderError::BadMagic)
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AlderError>();
    }
}
