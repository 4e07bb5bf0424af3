//! Configuration structures for AlderDB.

use crate::error::{AlderError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Minimum tree order. An order below 3 cannot form a B+ tree.
pub const MIN_ORDER: usize = 3;

/// Maximum tree order. The upper bound is a policy choice, not a
/// structural one.
pub const MAX_ORDER: usize = 100;

/// Default tree order.
pub const DEFAULT_ORDER: usize = 4;

/// Default store page size in bytes.
pub const DEFAULT_PAGE_SIZE: usize = 1024;

/// Index configuration for a single tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Tree order (fan-out): maximum number of pointers per node.
    /// A node holds at most `order - 1` keys.
    pub order: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
        }
    }
}

impl TreeConfig {
    /// Creates a config with the given order, validating the bounds.
    pub fn with_order(order: usize) -> Result<Self> {
        let config = Self { order };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the order lies within `[MIN_ORDER, MAX_ORDER]`.
    pub fn validate(&self) -> Result<()> {
        if self.order < MIN_ORDER || self.order > MAX_ORDER {
            return Err(AlderError::InvalidOrder {
                order: self.order,
                min: MIN_ORDER,
                max: MAX_ORDER,
            });
        }
        Ok(())
    }
}

/// Store configuration for the persistence prototype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the database file.
    pub path: PathBuf,
    /// Page size in bytes.
    pub page_size: usize,
    /// Header flag bits (reserved options carried in the file header).
    pub flags: u8,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./alder.db"),
            page_size: DEFAULT_PAGE_SIZE,
            flags: 0,
        }
    }
}

impl StoreConfig {
    /// Number of schema slots that fit in the schema area.
    pub fn schema_slots(&self) -> usize {
        self.page_size / 128
    }

    /// Checks that the page size can hold at least one schema slot.
    pub fn validate(&self) -> Result<()> {
        if self.page_size < 128 {
            return Err(AlderError::ConfigError(format!(
                "page size {} too small for schema area",
                self.page_size
            )));
        }
        if !self.page_size.is_power_of_two() {
            return Err(AlderError::ConfigError(format!(
                "page size {} is not a power of two",
                self.page_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_config_default() {
        let config = TreeConfig::default();
        assert_eq!(config.order, DEFAULT_ORDER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tree_config_with_order() {
        let config = TreeConfig::with_order(7).unwrap();
        assert_eq!(config.order, 7);

        assert!(TreeConfig::with_order(MIN_ORDER).is_ok());
        assert!(TreeConfig::with_order(MAX_ORDER).is_ok());
    }

    #[test]
    fn test_tree_config_rejects_out_of_range() {
        for order in [0, 1, 2, MAX_ORDER + 1, 1000] {
            let err = TreeConfig::with_order(order).unwrap_err();
            assert!(matches!(err, AlderError::InvalidOrder { .. }));
        }
    }

    #[test]
    fn test_tree_config_serde_roundtrip() {
        let original = TreeConfig { order: 12 };
        let serialized = serde_json::to_string(&original).unwrap();
        let deserialized: TreeConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(original.order, deserialized.order);
    }

    #[test]
    fn test_store_config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.path, PathBuf::from("./alder.db"));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.flags, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_config_schema_slots() {
        let config = StoreConfig::default();
        // 1024 / 128 = 8 slots
        assert_eq!(config.schema_slots(), 8);

        let config = StoreConfig {
            page_size: 4096,
            ..Default::default()
        };
        assert_eq!(config.schema_slots(), 32);
    }

    #[test]
    fn test_store_config_rejects_tiny_page() {
        let config = StoreConfig {
            page_size: 64,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_config_rejects_non_power_of_two() {
        let config = StoreConfig {
            page_size: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_config_serde_roundtrip() {
        let original = StoreConfig {
            path: PathBuf::from("/tmp/test.db"),
            page_size: 2048,
            flags: 0x08,
        };
        let serialized = serde_json::to_string(&original).unwrap();
        let deserialized: StoreConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(original.path, deserialized.path);
        assert_eq!(original.page_size, deserialized.page_size);
        assert_eq!(original.flags, deserialized.flags);
    }
}
