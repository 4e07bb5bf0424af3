//! AlderDB database file prototype.
//!
//! The store persists the environment around a tree — file header,
//! schema slots, and one preallocated page — but not the tree nodes
//! themselves: the in-memory index remains the authoritative data
//! structure. A created file can be reopened, its header validated,
//! and its schema slots read back.

pub mod file;
pub mod format;

pub use file::StoreFile;
pub use format::{SchemaSlot, SlotKind, StoreHeader, MAGIC};
