//! # Document Store
//!
//! Durable key-value storage for course documents. A store maps a
//! document id (its filename) to the raw bytes plus a small metadata
//! record, and survives restarts so that documents fetched once stay
//! available offline.

// Module declarations
mod blob_store;
mod disk;
mod memory;

// Re-export primary types
pub use blob_store::{BlobMeta, BlobStore, StoreResult};
pub use disk::DiskStore;
pub use memory::MemoryStore;
