//! Storage backends implementing the domain ports.

pub mod cached;
pub mod in_memory;
pub mod json_file;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod sheets;
