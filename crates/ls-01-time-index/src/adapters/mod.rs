//! Adapters implementing the outbound ports.

pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

pub use memory::{FixedStartHeight, InMemoryTimeIndexStore};
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbConfig, RocksDbTimeIndexStore};
