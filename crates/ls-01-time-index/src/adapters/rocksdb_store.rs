//! # RocksDB Time Index Store
//!
//! Durable `TimeIndexStore` backed by RocksDB.
//!
//! ## Column Families
//!
//! - `time_index` - big-endian timestamp → bincode `TimeIndexEntry`
//! - `source_cursors` - source id → big-endian last synced height
//!
//! Big-endian keys keep RocksDB's byte order equal to numeric order, so
//! range scans and "last entry" are plain iterator walks.

use crate::domain::TimeIndexEntry;
use crate::error::{TimeIndexError, TimeIndexResult};
use crate::ports::outbound::TimeIndexStore;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, DB};
use shared_types::{BlockHeight, SourceId, Timestamp};

pub const CF_TIME_INDEX: &str = "time_index";
pub const CF_SOURCE_CURSORS: &str = "source_cursors";

/// All column families used by the index
pub const COLUMN_FAMILIES: &[&str] = &[CF_TIME_INDEX, CF_SOURCE_CURSORS];

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/time-index".to_string(),
            block_cache_size: 64 * 1024 * 1024,
            write_buffer_size: 16 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024,
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed time index
pub struct RocksDbTimeIndexStore {
    db: DB,
    config: RocksDbConfig,
}

impl RocksDbTimeIndexStore {
    /// Open or create the database
    pub fn open(config: RocksDbConfig) -> TimeIndexResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| store_error("open", e))?;

        Ok(Self { db, config })
    }

    fn cf(&self, name: &str) -> TimeIndexResult<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| TimeIndexError::Store {
            reason: format!("missing column family {}", name),
        })
    }

    fn write_opts(&self) -> rocksdb::WriteOptions {
        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }
}

fn store_error(op: &str, e: impl std::fmt::Display) -> TimeIndexError {
    TimeIndexError::Store {
        reason: format!("RocksDB {} failed: {}", op, e),
    }
}

fn decode_entry(bytes: &[u8]) -> TimeIndexResult<TimeIndexEntry> {
    bincode::deserialize(bytes).map_err(|e| store_error("decode", e))
}

fn decode_height(bytes: &[u8]) -> TimeIndexResult<BlockHeight> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| store_error("decode", "cursor must be 8 bytes"))?;
    Ok(BlockHeight::from_be_bytes(raw))
}

impl TimeIndexStore for RocksDbTimeIndexStore {
    fn get(&self, timestamp: Timestamp) -> TimeIndexResult<Option<TimeIndexEntry>> {
        let cf = self.cf(CF_TIME_INDEX)?;
        self.db
            .get_cf(cf, timestamp.to_be_bytes())
            .map_err(|e| store_error("get", e))?
            .map(|bytes| decode_entry(&bytes))
            .transpose()
    }

    fn put(&self, entry: &TimeIndexEntry) -> TimeIndexResult<()> {
        let cf = self.cf(CF_TIME_INDEX)?;
        let value = bincode::serialize(entry).map_err(|e| store_error("encode", e))?;
        self.db
            .put_cf_opt(cf, entry.timestamp.to_be_bytes(), value, &self.write_opts())
            .map_err(|e| store_error("put", e))
    }

    fn range(&self, from: Timestamp, to: Timestamp) -> TimeIndexResult<Vec<TimeIndexEntry>> {
        if from > to {
            return Ok(Vec::new());
        }
        let cf = self.cf(CF_TIME_INDEX)?;
        let start = from.to_be_bytes();
        let mut entries = Vec::new();

        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(&start, Direction::Forward))
        {
            let (key, value) = item.map_err(|e| store_error("iterate", e))?;
            let key: [u8; 8] = key
                .as_ref()
                .try_into()
                .map_err(|_| store_error("decode", "key must be 8 bytes"))?;
            if Timestamp::from_be_bytes(key) > to {
                break;
            }
            entries.push(decode_entry(&value)?);
        }
        Ok(entries)
    }

    fn last(&self) -> TimeIndexResult<Option<TimeIndexEntry>> {
        let cf = self.cf(CF_TIME_INDEX)?;
        match self.db.iterator_cf(cf, IteratorMode::End).next() {
            Some(item) => {
                let (_, value) = item.map_err(|e| store_error("iterate", e))?;
                decode_entry(&value).map(Some)
            }
            None => Ok(None),
        }
    }

    fn cursor(&self, source: &SourceId) -> TimeIndexResult<Option<BlockHeight>> {
        let cf = self.cf(CF_SOURCE_CURSORS)?;
        self.db
            .get_cf(cf, source.as_str().as_bytes())
            .map_err(|e| store_error("get", e))?
            .map(|bytes| decode_height(&bytes))
            .transpose()
    }

    fn set_cursor(&self, source: &SourceId, height: BlockHeight) -> TimeIndexResult<()> {
        let cf = self.cf(CF_SOURCE_CURSORS)?;
        self.db
            .put_cf_opt(
                cf,
                source.as_str().as_bytes(),
                height.to_be_bytes(),
                &self.write_opts(),
            )
            .map_err(|e| store_error("put", e))
    }
}
