pub mod kv;
pub mod snapshot;

pub use kv::{KeyValueStore, MemoryStore, SqliteStore, StoreError};
pub use snapshot::{Snapshot, SnapshotStore, REDACTED, STORAGE_KEY, STORAGE_VERSION};
