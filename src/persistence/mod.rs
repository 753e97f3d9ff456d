//! Persistent records for cross-session progress
//!
//! Features:
//! - `RecordStore`: key → JSON value store (memory, JSON files, LocalStorage)
//! - `Records`: typed accessors with the default-on-failure policy
//! - Write-through: every change is written as soon as it happens

pub mod records;
pub mod store;

pub use records::{Records, SharedStore, keys};
#[cfg(not(target_arch = "wasm32"))]
pub use store::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageStore;
pub use store::{MemoryStore, RecordStore, StoreError};
