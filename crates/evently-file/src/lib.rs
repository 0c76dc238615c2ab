//! evently-file - File-backed persisted storage.

mod store;

pub use store::FileStore;
