//! Seams between the session layer and its collaborators.

mod backend;
mod navigator;
mod storage;

pub use backend::{AuthBackend, Dispatcher};
pub use navigator::{Navigator, NoopNavigator};
pub use storage::KeyValueStore;
