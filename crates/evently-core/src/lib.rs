//! evently-core - Core types and traits for the evently client.

pub mod claims;
pub mod credentials;
pub mod error;
pub mod models;
pub mod request;
pub mod role;
pub mod storage;
pub mod tokens;
pub mod traits;
pub mod types;

pub use claims::{Claims, Identity, decode_claims};
pub use credentials::Credentials;
pub use error::Error;
pub use models::{CheckInOutcome, Event, Registration, UserProfile};
pub use request::{ApiRequest, ApiResponse, AuthMode, HttpMethod};
pub use role::{Access, Role};
pub use storage::MemoryStore;
pub use tokens::{AccessToken, RefreshToken, RefreshedTokens, TokenPair};
pub use traits::{AuthBackend, Dispatcher, KeyValueStore, Navigator, NoopNavigator};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
