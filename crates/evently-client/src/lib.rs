//! evently-client - Session lifecycle and authorized API calls.
//!
//! All authenticated traffic flows through one [`SessionStore`] and one
//! [`AuthorizedPipeline`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use evently_client::{Client, ClientConfig};
//! use evently_core::{ApiUrl, Credentials, MemoryStore, NoopNavigator};
//!
//! # async fn example() -> Result<(), evently_core::Error> {
//! let config = ClientConfig::new(ApiUrl::new("https://events.example.org/api")?);
//! let client = Client::connect(config, Arc::new(MemoryStore::new()), Arc::new(NoopNavigator))?;
//!
//! let identity = client.session().login(Credentials::new("alice", "hunter2")).await?;
//! println!("logged in as {} ({})", identity.name, identity.role);
//!
//! for event in client.events().list_events().await? {
//!     println!("{}: {}", event.id, event.title);
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod client;
mod config;
mod pipeline;
mod scheduler;
mod session;
mod store;

pub use api::EventsApi;
pub use client::Client;
pub use config::{ClientConfig, SessionConfig};
pub use pipeline::AuthorizedPipeline;
pub use session::Session;
pub use store::SessionStore;
