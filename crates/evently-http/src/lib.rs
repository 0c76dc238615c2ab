//! evently-http - reqwest-backed transport for the evently client.

mod backend;
mod client;
mod endpoints;

pub use backend::{AuthEndpoints, HttpBackend};
pub use client::ApiClient;
