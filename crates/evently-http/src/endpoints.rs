//! Wire types for the authentication endpoints.

use serde::{Deserialize, Serialize};

/// Default path of the token endpoint, relative to the API base URL.
pub const TOKEN: &str = "token/";

/// Default path of the refresh endpoint, relative to the API base URL.
pub const TOKEN_REFRESH: &str = "token/refresh/";

/// Request body for the token endpoint.
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response from the token endpoint.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
}

/// Request body for the refresh endpoint.
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response from the refresh endpoint.
/// `refresh` is only present when the server rotates refresh tokens.
#[derive(Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Error body shape used by the API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
