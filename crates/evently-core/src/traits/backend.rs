//! Network-facing traits.

use async_trait::async_trait;

use crate::request::{ApiRequest, ApiResponse};
use crate::{AccessToken, Credentials, RefreshToken, RefreshedTokens, Result, TokenPair};

/// The authentication endpoints.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for a token pair.
    ///
    /// Rejected credentials must surface as `AuthError::InvalidCredentials`.
    async fn obtain_tokens(&self, credentials: &Credentials) -> Result<TokenPair>;

    /// Exchange a refresh token for a new access token.
    async fn refresh_tokens(&self, refresh: &RefreshToken) -> Result<RefreshedTokens>;
}

/// Sends a single API request.
///
/// Implementations attach `token` as a bearer credential when present and
/// return non-success statuses as `Error::Protocol`.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse>;
}
