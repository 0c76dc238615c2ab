//! reqwest-backed authentication backend and dispatcher.

use async_trait::async_trait;
use tracing::{debug, instrument};

use evently_core::error::{AuthError, Error};
use evently_core::traits::{AuthBackend, Dispatcher};
use evently_core::{
    AccessToken, ApiRequest, ApiResponse, Credentials, RefreshToken, RefreshedTokens, Result,
    TokenPair,
};

use crate::client::ApiClient;
use crate::endpoints::{
    RefreshRequest, RefreshResponse, TOKEN, TOKEN_REFRESH, TokenRequest, TokenResponse,
};

/// Paths of the authentication endpoints, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEndpoints {
    pub token: String,
    pub refresh: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            token: TOKEN.to_string(),
            refresh: TOKEN_REFRESH.to_string(),
        }
    }
}

/// Talks to the real API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: ApiClient,
    endpoints: AuthEndpoints,
}

impl HttpBackend {
    pub fn new(client: ApiClient, endpoints: AuthEndpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn obtain_tokens(&self, credentials: &Credentials) -> Result<TokenPair> {
        let request = TokenRequest {
            username: credentials.username(),
            password: credentials.password(),
        };

        let response: TokenResponse = self
            .client
            .post_json(&self.endpoints.token, &request)
            .await
            .map_err(|e| match e {
                Error::Protocol(ref p) if p.status == 400 || p.status == 401 => {
                    debug!(error = %p, "Token endpoint rejected credentials");
                    Error::Auth(AuthError::InvalidCredentials)
                }
                other => other,
            })?;

        Ok(TokenPair {
            access: AccessToken::new(response.access),
            refresh: RefreshToken::new(response.refresh),
        })
    }

    #[instrument(skip(self, refresh))]
    async fn refresh_tokens(&self, refresh: &RefreshToken) -> Result<RefreshedTokens> {
        let request = RefreshRequest {
            refresh: refresh.as_str(),
        };

        let response: RefreshResponse = self
            .client
            .post_json(&self.endpoints.refresh, &request)
            .await?;

        Ok(RefreshedTokens {
            access: AccessToken::new(response.access),
            refresh: response.refresh.map(RefreshToken::new),
        })
    }
}

#[async_trait]
impl Dispatcher for HttpBackend {
    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        self.client
            .send(request, token.map(AccessToken::as_str))
            .await
    }
}
