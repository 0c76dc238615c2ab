//! Client configuration.

use std::time::Duration;

use evently_core::ApiUrl;
use evently_http::AuthEndpoints;

/// How long before expiry the access token is renewed.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Session lifecycle settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Renew the access token this long before it expires.
    pub refresh_margin: Duration,
    /// Run the proactive refresh timer. With it off, tokens are only
    /// renewed after a 401.
    pub proactive_refresh: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            proactive_refresh: true,
        }
    }
}

/// Everything needed to talk to one API deployment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: ApiUrl,
    pub endpoints: AuthEndpoints,
    /// Per-request timeout; `None` leaves it to the transport.
    pub timeout: Option<Duration>,
    pub session: SessionConfig,
}

impl ClientConfig {
    pub fn new(api_url: ApiUrl) -> Self {
        Self {
            api_url,
            endpoints: AuthEndpoints::default(),
            timeout: Some(Duration::from_secs(30)),
            session: SessionConfig::default(),
        }
    }
}
