//! The session value and its persisted form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use evently_core::error::{Error, StorageError};
use evently_core::traits::KeyValueStore;
use evently_core::{AccessToken, Identity, RefreshToken, Result, decode_claims};

/// Storage key holding the whole token pair as one JSON blob.
pub(crate) const AUTH_TOKENS_KEY: &str = "authTokens";

/// Legacy mirror of the access token.
pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";

/// Legacy mirror of the refresh token.
pub(crate) const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// An authenticated session.
///
/// The identity and expiry are always decoded from the access token they
/// are stored with; there is no way to set them independently.
#[derive(Clone)]
pub struct Session {
    access_token: AccessToken,
    refresh_token: RefreshToken,
    identity: Identity,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Build a session from a token pair, decoding the access token.
    pub(crate) fn from_tokens(access_token: AccessToken, refresh_token: RefreshToken) -> Result<Self> {
        let claims = decode_claims(&access_token)?;
        Ok(Self {
            access_token,
            refresh_token,
            identity: claims.identity,
            expires_at: claims.expires_at,
        })
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Write the blob and both legacy mirrors in one storage update.
    pub(crate) fn persist(&self, storage: &dyn KeyValueStore) -> Result<()> {
        let stored = StoredTokens {
            access: self.access_token.as_str().to_string(),
            refresh: self.refresh_token.as_str().to_string(),
        };
        let json = serde_json::to_string(&stored).map_err(|e| StorageError::Io {
            message: e.to_string(),
        })?;

        storage.set_many(&[
            (AUTH_TOKENS_KEY, json.as_str()),
            (ACCESS_TOKEN_KEY, self.access_token.as_str()),
            (REFRESH_TOKEN_KEY, self.refresh_token.as_str()),
        ])
    }

    /// Load a persisted session.
    ///
    /// `Ok(None)` means nothing usable was stored. Corrupt data comes back
    /// as `StorageError::Corrupt`; the caller decides whether to clear it.
    pub(crate) fn load(storage: &dyn KeyValueStore) -> Result<Option<Self>> {
        if let Some(raw) = storage.get(AUTH_TOKENS_KEY)? {
            let stored: StoredTokens =
                serde_json::from_str(&raw).map_err(|e| corrupt(AUTH_TOKENS_KEY, e))?;
            return Self::from_stored(stored, AUTH_TOKENS_KEY).map(Some);
        }

        let access = storage.get(ACCESS_TOKEN_KEY)?;
        let refresh = storage.get(REFRESH_TOKEN_KEY)?;
        match (access, refresh) {
            (Some(access), Some(refresh)) => {
                Self::from_stored(StoredTokens { access, refresh }, ACCESS_TOKEN_KEY).map(Some)
            }
            (None, None) => Ok(None),
            (Some(_), None) => Err(corrupt(ACCESS_TOKEN_KEY, "refresh token is missing")),
            (None, Some(_)) => Err(corrupt(REFRESH_TOKEN_KEY, "access token is missing")),
        }
    }

    fn from_stored(stored: StoredTokens, key: &str) -> Result<Self> {
        if stored.access.is_empty() || stored.refresh.is_empty() {
            return Err(corrupt(key, "empty token"));
        }
        Self::from_tokens(
            AccessToken::new(stored.access),
            RefreshToken::new(stored.refresh),
        )
        .map_err(|e| corrupt(key, e))
    }

    /// Remove every key the session is stored under.
    pub(crate) fn clear(storage: &dyn KeyValueStore) -> Result<()> {
        storage.remove_many(&[AUTH_TOKENS_KEY, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY])
    }
}

fn corrupt(key: &str, reason: impl ToString) -> Error {
    Error::Storage(StorageError::Corrupt {
        key: key.to_string(),
        reason: reason.to_string(),
    })
}

/// Persisted JSON shape, as returned by the token endpoint.
#[derive(Serialize, Deserialize)]
struct StoredTokens {
    access: String,
    refresh: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("expires_at", &self.expires_at)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
