//! Access token claims.
//!
//! The API issues JWT access tokens. The client never verifies signatures;
//! it only reads the payload to learn who is logged in and when the token
//! expires.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, InvalidInputError};
use crate::role::Role;
use crate::tokens::AccessToken;

/// The user an access token was issued to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Stable user identifier (`user_id` or `sub`).
    pub id: String,
    /// Display name (`username`), empty when the token carries none.
    pub name: String,
    pub role: Role,
}

/// Claims decoded from an access token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claims {
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawClaims {
    exp: i64,
    #[serde(alias = "sub", deserialize_with = "string_or_number")]
    user_id: String,
    #[serde(default, alias = "name")]
    username: Option<String>,
    #[serde(default)]
    role: Option<Role>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::InvalidInput(InvalidInputError::Token {
        reason: reason.into(),
    })
}

/// Decode the claims of an access token.
///
/// # Errors
///
/// Returns [`InvalidInputError::Token`] if the token is not a three-part
/// JWT, the payload is not base64url JSON, `exp` or the user id is missing,
/// or the role is not one of the known roles.
pub fn decode_claims(token: &AccessToken) -> Result<Claims, Error> {
    let mut parts = token.as_str().split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(malformed("expected three dot-separated segments")),
    };

    // Some issuers pad; the URL-safe engine here does not accept it.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| malformed(format!("payload is not base64url: {}", e)))?;

    let raw: RawClaims = serde_json::from_slice(&bytes)
        .map_err(|e| malformed(format!("payload is not valid claims JSON: {}", e)))?;

    let expires_at = DateTime::from_timestamp(raw.exp, 0)
        .ok_or_else(|| malformed(format!("exp {} is out of range", raw.exp)))?;

    Ok(Claims {
        identity: Identity {
            id: raw.user_id,
            name: raw.username.unwrap_or_default(),
            role: raw.role.unwrap_or_default(),
        },
        expires_at,
    })
}
