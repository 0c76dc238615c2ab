//! Error types for the evently client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, input validation and storage errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for evently operations.
///
/// Only the session layer interprets [`AuthError`] and 401 responses;
/// every other variant is passed through to the caller unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication and session lifecycle errors.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success responses from the API.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (bad URL, malformed token, unknown role).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Persisted storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true if this error is an HTTP 401 from the API.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Protocol(e) if e.is_unauthorized())
    }

    /// Returns true if this error means the session has ended.
    ///
    /// Callers should route the user back to login instead of retrying.
    pub fn is_session_ended(&self) -> bool {
        matches!(
            self,
            Error::Auth(
                AuthError::NoSession | AuthError::RefreshFailed { .. } | AuthError::SessionExpired
            )
        )
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Response body could not be decoded.
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint rejected the username/password pair.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An operation that needs a session was attempted without one.
    #[error("no active session")]
    NoSession,

    /// The refresh token was rejected or the refresh endpoint was unreachable.
    #[error("session refresh failed: {reason}")]
    RefreshFailed { reason: String },

    /// The API kept answering 401 after a refresh. Terminal.
    #[error("session expired")]
    SessionExpired,
}

/// Protocol-level errors from API responses.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub code: Option<String>,
    /// Human-readable detail from the server.
    pub detail: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, code: Option<String>, detail: Option<String>) -> Self {
        Self {
            status,
            code,
            detail,
        }
    }

    /// Check if this is an authorization failure.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Access token that cannot be decoded into claims.
    #[error("malformed token: {reason}")]
    Token { reason: String },

    /// Role string outside the known set.
    #[error("unknown role '{value}'")]
    Role { value: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Persisted storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// A stored value could not be parsed.
    #[error("corrupt value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}
