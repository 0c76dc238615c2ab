//! Login credentials type.

use std::fmt;

/// Username and password exchanged for a token pair at login.
///
/// # Security
///
/// The password is never exposed in Debug output.
///
/// # Example
///
/// ```
/// use evently_core::Credentials;
///
/// let creds = Credentials::new("alice", "hunter2");
/// assert_eq!(creds.username(), "alice");
/// ```
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
