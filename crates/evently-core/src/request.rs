//! Transport-neutral API request and response types.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

use crate::error::{Error, TransportError};

/// HTTP methods used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(crate::error::InvalidInputError::Other {
                message: format!("unsupported HTTP method '{}'", s),
            }
            .into()),
        }
    }
}

/// Whether a call needs a session.
///
/// Declared by the caller, never inferred from the path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Fail fast with `NoSession` when logged out.
    #[default]
    Required,
    /// Send without a token when logged out.
    Optional,
}

/// A single REST call, relative to the configured API base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    auth: AuthMode,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth: AuthMode::Required,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(|e| {
            crate::error::InvalidInputError::Other {
                message: format!("request body is not serializable: {}", e),
            }
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Mark the call as tolerating a missing session.
    pub fn optional_auth(mut self) -> Self {
        self.auth = AuthMode::Optional;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn auth(&self) -> AuthMode {
        self.auth
    }
}

/// A successful API response.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `Null` for empty bodies.
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Deserialize the body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        T::deserialize(&self.body).map_err(|e| {
            TransportError::Decode {
                message: e.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_defaults_to_required_auth() {
        let req = ApiRequest::get("eventApi/").query("page", "2");
        assert_eq!(req.method(), HttpMethod::Get);
        assert_eq!(req.auth(), AuthMode::Required);
        assert_eq!(req.query_params(), &[("page".to_string(), "2".to_string())]);
        assert_eq!(req.optional_auth().auth(), AuthMode::Optional);
    }

    #[test]
    fn json_body_and_typed_response() {
        let req = ApiRequest::post("feedback/")
            .json(&json!({ "rating": 5 }))
            .unwrap();
        assert_eq!(req.body(), Some(&json!({ "rating": 5 })));

        #[derive(serde::Deserialize)]
        struct Body {
            rating: u8,
        }
        let response = ApiResponse::new(200, json!({ "rating": 5 }));
        assert_eq!(response.json::<Body>().unwrap().rating, 5);
        assert!(response.json::<Vec<u8>>().is_err());
    }

    #[test]
    fn parses_methods() {
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }
}
