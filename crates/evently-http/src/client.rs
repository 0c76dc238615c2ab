//! HTTP client for the REST API.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use evently_core::error::{Error, ProtocolError, TransportError};
use evently_core::{ApiRequest, ApiResponse, ApiUrl, HttpMethod, Result};

use crate::endpoints::ApiErrorResponse;

pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api: ApiUrl,
}

impl ApiClient {
    /// Create a new client for the given API.
    ///
    /// `timeout` bounds each request end to end; `None` leaves it to the
    /// transport.
    pub fn new(api: ApiUrl, timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("evently/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(transport_error)?;

        Ok(Self { client, api })
    }

    /// Returns the API URL this client is configured for.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// POST a JSON body without authorization and decode a typed response.
    #[instrument(skip(self, body), fields(api = %self.api))]
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.api.endpoint(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        trace!(status = %status, "response");

        if status.is_success() {
            response.json::<R>().await.map_err(transport_error)
        } else {
            Err(Error::Protocol(parse_error_response(response).await))
        }
    }

    /// Send an [`ApiRequest`], attaching `token` as a bearer credential.
    #[instrument(skip(self, request, token), fields(api = %self.api, method = %request.method(), path = request.path()))]
    pub async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<ApiResponse> {
        let url = self.api.endpoint(request.path());
        debug!(authed = token.is_some(), "Dispatching API request");
        trace!(query = ?request.query_params(), "query parameters");

        let mut builder = self.client.request(method(request.method()), &url);
        if !request.query_params().is_empty() {
            builder = builder.query(request.query_params());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(transport_error)?;
        handle_response(response).await
    }
}

/// Turn a response into an [`ApiResponse`] or a protocol error.
async fn handle_response(response: reqwest::Response) -> Result<ApiResponse> {
    let status = response.status();
    trace!(status = %status, "response");

    if !status.is_success() {
        return Err(Error::Protocol(parse_error_response(response).await));
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("json"));
    let text = response.text().await.map_err(transport_error)?;

    let body = if text.trim().is_empty() {
        serde_json::Value::Null
    } else if is_json {
        serde_json::from_str(&text).map_err(|e| TransportError::Decode {
            message: e.to_string(),
        })?
    } else {
        // Tolerate JSON served with the wrong content type
        serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
    };

    Ok(ApiResponse::new(status.as_u16(), body))
}

/// Parse an API error response.
async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
    let status = response.status().as_u16();

    match response.json::<ApiErrorResponse>().await {
        Ok(body) => {
            let detail = body.detail.or(body.error).or(body.message);
            ProtocolError::new(status, body.code, detail)
        }
        Err(_) => ProtocolError::new(status, None, None),
    }
}
