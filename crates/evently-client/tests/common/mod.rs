#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde_json::json;

use evently_client::{AuthorizedPipeline, SessionConfig, SessionStore};
use evently_core::error::{AuthError, ProtocolError, TransportError};
use evently_core::traits::{AuthBackend, Dispatcher, Navigator};
use evently_core::{
    AccessToken, ApiRequest, ApiResponse, Credentials, MemoryStore, RefreshToken,
    RefreshedTokens, Result, TokenPair,
};

/// Build an unsigned JWT whose payload carries the given claims.
///
/// `expires_in` is relative to the wall clock; `tag` keeps otherwise
/// identical tokens distinct.
pub fn jwt(user_id: u64, role: &str, expires_in: i64, tag: &str) -> String {
    let mut payload = claims(user_id, expires_in, tag);
    payload["role"] = json!(role);
    encode(&payload)
}

/// Like [`jwt`], but the payload has no `role` claim at all.
pub fn jwt_without_role(user_id: u64, expires_in: i64, tag: &str) -> String {
    encode(&claims(user_id, expires_in, tag))
}

fn claims(user_id: u64, expires_in: i64, tag: &str) -> serde_json::Value {
    json!({
        "token_type": "access",
        "exp": Utc::now().timestamp() + expires_in,
        "user_id": user_id,
        "username": format!("user{}", user_id),
        "jti": tag,
    })
}

fn encode(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    format!(
        "{}.{}.sig",
        header,
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

/// Yield enough times for spawned tasks to run to completion.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// What the fake refresh endpoint answers next.
pub enum RefreshReply {
    Ok { access: String, refresh: Option<String> },
    Reject,
}

/// Scripted token and refresh endpoints.
#[derive(Default)]
pub struct FakeBackend {
    login_reply: Mutex<Option<(String, String)>>,
    refresh_replies: Mutex<VecDeque<RefreshReply>>,
    refresh_delay: Mutex<Duration>,
    login_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    seen_refresh_tokens: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accept_login(&self, access: impl Into<String>, refresh: impl Into<String>) {
        *self.login_reply.lock().unwrap() = Some((access.into(), refresh.into()));
    }

    pub fn reject_login(&self) {
        *self.login_reply.lock().unwrap() = None;
    }

    pub fn push_refresh(&self, reply: RefreshReply) {
        self.refresh_replies.lock().unwrap().push_back(reply);
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock().unwrap() = delay;
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn seen_refresh_tokens(&self) -> Vec<String> {
        self.seen_refresh_tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn obtain_tokens(&self, _credentials: &Credentials) -> Result<TokenPair> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.login_reply.lock().unwrap().clone();
        match reply {
            Some((access, refresh)) => Ok(TokenPair {
                access: AccessToken::new(access),
                refresh: RefreshToken::new(refresh),
            }),
            None => Err(AuthError::InvalidCredentials.into()),
        }
    }

    async fn refresh_tokens(&self, refresh: &RefreshToken) -> Result<RefreshedTokens> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_refresh_tokens
            .lock()
            .unwrap()
            .push(refresh.as_str().to_string());

        let delay = *self.refresh_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let reply = self.refresh_replies.lock().unwrap().pop_front();
        match reply {
            Some(RefreshReply::Ok { access, refresh }) => Ok(RefreshedTokens {
                access: AccessToken::new(access),
                refresh: refresh.map(RefreshToken::new),
            }),
            Some(RefreshReply::Reject) => Err(ProtocolError::new(
                401,
                Some("token_not_valid".to_string()),
                Some("Token is invalid or expired".to_string()),
            )
            .into()),
            None => Err(TransportError::Connection {
                message: "no scripted refresh reply".to_string(),
            }
            .into()),
        }
    }
}

type Handler = dyn Fn(&ApiRequest, Option<&AccessToken>) -> Result<ApiResponse> + Send + Sync;

/// A dispatcher that answers with a closure and records every call.
pub struct FakeDispatcher {
    handler: Box<Handler>,
    calls: AtomicUsize,
    seen_tokens: Mutex<Vec<Option<String>>>,
    delay: Duration,
}

impl FakeDispatcher {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest, Option<&AccessToken>) -> Result<ApiResponse> + Send + Sync + 'static,
    {
        Self::with_delay(Duration::ZERO, handler)
    }

    pub fn with_delay<F>(delay: Duration, handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest, Option<&AccessToken>) -> Result<ApiResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: AtomicUsize::new(0),
            seen_tokens: Mutex::new(Vec::new()),
            delay,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_tokens(&self) -> Vec<Option<String>> {
        self.seen_tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for FakeDispatcher {
    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_tokens
            .lock()
            .unwrap()
            .push(token.map(|t| t.as_str().to_string()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.handler)(request, token)
    }
}

pub fn unauthorized() -> evently_core::Error {
    ProtocolError::new(401, Some("token_not_valid".to_string()), None).into()
}

/// Counts redirects to login.
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// A store without the proactive timer, for tests that only exercise the
/// reactive path.
pub fn reactive_store(backend: &Arc<FakeBackend>, storage: &Arc<MemoryStore>) -> SessionStore {
    SessionStore::open(
        backend.clone(),
        storage.clone(),
        SessionConfig {
            proactive_refresh: false,
            ..SessionConfig::default()
        },
    )
}

pub fn pipeline(
    store: &SessionStore,
    dispatcher: &Arc<FakeDispatcher>,
    navigator: &Arc<RecordingNavigator>,
) -> AuthorizedPipeline {
    AuthorizedPipeline::new(store.clone(), dispatcher.clone(), navigator.clone())
}

pub fn credentials() -> Credentials {
    Credentials::new("user7", "hunter2")
}
