//! The single owner of the authenticated session.

use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use evently_core::Error;
use evently_core::error::{AuthError, StorageError};
use evently_core::traits::{AuthBackend, KeyValueStore};
use evently_core::{AccessToken, Credentials, Identity, Result};

use crate::config::SessionConfig;
use crate::scheduler::RefreshScheduler;
use crate::session::Session;

/// Owns the session: tokens, decoded identity, persistence and the
/// proactive refresh timer.
///
/// Cheap to clone; clones share state. Readers always see a whole
/// session: tokens and identity are swapped together under one lock.
///
/// At most one refresh request is in flight at a time. A caller that
/// arrives while another refresh is running waits for it and takes its
/// result instead of sending its own.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    backend: Arc<dyn AuthBackend>,
    storage: Arc<dyn KeyValueStore>,
    config: SessionConfig,
    state: RwLock<State>,
    refresh_gate: Mutex<()>,
    scheduler: RefreshScheduler,
}

#[derive(Default)]
struct State {
    session: Option<Session>,
    /// Bumped on every login, refresh and logout.
    epoch: u64,
}

impl SessionStore {
    /// Create a store and rehydrate any persisted session.
    ///
    /// Unreadable or malformed persisted data is logged, cleared and
    /// treated as logged out. If a session is restored, the proactive
    /// refresh is scheduled, which requires a Tokio runtime; outside one
    /// the timer is skipped.
    pub fn open(
        backend: Arc<dyn AuthBackend>,
        storage: Arc<dyn KeyValueStore>,
        config: SessionConfig,
    ) -> Self {
        let store = Self {
            inner: Arc::new(StoreInner {
                backend,
                storage,
                config,
                state: RwLock::new(State::default()),
                refresh_gate: Mutex::new(()),
                scheduler: RefreshScheduler::default(),
            }),
        };

        if let Some(session) = store.rehydrate() {
            info!(user = %session.identity().id, "Restored persisted session");
            let mut state = store.inner.state.write().unwrap();
            // Re-persist so the blob and the legacy mirrors agree.
            if let Err(e) = session.persist(store.inner.storage.as_ref()) {
                warn!(error = %e, "Failed to re-persist restored session");
            }
            store.schedule_refresh(session.expires_at());
            state.session = Some(session);
            state.epoch += 1;
        }

        store
    }

    fn rehydrate(&self) -> Option<Session> {
        let storage = self.inner.storage.as_ref();
        match Session::load(storage) {
            Ok(session) => session,
            Err(e @ Error::Storage(StorageError::Corrupt { .. })) => {
                warn!(error = %e, "Discarding malformed persisted session");
                if let Err(e) = Session::clear(storage) {
                    warn!(error = %e, "Failed to clear malformed session");
                }
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                None
            }
        }
    }

    /// Exchange credentials for a session.
    ///
    /// On any failure the existing session, if there is one, is left as it
    /// was.
    ///
    /// # Errors
    ///
    /// `AuthError::InvalidCredentials` if the server rejects the
    /// credentials; transport errors unchanged; a storage error if the new
    /// session could not be persisted.
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    pub async fn login(&self, credentials: Credentials) -> Result<Identity> {
        info!("Logging in");

        let pair = self.inner.backend.obtain_tokens(&credentials).await?;
        let session = Session::from_tokens(pair.access, pair.refresh)?;
        let identity = session.identity().clone();

        {
            let mut state = self.inner.state.write().unwrap();
            session.persist(self.inner.storage.as_ref())?;
            self.schedule_refresh(session.expires_at());
            state.session = Some(session);
            state.epoch += 1;
        }

        info!(user = %identity.id, role = %identity.role, "Logged in");
        Ok(identity)
    }

    /// Obtain a new access token with the refresh token.
    ///
    /// Concurrent calls share one refresh request.
    ///
    /// # Errors
    ///
    /// `AuthError::NoSession` if logged out. `AuthError::RefreshFailed`
    /// if the server rejects the refresh token or cannot be reached; the
    /// session has then been logged out and the caller must not retry.
    pub async fn refresh(&self) -> Result<AccessToken> {
        let epoch = self.inner.state.read().unwrap().epoch;
        self.refresh_after(epoch).await
    }

    /// Refresh unless the session has already changed since `seen_epoch`,
    /// in which case the current token is returned as is.
    #[instrument(skip(self))]
    pub(crate) async fn refresh_after(&self, seen_epoch: u64) -> Result<AccessToken> {
        let _gate = self.inner.refresh_gate.lock().await;

        let refresh_token = {
            let state = self.inner.state.read().unwrap();
            match (&state.session, state.epoch == seen_epoch) {
                (None, _) => return Err(AuthError::NoSession.into()),
                (Some(session), false) => {
                    debug!("Session already renewed; reusing current token");
                    return Ok(session.access_token().clone());
                }
                (Some(session), true) => session.refresh_token().clone(),
            }
        };

        info!("Refreshing session");

        let refreshed = self
            .inner
            .backend
            .refresh_tokens(&refresh_token)
            .await
            .and_then(|tokens| {
                Session::from_tokens(tokens.access, tokens.refresh.unwrap_or(refresh_token))
            });

        let session = match refreshed {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Session refresh failed; logging out");
                self.end_session(Some(seen_epoch));
                return Err(AuthError::RefreshFailed {
                    reason: e.to_string(),
                }
                .into());
            }
        };

        let mut state = self.inner.state.write().unwrap();
        if state.epoch != seen_epoch {
            // Logged out or logged in again while the request was in flight.
            return match &state.session {
                Some(current) => Ok(current.access_token().clone()),
                None => Err(AuthError::NoSession.into()),
            };
        }

        if let Err(e) = session.persist(self.inner.storage.as_ref()) {
            warn!(error = %e, "Failed to persist refreshed session");
        }
        self.schedule_refresh(session.expires_at());

        let token = session.access_token().clone();
        debug!(expires_at = %session.expires_at(), "Session refreshed");
        state.session = Some(session);
        state.epoch += 1;
        Ok(token)
    }

    /// End the session: cancel the refresh timer and wipe memory and
    /// storage. Idempotent; storage failures are only logged.
    pub fn logout(&self) {
        self.end_session(None);
    }

    /// Clear everything, but only if the session is still the one from
    /// `expected` (when given).
    fn end_session(&self, expected: Option<u64>) {
        let mut state = self.inner.state.write().unwrap();
        if expected.is_some_and(|epoch| epoch != state.epoch) {
            return;
        }

        self.inner.scheduler.cancel();
        if let Err(e) = Session::clear(self.inner.storage.as_ref()) {
            warn!(error = %e, "Failed to clear persisted session");
        }
        if state.session.take().is_some() {
            info!("Logged out");
        }
        state.epoch += 1;
    }

    /// The logged-in user, if any.
    pub fn current_identity(&self) -> Option<Identity> {
        self.inner
            .state
            .read()
            .unwrap()
            .session
            .as_ref()
            .map(|s| s.identity().clone())
    }

    /// The current access token, if any.
    pub fn current_access_token(&self) -> Option<AccessToken> {
        self.inner
            .state
            .read()
            .unwrap()
            .session
            .as_ref()
            .map(|s| s.access_token().clone())
    }

    /// A consistent copy of the whole session.
    pub fn current_session(&self) -> Option<Session> {
        self.inner.state.read().unwrap().session.clone()
    }

    /// Returns true if a proactive refresh is scheduled.
    pub fn has_pending_refresh(&self) -> bool {
        self.inner.scheduler.is_pending()
    }

    /// The current token together with the epoch it belongs to.
    pub(crate) fn snapshot(&self) -> (Option<AccessToken>, u64) {
        let state = self.inner.state.read().unwrap();
        (
            state.session.as_ref().map(|s| s.access_token().clone()),
            state.epoch,
        )
    }

    /// Arm the one-shot refresh `refresh_margin` before `expires_at`,
    /// replacing any pending timer. Callers hold the state write lock.
    fn schedule_refresh(&self, expires_at: DateTime<Utc>) {
        if !self.inner.config.proactive_refresh {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            debug!("No Tokio runtime; proactive refresh disabled");
            return;
        }

        let delay = refresh_delay(expires_at - Utc::now(), self.inner.config.refresh_margin);

        if delay.is_zero() {
            debug!(%expires_at, "Access token has expired; refreshing now");
        } else {
            debug!(%expires_at, delay_secs = delay.as_secs(), "Scheduled proactive refresh");
        }

        let weak: Weak<StoreInner> = Arc::downgrade(&self.inner);
        self.inner.scheduler.schedule(delay, move |id| async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.scheduler.claim(id) {
                return;
            }
            let store = SessionStore { inner };
            if let Err(e) = store.refresh().await {
                warn!(error = %e, "Proactive refresh failed");
            }
        });
    }
}

/// How long to wait before refreshing a token with `remaining` lifetime.
///
/// Tokens that live no longer than the margin are refreshed at half their
/// remaining lifetime, so a short-lived token never schedules a zero delay.
fn refresh_delay(remaining: chrono::TimeDelta, margin: Duration) -> Duration {
    let Ok(left) = remaining.to_std() else {
        return Duration::ZERO;
    };
    match left.checked_sub(margin) {
        Some(delay) if !delay.is_zero() => delay,
        _ => left / 2,
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.current_session())
            .field("pending_refresh", &self.has_pending_refresh())
            .finish()
    }
}
