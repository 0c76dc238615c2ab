//! Authorized request pipeline.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use evently_core::error::{AuthError, Error};
use evently_core::traits::{Dispatcher, Navigator};
use evently_core::{ApiRequest, ApiResponse, AuthMode, Result};

use crate::store::SessionStore;

/// Sends API calls with the current access token and recovers from an
/// expired token at most once per call.
///
/// Per call:
///
/// 1. Attach the current token. Without a session, `AuthMode::Required`
///    calls fail with `AuthError::NoSession`; `AuthMode::Optional` calls go
///    out anonymously.
/// 2. Dispatch.
/// 3. Anything other than a 401 on an authenticated call is returned as is.
/// 4. On a 401, refresh through the [`SessionStore`] (shared with any other
///    call doing the same) and dispatch once more with the new token. A
///    failed refresh or a second 401 ends the session: logout, redirect to
///    login, `AuthError::SessionExpired`.
#[derive(Clone)]
pub struct AuthorizedPipeline {
    session: SessionStore,
    dispatcher: Arc<dyn Dispatcher>,
    navigator: Arc<dyn Navigator>,
}

impl AuthorizedPipeline {
    pub fn new(
        session: SessionStore,
        dispatcher: Arc<dyn Dispatcher>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            dispatcher,
            navigator,
        }
    }

    /// The session store this pipeline draws tokens from.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Perform an API call on behalf of the logged-in user.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn authorized_call(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let (token, epoch) = self.session.snapshot();

        if token.is_none() && request.auth() == AuthMode::Required {
            debug!("No session for an authenticated call");
            return Err(AuthError::NoSession.into());
        }

        let rejected = match self.dispatcher.dispatch(request, token.as_ref()).await {
            Err(e) if e.is_unauthorized() && token.is_some() => e,
            other => return other,
        };

        debug!(error = %rejected, "Access token rejected; refreshing");

        let token = match self.session.refresh_after(epoch).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not renew session");
                return Err(self.end_session());
            }
        };

        match self.dispatcher.dispatch(request, Some(&token)).await {
            Err(e) if e.is_unauthorized() => {
                warn!(error = %e, "Still unauthorized after refresh");
                Err(self.end_session())
            }
            other => other,
        }
    }

    fn end_session(&self) -> Error {
        self.session.logout();
        self.navigator.redirect_to_login();
        AuthError::SessionExpired.into()
    }
}

impl std::fmt::Debug for AuthorizedPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedPipeline")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
