//! Wiring for a live HTTP client.

use std::sync::Arc;

use evently_core::Result;
use evently_core::traits::{KeyValueStore, Navigator};
use evently_http::{ApiClient, HttpBackend};

use crate::api::EventsApi;
use crate::config::ClientConfig;
use crate::pipeline::AuthorizedPipeline;
use crate::store::SessionStore;

/// One session store, one pipeline and the typed API, sharing a single
/// HTTP backend.
#[derive(Debug, Clone)]
pub struct Client {
    session: SessionStore,
    pipeline: AuthorizedPipeline,
    events: EventsApi,
}

impl Client {
    /// Build the client and rehydrate any session found in `storage`.
    pub fn connect(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let api = ApiClient::new(config.api_url, config.timeout)?;
        let backend = Arc::new(HttpBackend::new(api, config.endpoints));

        let session = SessionStore::open(backend.clone(), storage, config.session);
        let pipeline = AuthorizedPipeline::new(session.clone(), backend, navigator);
        let events = EventsApi::new(pipeline.clone());

        Ok(Self {
            session,
            pipeline,
            events,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn pipeline(&self) -> &AuthorizedPipeline {
        &self.pipeline
    }

    pub fn events(&self) -> &EventsApi {
        &self.events
    }
}
