//! Typed calls for the event-management API.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use evently_core::error::InvalidInputError;
use evently_core::{
    ApiRequest, CheckInOutcome, Event, Registration, Result, UserProfile,
};

use crate::pipeline::AuthorizedPipeline;

/// List endpoints answer either with a bare array or a paginated object.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Plain(items) => items,
            Listing::Paged { results } => results,
        }
    }
}

/// Event, registration and check-in calls, all routed through the pipeline.
#[derive(Debug, Clone)]
pub struct EventsApi {
    pipeline: AuthorizedPipeline,
}

impl EventsApi {
    pub fn new(pipeline: AuthorizedPipeline) -> Self {
        Self { pipeline }
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.pipeline.authorized_call(&request).await?.json()
    }

    async fn list<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Vec<T>> {
        Ok(self.call::<Listing<T>>(request).await?.into_vec())
    }

    /// All published events. Works logged out.
    #[instrument(skip(self))]
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        self.list(ApiRequest::get("eventApi/").optional_auth()).await
    }

    /// One event by id. Works logged out.
    #[instrument(skip(self))]
    pub async fn get_event(&self, id: u64) -> Result<Event> {
        self.call(ApiRequest::get(format!("eventApi/{}/", id)).optional_auth())
            .await
    }

    /// Register the current user for an event, returning the ticket.
    #[instrument(skip(self))]
    pub async fn register(&self, id: u64) -> Result<Registration> {
        self.call(ApiRequest::post(format!("eventApi/{}/register/", id)))
            .await
    }

    /// Cancel the current user's registration for an event.
    #[instrument(skip(self))]
    pub async fn cancel_registration(&self, id: u64) -> Result<()> {
        self.pipeline
            .authorized_call(&ApiRequest::delete(format!("eventApi/{}/cancel/", id)))
            .await?;
        Ok(())
    }

    /// The current user's tickets.
    #[instrument(skip(self))]
    pub async fn my_registrations(&self) -> Result<Vec<Registration>> {
        self.list(ApiRequest::get("my-registrations/")).await
    }

    /// Everyone registered for an event (organizers and admins).
    #[instrument(skip(self))]
    pub async fn event_registrations(&self, id: u64) -> Result<Vec<Registration>> {
        self.list(ApiRequest::get(format!("events/{}/registrations/", id)))
            .await
    }

    /// Check a ticket in by its public id, as read from the QR code.
    #[instrument(skip(self))]
    pub async fn check_in(&self, public_id: &str) -> Result<CheckInOutcome> {
        let public_id = public_id.trim();
        if public_id.is_empty() {
            return Err(InvalidInputError::Other {
                message: "ticket id is empty".to_string(),
            }
            .into());
        }

        self.call(ApiRequest::post(format!("checkin/{}/", public_id)))
            .await
    }

    /// The profile of the logged-in user.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<UserProfile> {
        self.call(ApiRequest::get("user/")).await
    }
}
