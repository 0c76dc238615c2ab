mod common;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::json;

use evently_core::error::{AuthError, Error, ProtocolError};
use evently_core::{ApiRequest, ApiResponse, MemoryStore};

use common::{
    FakeBackend, FakeDispatcher, RecordingNavigator, RefreshReply, credentials, jwt, pipeline,
    reactive_store, unauthorized,
};

/// 200 for `good`, 401 for anything else.
fn accepts_only(good: String) -> Arc<FakeDispatcher> {
    FakeDispatcher::new(move |_request, token| match token {
        Some(token) if token.as_str() == good => Ok(ApiResponse::new(200, json!({ "ok": true }))),
        _ => Err(unauthorized()),
    })
}

#[tokio::test]
async fn attaches_current_token() {
    let backend = FakeBackend::new();
    let storage = Arc::new(MemoryStore::new());
    let access = jwt(7, "participant", 300, "a1");
    backend.accept_login(access.clone(), "r1");

    let store = reactive_store(&backend, &storage);
    store.login(credentials()).await.unwrap();

    let dispatcher = accepts_only(access.clone());
    let navigator = RecordingNavigator::new();
    let pipeline = pipeline(&store, &dispatcher, &navigator);

    let response = pipeline
        .authorized_call(&ApiRequest::get("my-registrations/"))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(dispatcher.seen_tokens(), vec![Some(access)]);
    assert_eq!(backend.refresh_calls(), 0);
}

#[tokio::test]
async fn retries_exactly_once_after_refresh() {
    let backend = FakeBackend::new();
    let storage = Arc::new(MemoryStore::new());
    let stale = jwt(7, "participant", 300, "a1");
    let renewed = jwt(7, "participant", 600, "a2");
    backend.accept_login(stale.clone(), "r1");
    backend.push_refresh(RefreshReply::Ok {
        access: renewed.clone(),
        refresh: None,
    });

    let store = reactive_store(&backend, &storage);
    store.login(credentials()).await.unwrap();

    let dispatcher = accepts_only(renewed.clone());
    let navigator = RecordingNavigator::new();
    let pipeline = pipeline(&store, &dispatcher, &navigator);

    let response = pipeline
        .authorized_call(&ApiRequest::post("eventApi/1/register/"))
        .await
        .unwrap();

    assert_eq!(response.body["ok"], true);
    assert_eq!(dispatcher.calls(), 2);
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(dispatcher.seen_tokens(), vec![Some(stale), Some(renewed)]);
    assert_eq!(navigator.redirects(), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_401s_share_one_refresh() {
    let backend = FakeBackend::new();
    let storage = Arc::new(MemoryStore::new());
    backend.accept_login(jwt(7, "participant", 300, "a1"), "r1");
    backend.set_refresh_delay(Duration::from_millis(50));
    let renewed = jwt(7, "participant", 600, "a2");
    backend.push_refresh(RefreshReply::Ok {
        access: renewed.clone(),
        refresh: None,
    });

    let store = reactive_store(&backend, &storage);
    store.login(credentials()).await.unwrap();

    let good = renewed.clone();
    let dispatcher = FakeDispatcher::with_delay(Duration::from_millis(10), move |_request, token| {
        match token {
            Some(token) if token.as_str() == good => Ok(ApiResponse::new(200, json!([]))),
            _ => Err(unauthorized()),
        }
    });
    let navigator = RecordingNavigator::new();
    let pipeline = pipeline(&store, &dispatcher, &navigator);

    let request = ApiRequest::get("my-registrations/");
    let results = join_all((0..5).map(|_| pipeline.authorized_call(&request))).await;

    assert_eq!(backend.refresh_calls(), 1);
    for result in results {
        assert_eq!(result.unwrap().status, 200);
    }
    assert_eq!(dispatcher.calls(), 10);
    let retried: Vec<_> = dispatcher.seen_tokens().into_iter().skip(5).collect();
    assert!(retried.iter().all(|t| t.as_deref() == Some(renewed.as_str())));
    assert_eq!(navigator.redirects(), 0);
}

#[tokio::test]
async fn second_401_ends_session() {
    let backend = FakeBackend::new();
    let storage = Arc::new(MemoryStore::new());
    backend.accept_login(jwt(7, "participant", 300, "a1"), "r1");
    backend.push_refresh(RefreshReply::Ok {
        access: jwt(7, "participant", 600, "a2"),
        refresh: None,
    });

    let store = reactive_store(&backend, &storage);
    store.login(credentials()).await.unwrap();

    let dispatcher = FakeDispatcher::new(|_request, _token| Err(unauthorized()));
    let navigator = RecordingNavigator::new();
    let pipeline = pipeline(&store, &dispatcher, &navigator);

    let err = pipeline
        .authorized_call(&ApiRequest::get("user/"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
    assert_eq!(dispatcher.calls(), 2);
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(navigator.redirects(), 1);
    assert!(store.current_session().is_none());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn failed_refresh_ends_session_without_retry() {
    let backend = FakeBackend::new();
    let storage = Arc::new(MemoryStore::new());
    backend.accept_login(jwt(7, "participant", 300, "a1"), "r1");
    backend.push_refresh(RefreshReply::Reject);

    let store = reactive_store(&backend, &storage);
    store.login(credentials()).await.unwrap();

    let dispatcher = FakeDispatcher::new(|_request, _token| Err(unauthorized()));
    let navigator = RecordingNavigator::new();
    let pipeline = pipeline(&store, &dispatcher, &navigator);

    let err = pipeline
        .authorized_call(&ApiRequest::get("user/"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
    assert_eq!(dispatcher.calls(), 1);
    assert_eq!(navigator.redirects(), 1);
    assert!(store.current_session().is_none());
}

#[tokio::test]
async fn required_auth_without_session_is_rejected_locally() {
    let backend = FakeBackend::new();
    let storage = Arc::new(MemoryStore::new());
    let store = reactive_store(&backend, &storage);

    let dispatcher = FakeDispatcher::new(|_request, _token| Ok(ApiResponse::new(200, json!({}))));
    let navigator = RecordingNavigator::new();
    let pipeline = pipeline(&store, &dispatcher, &navigator);

    let err = pipeline
        .authorized_call(&ApiRequest::get("my-registrations/"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::NoSession)));
    assert_eq!(dispatcher.calls(), 0);
    assert_eq!(navigator.redirects(), 0);
}

#[tokio::test]
async fn optional_auth_goes_out_anonymously() {
    let backend = FakeBackend::new();
    let storage = Arc::new(MemoryStore::new());
    let store = reactive_store(&backend, &storage);

    let dispatcher = FakeDispatcher::new(|_request, _token| Ok(ApiResponse::new(200, json!([]))));
    let navigator = RecordingNavigator::new();
    let pipeline = pipeline(&store, &dispatcher, &navigator);

    let response = pipeline
        .authorized_call(&ApiRequest::get("eventApi/").optional_auth())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(dispatcher.seen_tokens(), vec![None]);
}

#[tokio::test]
async fn anonymous_401_is_returned_unchanged() {
    let backend = FakeBackend::new();
    let storage = Arc::new(MemoryStore::new());
    let store = reactive_store(&backend, &storage);

    let dispatcher = FakeDispatcher::new(|_request, _token| Err(unauthorized()));
    let navigator = RecordingNavigator::new();
    let pipeline = pipeline(&store, &dispatcher, &navigator);

    let err = pipeline
        .authorized_call(&ApiRequest::get("eventApi/").optional_auth())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(dispatcher.calls(), 1);
    assert_eq!(backend.refresh_calls(), 0);
    assert_eq!(navigator.redirects(), 0);
}

#[tokio::test]
async fn other_errors_pass_through() {
    let backend = FakeBackend::new();
    let storage = Arc::new(MemoryStore::new());
    backend.accept_login(jwt(7, "participant", 300, "a1"), "r1");

    let store = reactive_store(&backend, &storage);
    store.login(credentials()).await.unwrap();

    let dispatcher = FakeDispatcher::new(|_request, _token| {
        Err(ProtocolError::new(403, None, Some("Only organizers may do that".to_string())).into())
    });
    let navigator = RecordingNavigator::new();
    let pipeline = pipeline(&store, &dispatcher, &navigator);

    let err = pipeline
        .authorized_call(&ApiRequest::get("events/1/registrations/"))
        .await
        .unwrap_err();

    match err {
        Error::Protocol(e) => assert_eq!(e.status, 403),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(dispatcher.calls(), 1);
    assert_eq!(backend.refresh_calls(), 0);
    assert!(store.current_session().is_some());
}

#[tokio::test]
async fn later_calls_use_the_refreshed_token() {
    let backend = FakeBackend::new();
    let storage = Arc::new(MemoryStore::new());
    backend.accept_login(jwt(7, "participant", 300, "a1"), "r1");
    let renewed = jwt(7, "participant", 600, "a2");
    backend.push_refresh(RefreshReply::Ok {
        access: renewed.clone(),
        refresh: None,
    });

    let store = reactive_store(&backend, &storage);
    store.login(credentials()).await.unwrap();

    let dispatcher = accepts_only(renewed.clone());
    let navigator = RecordingNavigator::new();
    let pipeline = pipeline(&store, &dispatcher, &navigator);

    pipeline.authorized_call(&ApiRequest::get("user/")).await.unwrap();
    pipeline.authorized_call(&ApiRequest::get("user/")).await.unwrap();

    assert_eq!(dispatcher.calls(), 3);
    assert_eq!(backend.refresh_calls(), 1);
}
