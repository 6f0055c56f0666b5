//! Tests for the HTTP environment fetcher

use super::*;
use crate::test_support::spawn_router;
use axum::{http::StatusCode, routing::get, Router};
use std::time::Duration;

fn env_router(status: StatusCode, body: &'static str) -> Router {
    Router::new().route(ENV_PATH, get(move || async move { (status, body) }))
}

#[test]
fn test_env_url_ipv4() {
    assert_eq!(env_url("10.1.2.3", 8080), "http://10.1.2.3:8080/api/v1/env");
}

#[test]
fn test_env_url_ipv6_is_bracketed() {
    assert_eq!(env_url("fd00::1", 8080), "http://[fd00::1]:8080/api/v1/env");
}

#[tokio::test]
async fn test_fetch_env_decodes_flat_object() {
    let (addr, handle) = spawn_router(env_router(
        StatusCode::OK,
        r#"{"APP_VERSION":"1.2.3","DEBUG":"true"}"#,
    ))
    .await;

    let fetcher = HttpEnvFetcher::new();
    let env = fetcher
        .fetch_env(&addr.ip().to_string(), addr.port())
        .await
        .expect("should fetch env");

    assert_eq!(env.len(), 2);
    assert_eq!(env.get("APP_VERSION").map(String::as_str), Some("1.2.3"));
    assert_eq!(env.get("DEBUG").map(String::as_str), Some("true"));

    handle.abort();
}

#[tokio::test]
async fn test_fetch_env_ignores_status_code() {
    let (addr, handle) =
        spawn_router(env_router(StatusCode::INTERNAL_SERVER_ERROR, r#"{"HOME":"/root"}"#)).await;

    let fetcher = HttpEnvFetcher::new();
    let env = fetcher
        .fetch_env(&addr.ip().to_string(), addr.port())
        .await
        .expect("body should be decoded regardless of status");

    assert_eq!(env.get("HOME").map(String::as_str), Some("/root"));

    handle.abort();
}

#[tokio::test]
async fn test_fetch_env_empty_object() {
    let (addr, handle) = spawn_router(env_router(StatusCode::OK, "{}")).await;

    let env = HttpEnvFetcher::new()
        .fetch_env(&addr.ip().to_string(), addr.port())
        .await
        .expect("should fetch env");

    assert!(env.is_empty());

    handle.abort();
}

#[tokio::test]
async fn test_fetch_env_invalid_json_is_decode_error() {
    let (addr, handle) = spawn_router(env_router(StatusCode::NOT_FOUND, "404 page not found")).await;

    let result = HttpEnvFetcher::new()
        .fetch_env(&addr.ip().to_string(), addr.port())
        .await;

    assert!(matches!(result, Err(BackendError::Decode(_))));

    handle.abort();
}

#[tokio::test]
async fn test_fetch_env_nested_object_is_decode_error() {
    let (addr, handle) =
        spawn_router(env_router(StatusCode::OK, r#"{"PATH":{"nested":"value"}}"#)).await;

    let result = HttpEnvFetcher::new()
        .fetch_env(&addr.ip().to_string(), addr.port())
        .await;

    assert!(matches!(result, Err(BackendError::Decode(_))));

    handle.abort();
}

#[tokio::test]
async fn test_fetch_env_times_out() {
    let router = Router::new().route(
        ENV_PATH,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            "{}"
        }),
    );
    let (addr, handle) = spawn_router(router).await;

    let timeout = Duration::from_millis(100);
    let result = HttpEnvFetcher::with_timeout(timeout)
        .fetch_env(&addr.ip().to_string(), addr.port())
        .await;

    match result {
        Err(BackendError::Timeout(t)) => assert_eq!(t, timeout),
        other => panic!("expected Timeout, got {:?}", other),
    }

    handle.abort();
}

#[tokio::test]
async fn test_fetch_env_connection_refused_is_transport() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let result = HttpEnvFetcher::new().fetch_env("127.0.0.1", port).await;

    assert!(matches!(result, Err(BackendError::Transport(_))));
}

/// The bound covers the body too, not just the response headers
#[tokio::test]
async fn test_fetch_env_times_out_on_stalled_body() {
    use axum::body::Body;
    use std::convert::Infallible;

    let router = Router::new().route(
        ENV_PATH,
        get(|| async {
            let chunks = futures::stream::unfold(0u8, |step| async move {
                match step {
                    0 => Some((Ok::<_, Infallible>(r#"{"HOME":"#), 1)),
                    1 => {
                        tokio::time::sleep(Duration::from_secs(2)).await;
                        Some((Ok(r#""/root"}"#), 2))
                    }
                    _ => None,
                }
            });
            Body::from_stream(chunks)
        }),
    );
    let (addr, handle) = spawn_router(router).await;

    let timeout = Duration::from_millis(200);
    let result = HttpEnvFetcher::with_timeout(timeout)
        .fetch_env(&addr.ip().to_string(), addr.port())
        .await;

    match result {
        Err(BackendError::Timeout(t)) => assert_eq!(t, timeout),
        other => panic!("expected Timeout, got {:?}", other),
    }

    handle.abort();
}
