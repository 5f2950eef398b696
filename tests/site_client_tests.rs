// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Game site client retry behaviour.

use axum::{extract::State, http::StatusCode, routing::get, Router};
use meno_stats::services::{SiteClient, SiteError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Serve `/stats`, failing the first `failures` requests with `status`.
async fn flaky_site(failures: usize, status: StatusCode) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/stats",
            get(move |State(hits): State<Arc<AtomicUsize>>| async move {
                if hits.fetch_add(1, Ordering::SeqCst) < failures {
                    Err(status)
                } else {
                    Ok("<div class=\"news-body\"></div>")
                }
            }),
        )
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), hits)
}

#[tokio::test]
async fn test_transient_failure_is_retried_once() {
    let (base_url, hits) = flaky_site(1, StatusCode::SERVICE_UNAVAILABLE).await;
    let client = SiteClient::new(&base_url, Duration::from_secs(2)).unwrap();

    let body = client.fetch_online_page().await.unwrap();
    assert!(body.contains("news-body"));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_second_transient_failure_is_returned() {
    let (base_url, hits) = flaky_site(5, StatusCode::BAD_GATEWAY).await;
    let client = SiteClient::new(&base_url, Duration::from_secs(2)).unwrap();

    let err = client.fetch_online_page().await.unwrap_err();
    assert!(matches!(err, SiteError::Status { status: 502, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let (base_url, hits) = flaky_site(5, StatusCode::NOT_FOUND).await;
    let client = SiteClient::new(&base_url, Duration::from_secs(2)).unwrap();

    let err = client.fetch_online_page().await.unwrap_err();
    assert!(matches!(err, SiteError::Status { status: 404, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_site_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = SiteClient::new(&format!("http://{}", addr), Duration::from_secs(1)).unwrap();
    let err = client.fetch_online_page().await.unwrap_err();
    assert!(matches!(err, SiteError::Transport { .. }));
}
