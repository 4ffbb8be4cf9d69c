//! HttpStatsSource against a mocked stats endpoint

use assert_matches::assert_matches;
use statwatch::fetch::{FetchError, StatsSource};
use wiremock::{MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_fetch_returns_body() {
    let server = MockServer::start().await;
    mount_stats(
        &server,
        ResponseTemplate::new(200).set_body_string("10,100,50,200,20,500,100\n"),
    )
    .await;

    let source = http_source(&stats_url(&server));
    let body = source.fetch().await.unwrap();

    assert_eq!(body, "10,100,50,200,20,500,100\n");
}

#[tokio::test]
async fn test_fetch_non_success_status_is_error() {
    let server = MockServer::start().await;
    mount_stats(&server, ResponseTemplate::new(503)).await;

    let source = http_source(&stats_url(&server));

    assert_matches!(source.fetch().await, Err(FetchError::Status(status)) if status.as_u16() == 503);
}

#[tokio::test]
async fn test_fetch_not_found_is_error() {
    let server = MockServer::start().await;

    // nothing mounted, wiremock answers 404
    let source = http_source(&stats_url(&server));

    assert_matches!(source.fetch().await, Err(FetchError::Status(_)));
}

#[tokio::test]
async fn test_fetch_empty_body_is_error() {
    let server = MockServer::start().await;
    mount_stats(&server, ResponseTemplate::new(200).set_body_string("  \n")).await;

    let source = http_source(&stats_url(&server));

    assert_matches!(source.fetch().await, Err(FetchError::EmptyBody));
}

#[tokio::test]
async fn test_fetch_unreachable_is_error() {
    // nothing listens on this port
    let source = http_source("http://127.0.0.1:9/_stats");

    assert_matches!(source.fetch().await, Err(FetchError::Request(_)));
}

#[tokio::test]
async fn test_fetch_times_out() {
    let server = MockServer::start().await;
    mount_stats(
        &server,
        ResponseTemplate::new(200)
            .set_body_string("1,1,1,1,1,1,1")
            .set_delay(std::time::Duration::from_secs(5)),
    )
    .await;

    let source = statwatch::fetch::HttpStatsSource::new(
        stats_url(&server),
        std::time::Duration::from_millis(200),
    )
    .unwrap();

    assert_matches!(source.fetch().await, Err(FetchError::Request(e)) if e.is_timeout());
}
