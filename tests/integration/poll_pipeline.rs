//! Full fetch → decode → evaluate → emit cycles over HTTP

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use statwatch::{
    DecodeError,
    actors::{
        collector::StatsCollectorActor,
        messages::PollOutcome,
    },
};
use tokio::sync::mpsc;
use wiremock::{MockServer, ResponseTemplate};

use crate::helpers::*;

const MIB: u64 = 1024 * 1024;

#[tokio::test]
async fn test_healthy_server_emits_nothing() {
    let server = MockServer::start().await;
    mount_stats(
        &server,
        ResponseTemplate::new(200).set_body_string("10,100,50,200,20,500,100"),
    )
    .await;

    let url = stats_url(&server);
    let sink = RecordingSink::default();
    let (_tx, rx) = mpsc::channel(1);
    let mut actor = StatsCollectorActor::new(
        &create_test_config(&url),
        Box::new(http_source(&url)),
        sink.dispatcher(),
        rx,
    );

    assert_eq!(actor.poll_once().await, PollOutcome::Evaluated { alerts: 0 });
    assert!(sink.lines().is_empty());
}

#[tokio::test]
async fn test_overloaded_server_emits_every_alert() {
    let server = MockServer::start().await;
    let disk_total = 200 * MIB;
    let disk_used = disk_total - (10 * MIB - 1);
    let body = format!(" 42.5, 1000, 900, {disk_total}, {disk_used}, 1000000000, 950000000 \n");
    mount_stats(&server, ResponseTemplate::new(200).set_body_string(body)).await;

    let url = stats_url(&server);
    let sink = RecordingSink::default();
    let (_tx, rx) = mpsc::channel(1);
    let mut actor = StatsCollectorActor::new(
        &create_test_config(&url),
        Box::new(http_source(&url)),
        sink.dispatcher(),
        rx,
    );

    assert_eq!(actor.poll_once().await, PollOutcome::Evaluated { alerts: 4 });
    assert_eq!(
        sink.lines(),
        vec![
            "Load Average is too high: 43",
            "Memory usage too high: 90%",
            "Free disk space is too low: 9 Mb left",
            "Network bandwidth usage high: 400 Mbit/s available",
        ]
    );
}

#[tokio::test]
async fn test_failing_server_escalates_once_per_three_polls() {
    let server = MockServer::start().await;
    mount_stats(&server, ResponseTemplate::new(500)).await;

    let url = stats_url(&server);
    let sink = RecordingSink::default();
    let (_tx, rx) = mpsc::channel(1);
    let mut actor = StatsCollectorActor::new(
        &create_test_config(&url),
        Box::new(http_source(&url)),
        sink.dispatcher(),
        rx,
    );

    let mut outcomes = Vec::new();
    for _ in 0..6 {
        outcomes.push(actor.poll_once().await);
    }

    let escalated = |escalated| PollOutcome::FetchFailed { escalated };
    assert_eq!(
        outcomes,
        vec![
            escalated(false),
            escalated(false),
            escalated(true),
            escalated(false),
            escalated(false),
            escalated(true),
        ]
    );
    assert_eq!(
        sink.lines(),
        vec![
            "Unable to fetch server statistic",
            "Unable to fetch server statistic"
        ]
    );
}

#[tokio::test]
async fn test_malformed_payload_is_dropped_silently() {
    let server = MockServer::start().await;
    mount_stats(&server, ResponseTemplate::new(200).set_body_string("a,b,c,d,e,f,g")).await;

    let url = stats_url(&server);
    let sink = RecordingSink::default();
    let (_tx, rx) = mpsc::channel(1);
    let mut actor = StatsCollectorActor::new(
        &create_test_config(&url),
        Box::new(http_source(&url)),
        sink.dispatcher(),
        rx,
    );

    for _ in 0..4 {
        assert_matches!(
            actor.poll_once().await,
            PollOutcome::Malformed(DecodeError::NumberFormat { index: 0, .. })
        );
    }
    assert_eq!(actor.consecutive_failures(), 0);
    assert!(sink.lines().is_empty());
}
