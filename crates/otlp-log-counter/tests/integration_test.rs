// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod common;

use common::helpers::{create_three_level_request, send_tcp_request, RecordingReporter};
use hyper::StatusCode;
use otlp_log_counter::{
    config::Config,
    flusher::FlushStrategy,
    receiver::LogsReceiver,
    service::LogsService,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct RunningReceiver {
    port: u16,
    service: Arc<LogsService>,
    cancel_token: CancellationToken,
    handle: JoinHandle<Result<(), Box<dyn std::error::Error + Send + Sync>>>,
}

async fn start_receiver(config: Config, reporter: Arc<RecordingReporter>) -> RunningReceiver {
    let service = Arc::new(LogsService::new(&config, reporter).expect("failed to create service"));
    let listener = LogsReceiver::bind("127.0.0.1:0")
        .await
        .expect("failed to bind listener");
    let port = listener.local_addr().expect("no local addr").port();

    let receiver = Arc::new(LogsReceiver::new(
        Arc::clone(&service),
        config.max_request_content_length,
    ));
    let cancel_token = CancellationToken::new();
    let handle = tokio::spawn(receiver.serve(listener, cancel_token.clone()));

    RunningReceiver {
        port,
        service,
        cancel_token,
        handle,
    }
}

async fn shutdown(running: RunningReceiver) {
    running.cancel_token.cancel();
    tokio::time::timeout(Duration::from_secs(2), running.handle)
        .await
        .expect("receiver did not stop")
        .expect("receiver task panicked")
        .expect("receiver returned an error");
    running.service.stop().await;
}

#[tokio::test]
async fn test_export_over_http_counts_three_levels() {
    let reporter = Arc::new(RecordingReporter::default());
    let config = Config {
        flush_strategy: FlushStrategy::Inline,
        ..Config::default()
    };
    let running = start_receiver(config, reporter.clone()).await;
    let body = serde_json::to_vec(&create_three_level_request()).unwrap();

    let (response, response_body) = send_tcp_request(
        running.port,
        "/v1/logs",
        "POST",
        "application/json",
        body.clone(),
    )
    .await
    .expect("request failed");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_body, "{}");

    let counts = running.service.snapshot();
    assert_eq!(counts.len(), 3);
    assert_eq!(counts.get("resource_value"), Some(&1));
    assert_eq!(counts.get("scope_value"), Some(&1));
    assert_eq!(counts.get("log_value"), Some(&1));

    send_tcp_request(running.port, "/v1/logs", "POST", "application/json", body)
        .await
        .expect("request failed");
    assert_eq!(running.service.snapshot().get("log_value"), Some(&2));
    assert_eq!(running.service.requests_received(), 2);

    shutdown(running).await;

    // Stopping reports what was left in the tally.
    let flushes = reporter.flushes.lock().unwrap();
    assert_eq!(flushes.len(), 1);
    assert_eq!(flushes[0].counts.get("scope_value"), Some(&2));
}

#[tokio::test]
async fn test_rejected_requests_do_not_count() {
    let reporter = Arc::new(RecordingReporter::default());
    let config = Config {
        flush_strategy: FlushStrategy::Inline,
        max_request_content_length: 64,
        ..Config::default()
    };
    let running = start_receiver(config, reporter).await;

    let (response, response_body) = send_tcp_request(
        running.port,
        "/v1/logs",
        "POST",
        "application/json",
        b"not json".to_vec(),
    )
    .await
    .expect("request failed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response_body.contains("Failed to decode request body"));

    let body = serde_json::to_vec(&create_three_level_request()).unwrap();
    let (response, _) =
        send_tcp_request(running.port, "/v1/logs", "POST", "application/json", body)
            .await
            .expect("request failed");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let (response, _) = send_tcp_request(
        running.port,
        "/v1/logs",
        "POST",
        "application/x-protobuf",
        vec![0x0a],
    )
    .await
    .expect("request failed");
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let (response, _) = send_tcp_request(
        running.port,
        "/v1/metrics",
        "POST",
        "application/json",
        b"{}".to_vec(),
    )
    .await
    .expect("request failed");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert!(running.service.snapshot().is_empty());
    assert_eq!(running.service.requests_received(), 0);

    shutdown(running).await;
}

#[tokio::test]
async fn test_periodic_flush_over_http() {
    let reporter = Arc::new(RecordingReporter::default());
    let config = Config {
        flush_strategy: FlushStrategy::Periodic,
        flush_interval: Duration::from_millis(100),
        ..Config::default()
    };
    let running = start_receiver(config, reporter.clone()).await;
    let body = serde_json::to_vec(&create_three_level_request()).unwrap();

    send_tcp_request(running.port, "/v1/logs", "POST", "application/json", body)
        .await
        .expect("request failed");

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(running.service.aggregator().get("log_value"), 0);

    {
        let flushes = reporter.flushes.lock().unwrap();
        let reported: i64 = flushes
            .iter()
            .map(|flush| flush.counts.get("log_value").copied().unwrap_or(0))
            .sum();
        assert_eq!(reported, 1);
    }

    shutdown(running).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_http_exports_lose_no_updates() {
    const N: usize = 200;
    let reporter = Arc::new(RecordingReporter::default());
    let config = Config {
        flush_strategy: FlushStrategy::Inline,
        flush_interval: Duration::from_secs(3600),
        ..Config::default()
    };
    let running = start_receiver(config, reporter).await;
    let body = serde_json::to_vec(&create_three_level_request()).unwrap();

    let port = running.port;
    let tasks: Vec<_> = (0..N)
        .map(|_| {
            let body = body.clone();
            tokio::spawn(async move {
                let (response, _) =
                    send_tcp_request(port, "/v1/logs", "POST", "application/json", body)
                        .await
                        .expect("request failed");
                assert_eq!(response.status(), StatusCode::OK);
            })
        })
        .collect();
    for task in tasks {
        task.await.expect("request task panicked");
    }

    assert_eq!(running.service.aggregator().get("log_value"), N as i64);
    assert_eq!(running.service.aggregator().get("resource_value"), N as i64);

    shutdown(running).await;
}
