// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Helper functions for integration tests

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use otlp_log_counter::aggregator::Flush;
use otlp_log_counter::errors;
use otlp_log_counter::logs::{
    ExportLogsServiceRequest, InstrumentationScope, KeyValue, LogRecord, Resource, ResourceLogs,
    ScopeLogs,
};
use otlp_log_counter::reporter::Reporter;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::timeout;

/// Reporter keeping every flush in memory
#[derive(Default)]
pub struct RecordingReporter {
    pub flushes: Mutex<Vec<Flush>>,
}

impl Reporter for RecordingReporter {
    fn report(&self, _attribute_key: &str, flush: &Flush) -> Result<(), errors::Report> {
        self.flushes.lock().unwrap().push(flush.clone());
        Ok(())
    }
}

/// One resource, one scope and one log record, each with a `foo` attribute
pub fn create_three_level_request() -> ExportLogsServiceRequest {
    ExportLogsServiceRequest {
        resource_logs: vec![ResourceLogs {
            resource: Some(Resource {
                attributes: vec![KeyValue::string("foo", "resource_value")],
                ..Default::default()
            }),
            scope_logs: vec![ScopeLogs {
                scope: Some(InstrumentationScope {
                    attributes: vec![KeyValue::string("foo", "scope_value")],
                    ..Default::default()
                }),
                log_records: vec![LogRecord {
                    attributes: vec![KeyValue::string("foo", "log_value")],
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

/// Send an HTTP request over TCP and return the status and body
pub async fn send_tcp_request(
    port: u16,
    uri: &str,
    method: &str,
    content_type: &str,
    body: Vec<u8>,
) -> Result<(Response<()>, String), Box<dyn std::error::Error>> {
    let stream = timeout(
        Duration::from_secs(2),
        tokio::net::TcpStream::connect(format!("127.0.0.1:{}", port)),
    )
    .await??;

    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

    tokio::spawn(async move {
        let _ = conn.await;
    });

    let request = Request::builder()
        .uri(uri)
        .method(method)
        .header("Host", format!("127.0.0.1:{}", port))
        .header("Content-Type", content_type)
        .header("Content-Length", body.len().to_string())
        .body(Full::new(Bytes::from(body)))?;

    let response = timeout(Duration::from_secs(2), sender.send_request(request)).await??;
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await?.to_bytes();

    Ok((
        Response::from_parts(parts, ()),
        String::from_utf8(bytes.to_vec())?,
    ))
}
