// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! OTLP/HTTP receiver for JSON encoded log batches.
//!
//! `POST /v1/logs` bodies are decoded into an [`ExportLogsServiceRequest`]
//! and handed to the [`LogsService`]. Transport problems (size limits,
//! unsupported encodings, malformed JSON) are answered here and never reach
//! the service.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper::{header, http, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::constants::LOGS_ENDPOINT_PATH;
use crate::http_utils::{
    self, log_and_create_http_response, verify_request_content_length, HttpResponse,
    PayloadEncoding,
};
use crate::logs::ExportLogsServiceRequest;
use crate::service::LogsService;

const ERROR_PREFIX: &str = "Error processing logs";

pub struct LogsReceiver {
    service: Arc<LogsService>,
    max_request_content_length: usize,
}

impl LogsReceiver {
    pub fn new(service: Arc<LogsService>, max_request_content_length: usize) -> Self {
        LogsReceiver {
            service,
            max_request_content_length,
        }
    }

    pub async fn bind(listen_addr: &str) -> io::Result<TcpListener> {
        TcpListener::bind(listen_addr).await
    }

    /// Accepts connections until `cancel_token` fires. Connections still open
    /// at that point are aborted.
    pub async fn serve(
        self: Arc<Self>,
        listener: TcpListener,
        cancel_token: CancellationToken,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        debug!("Logs receiver listening on {:?}", listener.local_addr());

        let server = hyper::server::conn::http1::Builder::new();
        let mut joinset = JoinSet::new();

        loop {
            let conn = tokio::select! {
                () = cancel_token.cancelled() => {
                    break;
                },
                con_res = listener.accept() => match con_res {
                    Err(e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::ConnectionAborted
                                | io::ErrorKind::ConnectionReset
                                | io::ErrorKind::ConnectionRefused
                        ) =>
                    {
                        continue;
                    }
                    Err(e) => {
                        error!("Server error: {e}");
                        return Err(e.into());
                    }
                    Ok((conn, _)) => conn,
                },
                finished = async {
                    match joinset.join_next().await {
                        Some(finished) => finished,
                        None => std::future::pending().await,
                    }
                } => match finished {
                    Err(e) if e.is_panic() => {
                        // Don't kill server on panic - log and continue
                        error!("Connection handler panicked: {:?}", e);
                        continue;
                    },
                    Ok(()) | Err(_) => continue,
                },
            };
            let conn = TokioIo::new(conn);
            let server = server.clone();
            let receiver = Arc::clone(&self);
            joinset.spawn(async move {
                let service = service_fn(move |req| {
                    let receiver = Arc::clone(&receiver);
                    async move { receiver.handle(req).await }
                });
                if let Err(e) = server.serve_connection(conn, service).await {
                    error!("Connection error: {e}");
                }
            });
        }

        joinset.shutdown().await;
        debug!("Logs receiver stopped");
        Ok(())
    }

    /// Routes one request.
    pub async fn handle<B>(&self, req: Request<B>) -> http::Result<HttpResponse>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        if req.uri().path() != LOGS_ENDPOINT_PATH {
            return log_and_create_http_response(
                &format!("Not found: {}", req.uri().path()),
                StatusCode::NOT_FOUND,
            );
        }
        if req.method() != Method::POST {
            return log_and_create_http_response(
                &format!("{ERROR_PREFIX}: Method {} not allowed", req.method()),
                StatusCode::METHOD_NOT_ALLOWED,
            );
        }
        self.export(req).await
    }

    async fn export<B>(&self, req: Request<B>) -> http::Result<HttpResponse>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();

        if let Some(response) = verify_request_content_length(
            &parts.headers,
            self.max_request_content_length,
            ERROR_PREFIX,
        ) {
            return response;
        }

        match http_utils::payload_encoding(&parts.headers) {
            PayloadEncoding::Json => {}
            PayloadEncoding::Protobuf => {
                return log_and_create_http_response(
                    &format!("{ERROR_PREFIX}: Protobuf payloads are not supported, use JSON"),
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                );
            }
            PayloadEncoding::Other => {
                return log_and_create_http_response(
                    &format!("{ERROR_PREFIX}: Unsupported Content-Type"),
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                );
            }
        }

        // double check the size in case transfer encoding is used
        let body = match Limited::new(body, self.max_request_content_length)
            .collect()
            .await
        {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                return log_and_create_http_response(
                    &format!("{ERROR_PREFIX}: Payload too large"),
                    StatusCode::PAYLOAD_TOO_LARGE,
                );
            }
            Err(e) => {
                return log_and_create_http_response(
                    &format!("{ERROR_PREFIX}: Failed to read request body: {e}"),
                    StatusCode::BAD_REQUEST,
                );
            }
        };

        let request: ExportLogsServiceRequest = match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => {
                return log_and_create_http_response(
                    &format!("{ERROR_PREFIX}: Failed to decode request body: {e}"),
                    StatusCode::BAD_REQUEST,
                );
            }
        };

        let response = self.service.export(&request);

        match serde_json::to_vec(&response) {
            Ok(body) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from(body))),
            Err(e) => log_and_create_http_response(
                &format!("{ERROR_PREFIX}: Failed to encode response: {e}"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        }
    }
}
