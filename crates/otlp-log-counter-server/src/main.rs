// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{env, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use otlp_log_counter::{
    config::Config, receiver::LogsReceiver, reporter::LogReporter, service::LogsService,
};

#[tokio::main]
pub async fn main() {
    let log_level = env::var("LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("hyper=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match Config::new() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on log counter startup: {e}");
            return;
        }
    };

    let service = match LogsService::new(&config, Arc::new(LogReporter)) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!("Error creating logs service: {e}");
            return;
        }
    };

    let listener = match LogsReceiver::bind(&config.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Unable to listen on {}: {e}", config.listen_addr);
            service.stop().await;
            return;
        }
    };

    let receiver = Arc::new(LogsReceiver::new(
        Arc::clone(&service),
        config.max_request_content_length,
    ));
    let cancel_token = CancellationToken::new();
    let receiver_handle = tokio::spawn(receiver.serve(listener, cancel_token.clone()));

    info!(
        "Counting '{}' attribute values with {:?} flushes, listening on {}",
        config.attribute_key,
        service.flush_strategy(),
        config.listen_addr
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for shutdown signal: {e}");
    }

    info!("Shutting down");
    cancel_token.cancel();
    match receiver_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Logs receiver failed: {e}"),
        Err(e) => error!("Logs receiver task failed: {e}"),
    }
    service.stop().await;
}
