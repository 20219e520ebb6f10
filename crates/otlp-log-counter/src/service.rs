// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The logs service: the entry point transports call once per decoded batch.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::aggregator::{Aggregator, Counts};
use crate::config::Config;
use crate::errors;
use crate::flusher::{FlushStrategy, Flusher};
use crate::logs::{ExportLogsServiceRequest, ExportLogsServiceResponse};
use crate::reporter::Reporter;
use crate::walker;

struct PeriodicTask {
    cancel_token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

pub struct LogsService {
    aggregator: Arc<Aggregator>,
    flusher: Flusher,
    flush_strategy: FlushStrategy,
    periodic: Option<PeriodicTask>,
    stopped: AtomicBool,
    requests_received: AtomicU64,
}

impl LogsService {
    /// Builds the service and, for [`FlushStrategy::Periodic`], spawns the
    /// flush task on the current tokio runtime.
    pub fn new(
        config: &Config,
        reporter: Arc<dyn Reporter + Send + Sync>,
    ) -> Result<Self, errors::Creation> {
        let aggregator = Arc::new(Aggregator::new(
            config.attribute_key.clone(),
            config.flush_interval,
        )?);
        let flusher = Flusher::new(Arc::clone(&aggregator), reporter);

        let periodic = match config.flush_strategy {
            FlushStrategy::Inline => None,
            FlushStrategy::Periodic => {
                let runtime = Handle::try_current().map_err(|_| errors::Creation::NoRuntime)?;
                let cancel_token = CancellationToken::new();
                let handle = runtime.spawn(flusher.clone().run_periodic(cancel_token.clone()));
                Some(PeriodicTask {
                    cancel_token,
                    handle: Mutex::new(Some(handle)),
                })
            }
        };

        debug!(
            "Logs service counting attribute '{}' with {:?} flushes every {:?}",
            config.attribute_key, config.flush_strategy, config.flush_interval
        );

        Ok(LogsService {
            aggregator,
            flusher,
            flush_strategy: config.flush_strategy,
            periodic,
            stopped: AtomicBool::new(false),
            requests_received: AtomicU64::new(0),
        })
    }

    /// Counts the configured attribute across the whole batch, then, for the
    /// inline strategy, flushes if an interval has elapsed. Always succeeds.
    pub fn export(&self, request: &ExportLogsServiceRequest) -> ExportLogsServiceResponse {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Received ExportLogsServiceRequest with {} resource logs",
            request.resource_logs.len()
        );

        walker::walk(request, &self.aggregator);

        if self.flush_strategy == FlushStrategy::Inline {
            self.flusher.flush_if_due();
        }

        ExportLogsServiceResponse::default()
    }

    /// Copy of the tally since the last flush.
    pub fn snapshot(&self) -> Counts {
        self.aggregator.snapshot()
    }

    pub fn aggregator(&self) -> &Arc<Aggregator> {
        &self.aggregator
    }

    pub fn flush_strategy(&self) -> FlushStrategy {
        self.flush_strategy
    }

    /// Number of export calls served so far.
    pub fn requests_received(&self) -> u64 {
        self.requests_received.load(Ordering::Relaxed)
    }

    /// Stops the periodic flush task, waits for it to finish, then flushes
    /// whatever was counted since the last flush. Later calls do nothing.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            debug!("Logs service already stopped");
            return;
        }

        if let Some(periodic) = &self.periodic {
            periodic.cancel_token.cancel();
            let handle = {
                #[allow(clippy::expect_used)]
                let mut guard = periodic.handle.lock().expect("lock poisoned");
                guard.take()
            };
            if let Some(handle) = handle {
                if let Err(e) = handle.await {
                    error!("Periodic flusher task failed: {e}");
                }
            }
        }

        self.flusher.flush();
        debug!("Logs service stopped");
    }
}
