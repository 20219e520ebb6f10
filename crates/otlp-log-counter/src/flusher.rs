// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decides when the tally is flushed and hands flushed tallies to the
//! reporter.
//!
//! Two strategies are supported:
//! - **Inline**: every export checks, after counting, whether a full interval
//!   has passed since the last flush. An idle service never flushes.
//! - **Periodic**: a background task flushes every interval whether or not
//!   traffic arrives. The task stops when its cancellation token fires.

use std::str::FromStr;
use std::sync::Arc;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::aggregator::{Aggregator, Flush};
use crate::errors;
use crate::reporter::Reporter;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlushStrategy {
    /// Flush from the export path once the interval has elapsed.
    Inline,
    /// Flush from a background task on a fixed cadence.
    #[default]
    Periodic,
}

impl FromStr for FlushStrategy {
    type Err = errors::Config;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "inline" => Ok(FlushStrategy::Inline),
            "periodic" => Ok(FlushStrategy::Periodic),
            other => Err(errors::Config::Invalid {
                name: "FLUSH_STRATEGY",
                reason: format!("unknown strategy '{other}', expected 'inline' or 'periodic'"),
            }),
        }
    }
}

#[derive(Clone)]
pub struct Flusher {
    aggregator: Arc<Aggregator>,
    reporter: Arc<dyn Reporter + Send + Sync>,
}

impl Flusher {
    pub fn new(aggregator: Arc<Aggregator>, reporter: Arc<dyn Reporter + Send + Sync>) -> Self {
        Flusher {
            aggregator,
            reporter,
        }
    }

    /// Flushes unconditionally.
    pub fn flush(&self) -> Flush {
        let flush = self.aggregator.snapshot_and_clear();
        self.report(&flush);
        flush
    }

    /// Flushes only if a full interval has passed since the last flush.
    pub fn flush_if_due(&self) -> Option<Flush> {
        let flush = self.aggregator.snapshot_and_clear_if_due()?;
        self.report(&flush);
        Some(flush)
    }

    fn report(&self, flush: &Flush) {
        debug!("Flushing {} distinct values", flush.counts.len());
        if let Err(e) = self
            .reporter
            .report(self.aggregator.attribute_key(), flush)
        {
            error!("Failed to report counts: {e}");
        }
    }

    /// Flushes every interval until `cancel_token` fires.
    pub async fn run_periodic(self, cancel_token: CancellationToken) {
        debug!(
            "Periodic flusher started with interval {:?}",
            self.aggregator.flush_interval()
        );

        let mut flush_interval = interval(self.aggregator.flush_interval());
        flush_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        flush_interval.tick().await; // discard first tick, which is instantaneous

        loop {
            tokio::select! {
                _ = flush_interval.tick() => {
                    self.flush();
                }
                () = cancel_token.cancelled() => {
                    break;
                }
            }
        }

        debug!("Periodic flusher stopped");
    }
}
