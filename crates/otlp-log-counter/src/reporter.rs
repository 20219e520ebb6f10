// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use tracing::info;

use crate::aggregator::Flush;
use crate::errors;

/// Sink for flushed tallies.
///
/// Errors are logged by the caller and otherwise ignored: a failing sink
/// never affects counting.
pub trait Reporter {
    fn report(&self, attribute_key: &str, flush: &Flush) -> Result<(), errors::Report>;
}

/// Writes every flush as a single `info` log line, values sorted.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, attribute_key: &str, flush: &Flush) -> Result<(), errors::Report> {
        let sorted: BTreeMap<&str, i64> = flush
            .counts
            .iter()
            .map(|(value, count)| (value.as_str(), *count))
            .collect();
        let counts = serde_json::to_string(&sorted)?;

        info!(
            key = attribute_key,
            total = flush.total(),
            interval_ms = u64::try_from(
                flush
                    .flushed_at
                    .saturating_duration_since(flush.interval_start)
                    .as_millis()
            )
            .unwrap_or(u64::MAX),
            counts = %counts,
            "Reporting counts"
        );
        Ok(())
    }
}
