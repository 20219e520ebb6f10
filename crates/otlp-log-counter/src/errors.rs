// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Failure to build an aggregator from its arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Creation {
    #[error("attribute key must not be empty")]
    EmptyAttributeKey,
    #[error("flush interval must be greater than zero")]
    ZeroFlushInterval,
    #[error("periodic flushing needs a running tokio runtime")]
    NoRuntime,
}

/// Failure to read the process configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Config {
    #[error("{0} environment variable is set but empty")]
    Empty(&'static str),
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Failure reported by a [`crate::reporter::Reporter`]. Never propagated to
/// ingestion callers.
#[derive(Debug, Error)]
pub enum Report {
    #[error("failed to serialize counts: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("reporting sink unavailable: {0}")]
    Unavailable(String),
}
