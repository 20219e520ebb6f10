// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use tracing::trace;

use crate::aggregator::Aggregator;
use crate::attributes;
use crate::logs::{ExportLogsServiceRequest, KeyValue};

/// The place in a batch an attribute list hangs from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Resource,
    Scope,
    Log,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Resource => write!(f, "resource"),
            Level::Scope => write!(f, "scope"),
            Level::Log => write!(f, "log"),
        }
    }
}

/// Counts the configured attribute on every resource, scope and log record of
/// `request`. Returns how many sightings were counted.
pub fn walk(request: &ExportLogsServiceRequest, aggregator: &Aggregator) -> usize {
    let mut matches = 0;

    for resource_logs in &request.resource_logs {
        if let Some(resource) = &resource_logs.resource {
            matches += process(&resource.attributes, Level::Resource, aggregator);
        }

        for scope_logs in &resource_logs.scope_logs {
            if let Some(scope) = &scope_logs.scope {
                matches += process(&scope.attributes, Level::Scope, aggregator);
            }

            for log_record in &scope_logs.log_records {
                matches += process(&log_record.attributes, Level::Log, aggregator);
            }
        }
    }

    matches
}

fn process(attributes: &[KeyValue], level: Level, aggregator: &Aggregator) -> usize {
    match attributes::extract(attributes, aggregator.attribute_key()) {
        Some(value) => {
            aggregator.increment(value);
            trace!(
                %level,
                key = aggregator.attribute_key(),
                value,
                "Found attribute"
            );
            1
        }
        None => 0,
    }
}
