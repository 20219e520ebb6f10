// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Attribute key counted when `ATTRIBUTE_KEY` is not set.
pub const DEFAULT_ATTRIBUTE_KEY: &str = "foo";

/// Flush interval used when `REPORT_DURATION` is not set.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(60);

/// OTLP/HTTP default port.
pub const DEFAULT_LISTEN_ADDR: &str = "localhost:4318";

// 16MiB
pub const DEFAULT_MAX_RECEIVE_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

pub const LOGS_ENDPOINT_PATH: &str = "/v1/logs";
