// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Counts how often each value of one configured attribute key shows up in
//! OTLP log batches, and flushes the tally on a fixed cadence.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod aggregator;
pub mod attributes;
pub mod config;
pub mod constants;
pub mod errors;
pub mod flusher;
pub mod http_utils;
pub mod logs;
pub mod receiver;
pub mod reporter;
pub mod service;
pub mod walker;
