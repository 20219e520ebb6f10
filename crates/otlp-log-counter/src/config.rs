// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ATTRIBUTE_KEY, DEFAULT_FLUSH_INTERVAL, DEFAULT_LISTEN_ADDR,
    DEFAULT_MAX_RECEIVE_MESSAGE_SIZE,
};
use crate::errors;
use crate::flusher::FlushStrategy;

const ENV_ATTRIBUTE_KEY: &str = "ATTRIBUTE_KEY";
const ENV_REPORT_DURATION: &str = "REPORT_DURATION";
const ENV_FLUSH_STRATEGY: &str = "FLUSH_STRATEGY";
const ENV_LISTEN_ADDR: &str = "LISTEN_ADDR";
const ENV_MAX_RECEIVE_MESSAGE_SIZE: &str = "MAX_RECEIVE_MESSAGE_SIZE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Attribute key whose values are counted
    pub attribute_key: String,
    /// how often the tally is flushed
    pub flush_interval: Duration,
    pub flush_strategy: FlushStrategy,
    /// Address the receiver binds to. Only the receiver reads it.
    pub listen_addr: String,
    /// Largest request body accepted, in bytes
    pub max_request_content_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            attribute_key: DEFAULT_ATTRIBUTE_KEY.to_string(),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            flush_strategy: FlushStrategy::default(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_request_content_length: DEFAULT_MAX_RECEIVE_MESSAGE_SIZE,
        }
    }
}

impl Config {
    /// Reads the configuration from the environment. Unset variables fall back
    /// to their defaults; variables that are set but unusable are errors.
    pub fn new() -> Result<Config, errors::Config> {
        let defaults = Config::default();

        let attribute_key = match env::var(ENV_ATTRIBUTE_KEY) {
            Ok(key) if key.trim().is_empty() => {
                return Err(errors::Config::Empty(ENV_ATTRIBUTE_KEY))
            }
            Ok(key) => key,
            Err(_) => defaults.attribute_key,
        };

        let flush_interval = match env::var(ENV_REPORT_DURATION) {
            Ok(value) => parse_flush_interval(&value)?,
            Err(_) => defaults.flush_interval,
        };

        let flush_strategy = match env::var(ENV_FLUSH_STRATEGY) {
            Ok(value) => value.parse()?,
            Err(_) => defaults.flush_strategy,
        };

        let listen_addr = match env::var(ENV_LISTEN_ADDR) {
            Ok(addr) if addr.trim().is_empty() => return Err(errors::Config::Empty(ENV_LISTEN_ADDR)),
            Ok(addr) => addr,
            Err(_) => defaults.listen_addr,
        };

        let max_request_content_length = match env::var(ENV_MAX_RECEIVE_MESSAGE_SIZE) {
            Ok(value) => parse_message_size(&value)?,
            Err(_) => defaults.max_request_content_length,
        };

        Ok(Config {
            attribute_key,
            flush_interval,
            flush_strategy,
            listen_addr,
            max_request_content_length,
        })
    }
}

/// Parses durations such as `100ms`, `1m` or `1h30m`.
pub fn parse_flush_interval(value: &str) -> Result<Duration, errors::Config> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(errors::Config::Empty(ENV_REPORT_DURATION));
    }
    let interval = humantime::parse_duration(trimmed).map_err(|e| errors::Config::Invalid {
        name: ENV_REPORT_DURATION,
        reason: e.to_string(),
    })?;
    if interval.is_zero() {
        return Err(errors::Config::Invalid {
            name: ENV_REPORT_DURATION,
            reason: "duration must be greater than zero".to_string(),
        });
    }
    Ok(interval)
}

fn parse_message_size(value: &str) -> Result<usize, errors::Config> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(errors::Config::Invalid {
            name: ENV_MAX_RECEIVE_MESSAGE_SIZE,
            reason: "size must be greater than zero".to_string(),
        }),
        Ok(size) => Ok(size),
        Err(e) => Err(errors::Config::Invalid {
            name: ENV_MAX_RECEIVE_MESSAGE_SIZE,
            reason: e.to_string(),
        }),
    }
}
