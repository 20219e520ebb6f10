// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The live tally of attribute values and its flush boundary.
//!
//! Every increment takes the write lock for a single map update. Flushing
//! swaps the whole map out under the same lock, so an increment lands either
//! in the captured tally or in the fresh one, never in both and never in
//! neither.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use fnv::FnvBuildHasher;
use hashbrown::HashMap;

use crate::errors;

/// Attribute value to number of sightings.
pub type Counts = HashMap<String, i64, FnvBuildHasher>;

/// A tally captured by a flush, together with the interval it covers.
#[derive(Clone, Debug, PartialEq)]
pub struct Flush {
    pub counts: Counts,
    /// When the previous flush happened, or when the aggregator was created.
    pub interval_start: Instant,
    pub flushed_at: Instant,
}

impl Flush {
    /// Number of sightings across all values.
    pub fn total(&self) -> i64 {
        self.counts.values().sum()
    }
}

#[derive(Debug)]
struct State {
    counts: Counts,
    last_flush: Instant,
}

#[derive(Debug)]
pub struct Aggregator {
    attribute_key: String,
    flush_interval: Duration,
    state: RwLock<State>,
}

impl Aggregator {
    pub fn new(
        attribute_key: impl Into<String>,
        flush_interval: Duration,
    ) -> Result<Self, errors::Creation> {
        let attribute_key = attribute_key.into();
        if attribute_key.is_empty() {
            return Err(errors::Creation::EmptyAttributeKey);
        }
        if flush_interval.is_zero() {
            return Err(errors::Creation::ZeroFlushInterval);
        }

        Ok(Self {
            attribute_key,
            flush_interval,
            state: RwLock::new(State {
                counts: Counts::default(),
                last_flush: Instant::now(),
            }),
        })
    }

    /// The attribute key whose values are counted.
    pub fn attribute_key(&self) -> &str {
        &self.attribute_key
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    pub fn increment(&self, value: &str) {
        let mut state = self.write();
        *state.counts.entry_ref(value).or_insert(0) += 1;
    }

    /// Point-in-time copy of the tally. Does not reset anything.
    pub fn snapshot(&self) -> Counts {
        self.read().counts.clone()
    }

    /// Current count for `value`, `0` when it has not been seen since the
    /// last flush.
    pub fn get(&self, value: &str) -> i64 {
        self.read().counts.get(value).copied().unwrap_or(0)
    }

    pub fn last_flush(&self) -> Instant {
        self.read().last_flush
    }

    /// Captures the tally and replaces it with an empty one.
    pub fn snapshot_and_clear(&self) -> Flush {
        let mut state = self.write();
        Self::take(&mut state, Instant::now())
    }

    /// Same as [`Aggregator::snapshot_and_clear`], but only when at least one
    /// flush interval has elapsed since the last flush. The check and the
    /// reset share one critical section, so concurrent callers flush at most
    /// once per interval.
    pub fn snapshot_and_clear_if_due(&self) -> Option<Flush> {
        let mut state = self.write();
        let now = Instant::now();
        if now.saturating_duration_since(state.last_flush) < self.flush_interval {
            return None;
        }
        Some(Self::take(&mut state, now))
    }

    fn take(state: &mut State, now: Instant) -> Flush {
        let interval_start = std::mem::replace(&mut state.last_flush, now);
        Flush {
            counts: std::mem::take(&mut state.counts),
            interval_start,
            flushed_at: now,
        }
    }

    #[allow(clippy::expect_used)]
    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().expect("lock poisoned")
    }

    #[allow(clippy::expect_used)]
    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().expect("lock poisoned")
    }
}
