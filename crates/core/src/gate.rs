//! Gate controller
//!
//! One invocation walks `START -> LOADED -> DECIDED_BLOCK | DECIDED_PASS`,
//! and on a pass continues `COPYING -> COMMITTED`. The checkpoint is written
//! only after the whole input reached the output, using the time sampled at
//! decision, so a failed transfer never spends the window and a long
//! transfer never stretches it.
//!
//! Load, decide, copy and store are not one transaction: two processes on
//! the same key can both pass inside one window and the later write wins.
//! Callers that need mutual exclusion hold a `checkpoint::RecordLock` around
//! `run`.

use crate::clock::Clock;
use crate::copy::copy_stream;
use crate::decision;
use crate::Result;
use checkpoint::{Checkpoint, CheckpointStore};
use chrono::{DateTime, Duration, Utc};
use std::io::{Read, Write};

/// Per-invocation gate settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateOptions {
    /// Minimum time between two passes of the same key
    pub window: Duration,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            window: Duration::minutes(1),
        }
    }
}

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing copied, checkpoint untouched
    Blocked {
        last_pass: DateTime<Utc>,
        remaining: Duration,
    },
    /// Input fully copied and checkpoint moved to `at`
    Passed {
        bytes: u64,
        at: DateTime<Utc>,
        /// Whether the key had never passed before
        first_pass: bool,
    },
}

impl Outcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }
}

/// Non-mutating view of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// The stored record, `None` if the key has no record yet
    pub checkpoint: Option<Checkpoint>,
    /// Whether an invocation right now would pass
    pub would_pass: bool,
    /// Time until the next pass is allowed
    pub remaining: Option<Duration>,
}

/// Throttle gate over a checkpoint store
pub struct Gate<S, C> {
    store: S,
    clock: C,
    options: GateOptions,
}

impl<S: CheckpointStore, C: Clock> Gate<S, C> {
    pub fn new(store: S, clock: C, options: GateOptions) -> Self {
        Self {
            store,
            clock,
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one gate invocation for `key`
    pub fn run<R, W>(&self, key: &str, input: &mut R, output: &mut W) -> Result<Outcome>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        let loaded = self.store.load(key)?;
        tracing::debug!(
            key,
            state = "LOADED",
            existed = loaded.existed,
            last_pass = %loaded.checkpoint,
            "Checkpoint loaded"
        );

        let now = self.clock.now();
        let last = loaded.checkpoint.last_pass;

        if !decision::should_pass(now, last, self.options.window) {
            let remaining =
                decision::remaining(now, last, self.options.window).unwrap_or_else(Duration::zero);
            tracing::debug!(
                key,
                state = "DECIDED_BLOCK",
                remaining_secs = remaining.num_seconds(),
                "Window not elapsed"
            );

            // Blocking is only reachable with a recorded pass
            let last_pass = last.unwrap_or(now);
            return Ok(Outcome::Blocked {
                last_pass,
                remaining,
            });
        }

        tracing::debug!(key, state = "DECIDED_PASS", now = %now.to_rfc3339(), "Window elapsed");
        tracing::debug!(key, state = "COPYING", "Copying input to output");

        let bytes = match copy_stream(input, output) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(key, error = %e, "Transfer failed, checkpoint not set");
                return Err(e.into());
            }
        };

        self.store.store(key, now)?;
        tracing::debug!(key, state = "COMMITTED", bytes, "Checkpoint committed");

        Ok(Outcome::Passed {
            bytes,
            at: now,
            first_pass: last.is_none(),
        })
    }

    /// Delete the record for `key`
    pub fn reset(&self, key: &str) -> Result<bool> {
        let removed = self.store.clear(key)?;
        if removed {
            tracing::warn!(key, location = %self.store.describe(key), "Checkpoint cleared");
        } else {
            tracing::debug!(key, "No checkpoint to clear");
        }
        Ok(removed)
    }

    /// Report the state of `key` without touching its record
    pub fn status(&self, key: &str) -> Result<Status> {
        let checkpoint = self.store.inspect(key)?;
        let now = self.clock.now();
        let last = checkpoint.and_then(|c| c.last_pass);

        Ok(Status {
            checkpoint,
            would_pass: decision::should_pass(now, last, self.options.window),
            remaining: decision::remaining(now, last, self.options.window),
        })
    }
}
