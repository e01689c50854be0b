//! Gate stdin to stdout

use crate::config::Settings;
use anyhow::{Context, Result};
use checkpoint::{FileCheckpointStore, RecordLock};
use std::io::{self, BufWriter};
use tp_core::{Gate, GateError, GateOptions, Outcome, SystemClock};

pub fn run(settings: &Settings) -> Result<Outcome> {
    let key = settings.key.as_str();
    let store = FileCheckpointStore::new(&settings.storage_dir);
    let gate = Gate::new(
        &store,
        SystemClock,
        GateOptions {
            window: settings.window,
        },
    );

    // Held until the end of this function, i.e. past the checkpoint update
    let _lock = if settings.exclusive {
        let lock = RecordLock::acquire(&store.record_path(key))
            .map_err(GateError::from)
            .with_context(|| format!("Failed to lock checkpoint for key '{}'", key))?;
        Some(lock)
    } else {
        None
    };

    if settings.reset {
        gate.reset(key)
            .with_context(|| format!("Failed to clear checkpoint for key '{}'", key))?;
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());

    let outcome = gate
        .run(key, &mut input, &mut output)
        .with_context(|| format!("Gate for key '{}' failed", key))?;

    match outcome {
        Outcome::Blocked {
            last_pass,
            remaining,
        } => {
            tracing::info!(
                key,
                last_pass = %last_pass.to_rfc3339(),
                remaining_secs = remaining.num_seconds(),
                "Blocked, window has not elapsed"
            );
        }
        Outcome::Passed {
            bytes,
            at,
            first_pass,
        } => {
            tracing::info!(
                key,
                bytes,
                checkpoint = %at.to_rfc3339(),
                first_pass,
                "Passed input through"
            );
        }
    }

    Ok(outcome)
}
