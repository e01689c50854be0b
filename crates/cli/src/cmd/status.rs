//! Show the checkpoint state of a key

use crate::config::Settings;
use crate::util;
use anyhow::{Context, Result};
use checkpoint::{CheckpointStore, FileCheckpointStore, RecordLock};
use chrono::Utc;
use owo_colors::OwoColorize;
use tp_core::{Gate, GateOptions, SystemClock};

pub fn run(settings: &Settings) -> Result<()> {
    let key = settings.key.as_str();
    let store = FileCheckpointStore::new(&settings.storage_dir);
    let gate = Gate::new(
        &store,
        SystemClock,
        GateOptions {
            window: settings.window,
        },
    );

    let status = gate
        .status(key)
        .with_context(|| format!("Failed to read checkpoint for key '{}'", key))?;
    let now = Utc::now();

    println!("{}", "Checkpoint Status".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    println!("Key:           {}", key.cyan());
    println!("Record:        {}", store.describe(key).dimmed());
    println!("Window:        {}", util::format_duration(settings.window));

    match status.checkpoint {
        None => println!("Last pass:     {}", "no record".yellow()),
        Some(checkpoint) => match checkpoint.last_pass {
            None => println!("Last pass:     {}", "never".yellow()),
            Some(at) => println!(
                "Last pass:     {} ({})",
                util::format_relative_time(at, now),
                util::format_absolute_time(at).dimmed()
            ),
        },
    }

    print!("Next pass:     ");
    match status.remaining {
        None => println!("{}", "now".green()),
        Some(remaining) => println!("in {}", util::format_duration(remaining).yellow()),
    }

    if let Ok(Some(holder)) = RecordLock::holder(&store.record_path(key)) {
        println!(
            "Last lock:     pid {} ({})",
            holder.pid,
            util::format_relative_time(holder.acquired_at, now).dimmed()
        );
    }

    Ok(())
}
