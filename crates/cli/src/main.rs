//! throttlepipe CLI
//!
//! Copies stdin to stdout at most once per window for a given key.

use clap::{ArgAction, Parser, Subcommand};
use cli_lib::config::{self, Overrides, Settings};
use cli_lib::{cmd, exit, logging};
use std::path::PathBuf;
use std::process::ExitCode;

/// throttlepipe - pass stdin through only if enough time has passed
#[derive(Parser)]
#[command(name = "throttlepipe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// ID for this task/pipe (selects the checkpoint)
    #[arg(short = 'i', long = "id", global = true)]
    id: Option<String>,

    /// Directory where checkpoint records are stored
    #[arg(short = 'd', long = "tmp-path", global = true)]
    tmp_path: Option<PathBuf>,

    /// Minimum time between passes, in minutes
    #[arg(
        short = 't',
        long = "time",
        global = true,
        allow_negative_numbers = true,
        conflicts_with = "window"
    )]
    time: Option<i64>,

    /// Minimum time between passes, in seconds
    #[arg(short = 'w', long = "window", global = true, allow_negative_numbers = true)]
    window: Option<i64>,

    /// Clear the checkpoint for this ID before gating
    #[arg(long = "rm")]
    rm: bool,

    /// Hold an exclusive lock on the checkpoint for the whole invocation
    #[arg(long, global = true)]
    exclusive: bool,

    /// Config file (default: <config dir>/throttlepipe/config.toml)
    #[arg(short = 'c', long, env = config::CONFIG_ENV, global = true)]
    config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the checkpoint for an ID and whether the next run would pass
    Status,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        let file = config::load_file_config(self.config.as_deref())?;
        let overrides = Overrides {
            key: self.id.clone(),
            storage_dir: self.tmp_path.clone(),
            window_minutes: self.time,
            window_secs: self.window,
            reset: self.rm,
            exclusive: self.exclusive,
            verbose: self.verbose,
            log_file: self.log_file.clone(),
        };
        Settings::resolve(overrides, file)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("throttlepipe: {:#}", e);
            return ExitCode::from(exit::FAILURE);
        }
    };

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = match logging::init(&settings.log) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("throttlepipe: {:#}", e);
            return ExitCode::from(exit::FAILURE);
        }
    };

    tracing::debug!(
        key = %settings.key,
        storage_dir = %settings.storage_dir.display(),
        window_secs = settings.window.num_seconds(),
        exclusive = settings.exclusive,
        "Settings resolved"
    );

    let result = match cli.command {
        None => cmd::gate::run(&settings).map(|_| ()),
        Some(Commands::Status) => cmd::status::run(&settings),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Invocation failed");
            eprintln!("throttlepipe: {:#}", e);
            ExitCode::from(exit::code_for(&e))
        }
    }
}
