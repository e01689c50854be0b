//! Helpers for running the `throttlepipe` binary
//!
//! Each test gets an isolated environment: its own storage directory and
//! config home, so a developer's real config never leaks in.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Isolated storage and config locations for one test
pub struct GateEnv {
    root: TempDir,
}

impl GateEnv {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir_all(root.path().join("state")).unwrap();
        std::fs::create_dir_all(root.path().join("config")).unwrap();
        Self { root }
    }

    /// Directory passed as `--tmp-path`
    pub fn storage_dir(&self) -> PathBuf {
        self.root.path().join("state")
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Record file for `key`
    pub fn record_path(&self, key: &str) -> PathBuf {
        checkpoint::layout::record_path(&self.storage_dir(), key)
    }

    /// A command preconfigured for this environment
    pub fn command(&self) -> TpCommand {
        let storage_dir = self.storage_dir().to_string_lossy().to_string();
        let mut cmd = self.bare_command();
        cmd.args(&["--tmp-path", storage_dir.as_str()]);
        cmd
    }

    /// A command with the isolated config home but no storage directory
    pub fn bare_command(&self) -> TpCommand {
        let mut cmd = TpCommand::new();
        cmd.env("XDG_CONFIG_HOME", &self.root.path().join("config").to_string_lossy())
            .env("HOME", &self.root.path().to_string_lossy());
        cmd
    }
}

/// CLI command builder with timing
pub struct TpCommand {
    args: Vec<String>,
    env: HashMap<String, String>,
    stdin_data: Vec<u8>,
}

impl TpCommand {
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            env: HashMap::new(),
            stdin_data: Vec::new(),
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Provide stdin data
    pub fn stdin(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.stdin_data = data.as_ref().to_vec();
        self
    }

    /// Execute command and return result with timing
    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let mut child = Command::new(env!("CARGO_BIN_EXE_throttlepipe"))
            .args(&self.args)
            .env_remove("THROTTLEPIPE_CONFIG")
            .env_remove("RUST_LOG")
            .envs(&self.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn throttlepipe")?;

        // A blocked gate may exit without reading stdin, so a broken pipe here is fine
        // Feed stdin from a separate thread so a streaming child can't deadlock on a full stdout pipe
        let writer = child.stdin.take().map(|mut stdin| {
            let data = self.stdin_data.clone();
            std::thread::spawn(move || {
                let _ = stdin.write_all(&data);
            })
        });

        let output = child
            .wait_with_output()
            .context("Failed to wait for throttlepipe")?;

        if let Some(writer) = writer {
            let _ = writer.join();
        }

        Ok(CommandResult {
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout_str()
            );
        }

        Ok(result)
    }
}

/// Command execution result with timing
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Check if stdout contains text
    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout_str().contains(text)
    }

    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// Macro for convenient command construction
///
/// Usage:
/// ```ignore
/// tp!(env, "--id", "k").stdin("hello").assert_success()?;
/// ```
#[macro_export]
macro_rules! tp {
    ($env:expr $(, $arg:expr)*) => {{
        let mut cmd = $env.command();
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
