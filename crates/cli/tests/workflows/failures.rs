//! Fatal errors and their exit codes

use crate::common::GateEnv;
use crate::tp;
use anyhow::Result;

const STORE_IO: i32 = 3;
const CORRUPT_RECORD: i32 = 4;

#[test]
fn corrupt_record_fails_and_is_left_alone() -> Result<()> {
    let env = GateEnv::new();
    let record = env.record_path("k");
    std::fs::write(&record, b"this is not a checkpoint")?;

    let result = tp!(env, "--id", "k").stdin("data").assert_failure()?;

    assert_eq!(result.exit_code, CORRUPT_RECORD);
    assert!(result.stdout.is_empty());
    assert!(result.contains_stderr("corrupt"));
    assert_eq!(std::fs::read(&record)?, b"this is not a checkpoint");

    Ok(())
}

#[test]
fn truncated_record_is_corrupt() -> Result<()> {
    let env = GateEnv::new();
    tp!(env, "--id", "k").stdin("x").assert_success()?;

    let record = env.record_path("k");
    let full = std::fs::read(&record)?;
    std::fs::write(&record, &full[..full.len() / 2])?;

    let result = tp!(env, "--id", "k", "--window", "0").stdin("y").assert_failure()?;
    assert_eq!(result.exit_code, CORRUPT_RECORD);
    assert!(result.stdout.is_empty());

    Ok(())
}

#[test]
fn missing_storage_directory_is_store_error() -> Result<()> {
    let env = GateEnv::new();
    let missing = env.root().join("missing");

    let result = env
        .bare_command()
        .args(&["--id", "k", "--tmp-path", missing.to_str().unwrap()])
        .stdin("data")
        .assert_failure()?;

    assert_eq!(result.exit_code, STORE_IO);
    assert!(result.stdout.is_empty());
    assert!(!missing.exists());

    Ok(())
}

#[test]
fn status_reports_corrupt_record() -> Result<()> {
    let env = GateEnv::new();
    std::fs::write(env.record_path("k"), b"{}")?;

    let result = tp!(env, "--id", "k", "status").assert_failure()?;
    assert_eq!(result.exit_code, CORRUPT_RECORD);

    Ok(())
}

#[test]
fn invalid_config_is_generic_failure() -> Result<()> {
    let env = GateEnv::new();
    let config = env.root().join("bad.toml");
    std::fs::write(&config, "window_secs = \"soon\"\n")?;

    let result = tp!(env, "--config", config.to_str().unwrap())
        .stdin("data")
        .assert_failure()?;

    assert_eq!(result.exit_code, 1);
    assert!(result.stdout.is_empty());

    Ok(())
}

#[test]
fn empty_id_is_rejected() -> Result<()> {
    let env = GateEnv::new();

    let result = tp!(env, "--id", "").stdin("data").assert_failure()?;
    assert_eq!(result.exit_code, 1);

    Ok(())
}

#[test]
fn unusable_log_file_is_generic_failure() -> Result<()> {
    let env = GateEnv::new();
    let not_a_dir = env.root().join("afile");
    std::fs::write(&not_a_dir, b"regular file")?;
    let log = not_a_dir.join("gate.log");

    let result = tp!(env, "--id", "k", "--log-file", log.to_str().unwrap())
        .stdin("data")
        .assert_failure()?;

    assert_eq!(result.exit_code, 1);
    assert!(result.stdout.is_empty());
    assert!(!result.contains_stderr("panicked"));
    assert!(result.contains_stderr("log file"));
    assert!(!env.record_path("k").exists());

    Ok(())
}
