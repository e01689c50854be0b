//! Pass and block behavior across invocations

use crate::common::GateEnv;
use crate::tp;
use anyhow::Result;

#[test]
fn first_invocation_passes_second_blocks() -> Result<()> {
    let env = GateEnv::new();

    let first = tp!(env, "--id", "k", "--window", "60")
        .stdin("hello")
        .assert_success()?;
    assert_eq!(first.stdout, b"hello");
    assert!(env.record_path("k").exists());

    let record_after_first = std::fs::read(env.record_path("k"))?;

    let second = tp!(env, "--id", "k", "--window", "60")
        .stdin("world")
        .assert_success()?;
    assert!(second.stdout.is_empty());
    assert_eq!(std::fs::read(env.record_path("k"))?, record_after_first);

    Ok(())
}

#[test]
fn minutes_flag_sets_window() -> Result<()> {
    let env = GateEnv::new();

    tp!(env, "--id", "k", "--time", "1").stdin("a").assert_success()?;
    let blocked = tp!(env, "--id", "k", "--time", "1").stdin("b").assert_success()?;
    assert!(blocked.stdout.is_empty());

    Ok(())
}

#[test]
fn zero_window_always_passes() -> Result<()> {
    let env = GateEnv::new();

    for payload in ["one", "two", "three"] {
        let result = tp!(env, "--id", "k", "--window", "0")
            .stdin(payload)
            .assert_success()?;
        assert_eq!(result.stdout, payload.as_bytes());
    }

    Ok(())
}

#[test]
fn negative_window_always_passes() -> Result<()> {
    let env = GateEnv::new();

    tp!(env, "--id", "k", "--window", "-5").stdin("a").assert_success()?;
    let again = tp!(env, "--id", "k", "--window", "-5").stdin("b").assert_success()?;
    assert_eq!(again.stdout, b"b");

    Ok(())
}

#[test]
fn binary_data_is_copied_unchanged() -> Result<()> {
    use rand::RngCore;

    let env = GateEnv::new();
    let mut data = vec![0u8; 256 * 1024 + 3];
    rand::thread_rng().fill_bytes(&mut data);

    let result = tp!(env, "--id", "bin").stdin(&data).assert_success()?;
    assert_eq!(result.stdout, data);

    Ok(())
}

#[test]
fn empty_input_still_counts_as_a_pass() -> Result<()> {
    let env = GateEnv::new();

    let first = tp!(env, "--id", "k").assert_success()?;
    assert!(first.stdout.is_empty());

    let record = std::fs::read_to_string(env.record_path("k"))?;
    assert!(!record.contains("\"last_pass\":null"));

    Ok(())
}

#[test]
fn keys_are_independent() -> Result<()> {
    let env = GateEnv::new();

    tp!(env, "--id", "a").stdin("x").assert_success()?;
    let b = tp!(env, "--id", "b").stdin("y").assert_success()?;
    assert_eq!(b.stdout, b"y");

    let a_again = tp!(env, "--id", "a").stdin("z").assert_success()?;
    assert!(a_again.stdout.is_empty());

    Ok(())
}

#[test]
fn exclusive_lock_keeps_semantics() -> Result<()> {
    let env = GateEnv::new();

    let first = tp!(env, "--id", "k", "--exclusive").stdin("hello").assert_success()?;
    assert_eq!(first.stdout, b"hello");

    let second = tp!(env, "--id", "k", "--exclusive").stdin("hello").assert_success()?;
    assert!(second.stdout.is_empty());

    let mut lock = env.record_path("k").into_os_string();
    lock.push(".lock");
    assert!(std::path::Path::new(&lock).exists());

    Ok(())
}

#[test]
fn concurrent_exclusive_invocations_pass_once() -> Result<()> {
    let env = std::sync::Arc::new(GateEnv::new());
    let threads: Vec<_> = (0..6)
        .map(|i| {
            let env = env.clone();
            std::thread::spawn(move || {
                let key = format!("race-{}", i % 2);
                tp!(env, "--id", key.as_str(), "--exclusive")
                    .stdin("payload")
                    .execute()
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();
    assert!(results.iter().all(|r| r.success()));

    let passes = results.iter().filter(|r| !r.stdout.is_empty()).count();
    assert_eq!(passes, 2);

    Ok(())
}

#[test]
fn config_file_supplies_defaults() -> Result<()> {
    let env = GateEnv::new();
    let config = env.root().join("throttlepipe.toml");
    std::fs::write(&config, "key = \"from-config\"\nwindow_secs = 0\n")?;
    let config = config.to_string_lossy().to_string();

    tp!(env, "--config", config.as_str()).stdin("a").assert_success()?;
    let again = tp!(env, "--config", config.as_str()).stdin("b").assert_success()?;
    assert_eq!(again.stdout, b"b");
    assert!(env.record_path("from-config").exists());

    Ok(())
}

#[test]
fn config_file_from_environment() -> Result<()> {
    let env = GateEnv::new();
    let config = env.root().join("env.toml");
    std::fs::write(&config, "key = \"env-key\"\n")?;

    tp!(env)
        .env("THROTTLEPIPE_CONFIG", &config.to_string_lossy())
        .stdin("a")
        .assert_success()?;
    assert!(env.record_path("env-key").exists());

    Ok(())
}
