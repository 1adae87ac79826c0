#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn setup_price_cache(cache_root: &Path) {
    let cache_dir = cache_root.join("etfdash");
    std::fs::create_dir_all(&cache_dir).expect("failed to create price cache dir");
    std::fs::copy(
        "tests/fixtures/price_cache/prices.json",
        cache_dir.join("prices.json"),
    )
    .expect("failed to copy prices.json fixture");
    std::fs::copy(
        "tests/fixtures/price_cache/prices.meta.json",
        cache_dir.join("prices.meta.json"),
    )
    .expect("failed to copy prices.meta.json fixture");
}

pub fn cache_root_for_home(home: &TempDir) -> PathBuf {
    if cfg!(target_os = "macos") {
        home.path().join("Library").join("Caches")
    } else {
        home.path().join(".cache")
    }
}

/// Base command with an isolated HOME/cache and the network disabled.
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("etfdash"));
    cmd.env("HOME", home.path());
    cmd.env("XDG_CACHE_HOME", cache_root_for_home(home));
    cmd.env("ETFDASH_OFFLINE", "1");
    cmd.arg("--no-color");
    cmd
}

/// Base command with the price cache fixture pre-seeded.
pub fn cached_cmd(home: &TempDir) -> Command {
    setup_price_cache(&cache_root_for_home(home));
    base_cmd(home)
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = cached_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn run_cmd_json(home: &TempDir, args: &[&str]) -> Result<Value> {
    let mut full_args = vec!["--json"];
    full_args.extend_from_slice(args);
    let output = run_cmd(home, &full_args)?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}
