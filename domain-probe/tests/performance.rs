// domain-probe/tests/performance.rs

use assert_cmd::Command;
use std::fs;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

#[test]
#[ignore = "requires network access to public DNS resolvers"]
fn test_all_extensions_performance() {
    let extensions = NamedTempFile::new().unwrap();
    let list: Vec<String> = ["com", "net", "org", "io", "co", "app", "dev", "ai", "xyz", "me"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    fs::write(extensions.path(), list.join("\n")).unwrap();

    let start = Instant::now();

    let mut cmd = Command::cargo_bin("domain-probe").unwrap();
    cmd.arg("--extensions")
        .arg(extensions.path())
        .args(["all", "testdomain12345", "--json"])
        .timeout(Duration::from_secs(30));

    cmd.assert().success();

    // Every probe is bounded by the 5s budget and runs 10 at a time,
    // so one wave should be enough.
    let duration = start.elapsed();
    assert!(
        duration.as_secs() < 15,
        "all-extensions check took too long: {:?}",
        duration
    );
}

#[test]
#[ignore = "requires network access to public DNS resolvers"]
fn test_bulk_performance() {
    let extensions = NamedTempFile::new().unwrap();
    fs::write(extensions.path(), "com\n").unwrap();

    let domains: Vec<String> = (0..20).map(|i| format!("perf-probe-{}-xyz.com", i)).collect();
    let start = Instant::now();

    let mut cmd = Command::cargo_bin("domain-probe").unwrap();
    cmd.arg("--extensions")
        .arg(extensions.path())
        .args(["--concurrency", "20", "bulk"])
        .args(&domains)
        .timeout(Duration::from_secs(20));

    cmd.assert().success();

    let duration = start.elapsed();
    assert!(
        duration.as_secs() < 10,
        "bulk check took too long: {:?}",
        duration
    );
}
