//! CLI integration tests using assert_cmd.
//!
//! Everything here runs offline: `fetch` is only exercised through its
//! argument validation.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

#[allow(deprecated)]
fn primecert() -> Command {
    let mut cmd = Command::cargo_bin("primecert").unwrap();
    cmd.env_remove("PRIMECERT_CONFIG");
    cmd
}

const CHAIN_7: &str = r#"{"proofs":[
  {"n":"2"},
  {"n":"3","proof":{"a":{"int":"2","factorization":[{"prime":"2","exponent":1}]},"base":"2","inverses":[{"mod":"3","value":"1","inv":"1"}]}},
  {"n":"7","proof":{"a":{"int":"3","factorization":[{"prime":"3","exponent":1}]},"base":"2","inverses":[{"mod":"7","value":"3","inv":"5"}]}}
]}"#;

// --- Help and arg validation ---

#[test]
fn help_shows_all_subcommands() {
    primecert().arg("--help").assert().success().stdout(
        predicate::str::contains("prove")
            .and(predicate::str::contains("verify"))
            .and(predicate::str::contains("fetch")),
    );
}

#[test]
fn help_prove_shows_args() {
    primecert()
        .args(["prove", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--proth").and(predicate::str::contains("--output")));
}

#[test]
fn verify_requires_files() {
    primecert().arg("verify").assert().failure();
}

#[test]
fn fetch_requires_curve() {
    primecert().arg("fetch").assert().failure();
}

// --- prove ---

#[test]
fn prove_prints_chain_to_stdout() {
    primecert()
        .args(["prove", "181"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""n": "181""#)
                .and(predicate::str::contains(r#""n": "2""#))
                .and(predicate::str::contains(r#""inverses""#)),
        );
}

#[test]
fn prove_then_verify_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("181.json");
    primecert()
        .args(["prove", "181", "--output"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());
    primecert().arg("verify").arg(&path).assert().success();
    primecert()
        .args(["verify", "--strict"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn prove_proth_chain_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f4.json");
    primecert()
        .args(["prove", "65537", "--proth", "-o"])
        .arg(&path)
        .assert()
        .success();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains(r#""int": "65536""#));
    primecert().arg("verify").arg(&path).assert().success();
}

#[test]
fn prove_rejects_composite() {
    primecert()
        .args(["prove", "15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("composite"));
}

#[test]
fn prove_rejects_non_integer() {
    primecert().args(["prove", "12a"]).assert().failure();
}

#[test]
fn flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("primecert.toml");
    // 2 is a square mod 257, so base 2 alone cannot certify it
    fs::write(&config, "max_base = 2\n").unwrap();
    primecert()
        .arg("--config")
        .arg(&config)
        .args(["prove", "257"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no witness"));
    primecert()
        .arg("--config")
        .arg(&config)
        .args(["--max-base", "100", "prove", "257"])
        .assert()
        .success();
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("primecert.toml");
    fs::write(&config, "max_bases = 100\n").unwrap();
    primecert()
        .arg("--config")
        .arg(&config)
        .args(["prove", "181"])
        .assert()
        .failure();

    fs::write(&config, "mr_rounds = 0\n").unwrap();
    primecert()
        .arg("--config")
        .arg(&config)
        .args(["prove", "181"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mr_rounds"));
}

// --- verify ---

#[test]
fn verify_accepts_hand_written_chain() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("7.json");
    fs::write(&path, CHAIN_7).unwrap();
    primecert().arg("verify").arg(&path).assert().success();
}

#[test]
fn verify_rejects_tampered_inverse() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.json");
    let bad = dir.path().join("bad.json");
    fs::write(&good, CHAIN_7).unwrap();
    fs::write(&bad, CHAIN_7.replace(r#""inv":"5""#, r#""inv":"4""#)).unwrap();
    primecert()
        .arg("verify")
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 failed"));
}

#[test]
fn verify_rejects_missing_dependency() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orphan.json");
    let without_3: String = CHAIN_7
        .lines()
        .filter(|line| !line.contains(r#"{"n":"3""#))
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&path, without_3).unwrap();
    primecert()
        .arg("verify")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing dependency"));
}

#[test]
fn verify_rejects_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{"proofs":[{"n":"0x11"}]}"#).unwrap();
    primecert().arg("verify").arg(&path).assert().failure();
}
