// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Integration tests for the omxsink CLI
//!
//! These tests verify CLI commands work correctly end-to-end using the
//! assert_cmd crate pattern. Everything except the hardware tests runs
//! against the `--mock` backend.

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::{env, fs, path::PathBuf};

/// Helper to create a Command for the omxsink binary
/// Uses OMXSINK_BIN environment variable if set, otherwise the cargo-built binary
fn omxsink_cmd() -> Command {
    let mut cmd = if let Ok(bin_path) = env::var("OMXSINK_BIN") {
        Command::new(bin_path)
    } else {
        Command::cargo_bin("omxsink").expect("omxsink binary not built")
    };

    // Explicitly pass LD_LIBRARY_PATH for hardware testing
    if let Ok(ld_library_path) = env::var("LD_LIBRARY_PATH") {
        cmd.env("LD_LIBRARY_PATH", ld_library_path);
    }

    cmd
}

/// Get the test data directory (target/testdata/omxsink-cli)
/// Creates it if it doesn't exist
fn get_test_data_dir() -> PathBuf {
    let test_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("target")
        .join("testdata")
        .join("omxsink-cli");

    fs::create_dir_all(&test_dir).expect("Failed to create test data directory");
    test_dir
}

/// Writes `frames` packed I420 frames of `width`x`height`, each filled with
/// its index, followed by `extra` stray bytes.
fn write_raw_file(name: &str, width: usize, height: usize, frames: u8, extra: usize) -> PathBuf {
    let frame_size = width * height * 3 / 2;
    let mut data: Vec<u8> = (0..frames)
        .flat_map(|i| std::iter::repeat(i).take(frame_size))
        .collect();
    data.extend(std::iter::repeat(0xff).take(extra));

    let path = get_test_data_dir().join(name);
    fs::write(&path, data).expect("Failed to write test file");
    path
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not valid JSON")
}

// =============================================================================
// Basic CLI Tests (No Hardware Required)
// =============================================================================

#[test]
fn test_cli_help() {
    omxsink_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pattern"))
        .stdout(predicate::str::contains("play"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("--mock"));
}

#[test]
fn test_cli_version() {
    omxsink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("omxsink"));
}

#[test]
fn test_pattern_help() {
    omxsink_cmd()
        .args(["pattern", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--resolution"))
        .stdout(predicate::str::contains("--rotation"))
        .stdout(predicate::str::contains("--fps"));
}

#[test]
fn test_missing_subcommand() {
    omxsink_cmd().assert().failure();
}

#[test]
fn test_invalid_resolution() {
    omxsink_cmd()
        .args(["--mock", "pattern", "--resolution", "1920by1080"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid arguments"));
}

#[test]
fn test_odd_resolution() {
    omxsink_cmd()
        .args(["--mock", "pattern", "--resolution", "641x480"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("even"));
}

// =============================================================================
// Mock Backend Tests
// =============================================================================

#[test]
fn test_pattern_mock_text() {
    omxsink_cmd()
        .args([
            "--mock",
            "pattern",
            "--resolution",
            "64x32",
            "--frames",
            "5",
            "--fps",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Frames submitted:  5"));
}

#[test]
fn test_pattern_mock_json() {
    let output = omxsink_cmd()
        .args([
            "--mock",
            "--json",
            "pattern",
            "--resolution",
            "64x32",
            "--frames",
            "3",
            "--fps",
            "0",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats = stdout_json(&output);
    assert_eq!(stats["frames"], 3);
    assert_eq!(stats["bytes"], 3 * 64 * 32 * 3 / 2);
    assert_eq!(stats["teardown_failures"], 0);
}

#[test]
fn test_pattern_mock_rotation() {
    for rotation in ["90", "180", "270", "45", "-90"] {
        omxsink_cmd()
            .args([
                "--mock",
                "pattern",
                "--resolution",
                "32x32",
                "--frames",
                "1",
                "--fps",
                "0",
                "--rotation",
                rotation,
            ])
            .assert()
            .success();
    }
}

#[test]
fn test_play_mock_until_eof() {
    let path = write_raw_file("play_eof.yuv", 16, 16, 2, 100);
    let output = omxsink_cmd()
        .args(["--mock", "--json", "play", "--resolution", "16x16", "--fps", "0"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats = stdout_json(&output);
    assert_eq!(stats["frames"], 2);
    assert_eq!(stats["bytes"], 2 * 384);
}

#[test]
fn test_play_mock_loop() {
    let path = write_raw_file("play_loop.yuv", 16, 16, 2, 0);
    let output = omxsink_cmd()
        .args([
            "--mock",
            "--json",
            "play",
            "--resolution",
            "16x16",
            "--fps",
            "0",
            "--loop",
            "--frames",
            "7",
        ])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["frames"], 7);
}

#[test]
fn test_play_missing_file() {
    omxsink_cmd()
        .args(["--mock", "play", "/nonexistent/frames.yuv"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn test_play_file_too_short() {
    let path = write_raw_file("play_short.yuv", 16, 16, 0, 100);
    omxsink_cmd()
        .args(["--mock", "play", "--resolution", "16x16"])
        .arg(&path)
        .assert()
        .code(2);
}

#[test]
fn test_info_mock_json() {
    let output = omxsink_cmd()
        .args(["--mock", "--json", "info"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let info = stdout_json(&output);
    assert_eq!(info["component"], "OMX.broadcom.video_render");
    assert_eq!(info["port"], 90);
    assert_eq!(info["enabled"], false);
}

#[test]
fn test_info_mock_with_resolution() {
    let output = omxsink_cmd()
        .args(["--mock", "--json", "info", "--resolution", "320x240"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let info = stdout_json(&output);
    assert_eq!(info["width"], 320);
    assert_eq!(info["height"], 240);
    assert_eq!(info["stride"], 320);
    assert_eq!(info["buffer_size"], 320 * 240 * 3 / 2);
    assert_eq!(info["enabled"], true);
    assert_eq!(info["state"], "executing");
}

#[test]
fn test_info_mock_text() {
    omxsink_cmd()
        .args(["--mock", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OMX.broadcom.video_render"))
        .stdout(predicate::str::contains("Port:              90"));
}

#[test]
fn test_missing_library() {
    omxsink_cmd()
        .env("OMXSINK_OPENMAXIL_LIBRARY", "/nonexistent/libopenmaxil.so")
        .env("OMXSINK_BCM_HOST_LIBRARY", "/nonexistent/libbcm_host.so")
        .args(["info"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Library unavailable"));
}

// =============================================================================
// Hardware Tests
// =============================================================================

#[test]
#[ignore = "test requires Raspberry Pi VideoCore hardware"]
#[serial]
fn test_hw_info() {
    let output = omxsink_cmd().args(["--json", "info"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["port"], 90);
}

#[test]
#[ignore = "test requires Raspberry Pi VideoCore hardware"]
#[serial]
fn test_hw_pattern() {
    let output = omxsink_cmd()
        .args([
            "--json",
            "pattern",
            "--resolution",
            "640x480",
            "--frames",
            "60",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stats = stdout_json(&output);
    assert_eq!(stats["frames"], 60);
    assert_eq!(stats["teardown_failures"], 0);
}
