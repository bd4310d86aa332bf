//! Integration tests for timbre-cli.
//!
//! Each test runs the `timbre` binary built by cargo, feeding samples through
//! stdin or a temporary file.

use std::f64::consts::PI;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Helper to get the path to the `timbre` binary built by cargo.
fn timbre_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_timbre"))
}

/// Run `timbre` with `args`, writing `stdin` to its standard input.
fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = timbre_bin()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn timbre");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait on timbre")
}

fn sine_text(freq: f64, sr: f64, len: usize) -> String {
    (0..len)
        .map(|i| format!("{:.9}", (2.0 * PI * freq * i as f64 / sr).sin()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn stdout_value(output: &Output) -> f64 {
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .expect("stdout should be a single number")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// Temporal features
// ---------------------------------------------------------------------------

#[test]
fn zcr_of_alternating_signal_is_one() {
    let output = run_with_stdin(&["zcr"], "1, -1, 1, -1, 1");
    assert!(output.status.success());
    assert_eq!(stdout_value(&output), 1.0);
}

#[test]
fn asdf_prints_one_value_per_lag() {
    let output = run_with_stdin(&["asdf", "--json"], "0 1 0 -1");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["feature"], "asdf");
    assert_eq!(json["values"].as_array().map(Vec::len), Some(4));
}

// ---------------------------------------------------------------------------
// Spectral and perceptual features
// ---------------------------------------------------------------------------

#[test]
fn f0_from_file_matches_sine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sine.txt");
    std::fs::write(&path, sine_text(440.0, 44100.0, 2048)).unwrap();

    let output = timbre_bin()
        .args(["f0", "--input"])
        .arg(&path)
        .args(["--sample-rate", "44100"])
        .output()
        .expect("failed to run timbre f0");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let f0 = stdout_value(&output);
    assert!((f0 - 440.0).abs() < 10.0, "f0 = {f0}");
}

#[test]
fn mfcc_json_has_default_filter_count() {
    let output = run_with_stdin(&["mfcc", "--json"], &sine_text(440.0, 44100.0, 1024));
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["values"].as_array().map(Vec::len), Some(13));
}

#[test]
fn config_file_sets_mel_filter_count() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("timbre.toml");
    std::fs::write(&config, "[mel]\nfilters = 20\nhigh_hz = 8000.0\n").unwrap();

    let output = run_with_stdin(
        &["mfcc", "--json", "--config", config.to_str().unwrap()],
        &sine_text(440.0, 44100.0, 1024),
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output)["values"].as_array().map(Vec::len), Some(20));
}

#[test]
fn bark_prints_twenty_five_bands() {
    let output = run_with_stdin(&["bark"], &sine_text(1000.0, 44100.0, 1024));
    assert!(output.status.success());
    let lines = String::from_utf8_lossy(&output.stdout).lines().count();
    assert_eq!(lines, 25);
}

#[test]
fn rolloff_is_reported_in_hz() {
    let output = run_with_stdin(
        &["rolloff", "--percent", "50", "-r", "8000"],
        &sine_text(1000.0, 8000.0, 512),
    );
    assert!(output.status.success());
    let hz = stdout_value(&output);
    assert!(hz > 0.0 && hz < 4000.0, "rolloff = {hz}");
}

#[test]
fn lpc_json_has_model_parts() {
    let output = run_with_stdin(&["lpc", "--json"], "1 0.5 0.25 0.125 0.0625");
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["reflection"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["coefficients"].as_array().map(Vec::len), Some(4));
    assert!(json["error"].as_f64().is_some());
}

// ---------------------------------------------------------------------------
// Boundary validation
// ---------------------------------------------------------------------------

#[test]
fn rolloff_percent_out_of_range_fails() {
    let output = run_with_stdin(&["rolloff", "--percent", "150"], "1 2 3");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("rolloff_percent"), "stderr: {stderr}");
}

#[test]
fn tristimulus_first_order_needs_f0() {
    let output = run_with_stdin(&["tristimulus", "--order", "1"], "1 2 3");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("needs --f0"), "stderr: {stderr}");
}

#[test]
fn tristimulus_order_outside_range_is_a_usage_error() {
    let output = run_with_stdin(&["tristimulus", "--order", "4"], "1 2 3");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn non_numeric_input_fails() {
    let output = run_with_stdin(&["zcr"], "1 2 banana");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("banana"), "stderr: {stderr}");
}

#[test]
fn zero_sample_rate_fails_before_reading_input() {
    let output = timbre_bin()
        .args(["f0", "--sample-rate", "0", "--input", "/nonexistent/samples.txt"])
        .output()
        .expect("failed to run timbre");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sample_rate"), "stderr: {stderr}");
}

#[test]
fn lpcc_order_above_limit_fails() {
    let output = run_with_stdin(&["lpcc", "--order", "100000000"], "1 0.5 0.25 0.125");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lpcc_order"), "stderr: {stderr}");
}

#[test]
fn lpcc_of_silence_is_zero() {
    let output = run_with_stdin(&["lpcc", "--order", "4", "--json"], "0 0 0 0 0");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let values = stdout_json(&output)["values"].clone();
    assert_eq!(values, serde_json::json!([0.0, 0.0, 0.0, 0.0]));
}
