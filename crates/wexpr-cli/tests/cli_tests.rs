//! Integration tests for the `wexpr` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the
//! humanreadable, mini, validate, and binary subcommands through the actual
//! binary, including stdin/stdout piping, file I/O, error formatting, and a
//! text → binary → text pipeline.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the sample.wexpr fixture.
fn sample_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample.wexpr")
}

fn wexpr() -> Command {
    Command::cargo_bin("wexpr").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// mini subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn mini_stdin_to_stdout() {
    wexpr()
        .arg("mini")
        .write_stdin("#( a   b\n\tc )")
        .assert()
        .success()
        .stdout("#(a b c)");
}

#[test]
fn mini_strips_comments_and_references() {
    wexpr()
        .arg("mini")
        .write_stdin("#( [x] alpha ; comment\n *[x] )")
        .assert()
        .success()
        .stdout("#(alpha alpha)");
}

#[test]
fn mini_file_to_stdout() {
    wexpr()
        .args(["mini", "-i", sample_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"name "Sample Document""#))
        .stdout(predicate::str::contains("<SGVsbG8gV2V4cHIh>"));
}

#[test]
fn mini_file_to_file() {
    let output_path = "/tmp/wexpr-test-mini-output.wexpr";
    let _ = std::fs::remove_file(output_path);

    wexpr()
        .args(["mini", "-i", sample_path(), "-o", output_path])
        .assert()
        .success();

    let content = std::fs::read_to_string(output_path).expect("output file must exist");
    assert!(content.starts_with("@("), "minified output should open a map");
    assert!(!content.contains('\n'), "minified output is a single line");

    let _ = std::fs::remove_file(output_path);
}

// ─────────────────────────────────────────────────────────────────────────────
// humanreadable subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn humanreadable_stdin_to_stdout() {
    wexpr()
        .arg("humanreadable")
        .write_stdin("#(a @(k v))")
        .assert()
        .success()
        .stdout("#(\n\ta\n\t@(\n\t\tk v\n\t)\n)");
}

// ─────────────────────────────────────────────────────────────────────────────
// validate subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn validate_good_input_prints_true() {
    wexpr()
        .args(["validate", "-i", sample_path()])
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn validate_bad_input_prints_false_and_fails() {
    wexpr()
        .arg("validate")
        .write_stdin("#(never closed")
        .assert()
        .failure()
        .stdout("false\n");
}

#[test]
fn validate_empty_input_is_false() {
    // An empty document parses to no expression, which validate rejects
    wexpr()
        .arg("validate")
        .write_stdin("; only a comment\n")
        .assert()
        .failure()
        .stdout("false\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// binary subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn binary_emits_header_and_chunk() {
    let output = wexpr()
        .arg("binary")
        .write_stdin("nil")
        .output()
        .expect("binary emit should run");
    assert!(output.status.success());

    let expected = [
        0x83, b'B', b'W', b'E', b'X', b'P', b'R', 0x0A, // magic
        0, 0, 0, 1, // version
        0, 0, 0, 0, 0, 0, 0, 0, // reserved
        0, 0, 0, 0, 0x00, // nil chunk
    ];
    assert_eq!(output.stdout, expected);
}

#[test]
fn binary_then_mini_roundtrips() {
    // Produce the binary document for the fixture...
    let binary = wexpr()
        .args(["binary", "-i", sample_path()])
        .output()
        .expect("binary emit should run");
    assert!(binary.status.success());
    assert_eq!(binary.stdout[0], 0x83);

    // ...and feed it back in; binary input is autodetected.
    let from_binary = wexpr()
        .arg("mini")
        .write_stdin(binary.stdout)
        .output()
        .expect("mini should run");

    let from_text = wexpr()
        .args(["mini", "-i", sample_path()])
        .output()
        .expect("mini should run");

    assert_eq!(from_binary.stdout, from_text.stdout);
}

#[test]
fn binary_input_validates() {
    let binary = wexpr()
        .arg("binary")
        .write_stdin("#(a b)")
        .output()
        .expect("binary emit should run");

    wexpr()
        .arg("validate")
        .write_stdin(binary.stdout)
        .assert()
        .success()
        .stdout("true\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Error reporting
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn parse_error_reports_position() {
    wexpr()
        .arg("mini")
        .write_stdin("#(\n  \"unterminated")
        .assert()
        .failure()
        .stderr(predicate::str::contains("wexpr: (stdin):2:3:"))
        .stderr(predicate::str::contains("never closed"));
}

#[test]
fn parse_error_names_the_input_file() {
    let input_path = "/tmp/wexpr-test-bad-input.wexpr";
    std::fs::write(input_path, "@(key)").expect("fixture write");

    wexpr()
        .args(["mini", "-i", input_path])
        .assert()
        .failure()
        .stderr(predicate::str::contains(format!("wexpr: {input_path}:1:3:")));

    let _ = std::fs::remove_file(input_path);
}

#[test]
fn missing_input_file_fails() {
    wexpr()
        .args(["mini", "-i", "/nonexistent/missing.wexpr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Global flags
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn version_flag() {
    wexpr()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wexpr"));
}

#[test]
fn help_lists_subcommands() {
    wexpr()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("humanreadable"))
        .stdout(predicate::str::contains("mini"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("binary"));
}
