//! Integration tests for the syl-gen CLI

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the syl-gen binary
fn syl_gen() -> Command {
	Command::new(cargo::cargo_bin!("syl-gen"))
}

fn corpus(dir: &TempDir, names: &str) -> PathBuf {
	let path = dir.path().join("chapter.txt");
	fs::write(&path, names).unwrap();
	path
}

const ITALIAN: &str = "anna\nelena\nmarco\nluca\nalexandra\ngiovanni\n";

#[test]
fn test_help() {
	syl_gen()
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("Generate new names"));
}

#[test]
fn test_finite_generation_prints_count_lines() {
	let temp = TempDir::new().unwrap();
	let path = corpus(&temp, ITALIAN);

	let output = syl_gen()
		.args(["generate", "-n", "5", "-s", "42"])
		.arg(&path)
		.output()
		.unwrap();

	assert!(output.status.success());
	let stdout = String::from_utf8(output.stdout).unwrap();
	assert_eq!(stdout.lines().count(), 5);
	assert!(stdout.lines().all(|name| (2..=20).contains(&name.chars().count())));
}

#[test]
fn test_seed_makes_output_reproducible() {
	let temp = TempDir::new().unwrap();
	let path = corpus(&temp, ITALIAN);

	let run = || {
		syl_gen()
			.args(["generate", "--count", "8", "--seed", "7"])
			.arg(&path)
			.output()
			.unwrap()
			.stdout
	};
	assert_eq!(run(), run());
}

#[test]
fn test_debug_dumps_pools_then_generates() {
	let temp = TempDir::new().unwrap();
	let path = corpus(&temp, ITALIAN);

	syl_gen()
		.args(["generate", "-d", "-n", "2", "-s", "1"])
		.arg(&path)
		.assert()
		.success()
		.stdout(predicate::str::contains("=== Prefix (5 unique | 6 total) ==="))
		.stdout(predicate::str::contains("=== Middle"))
		.stdout(predicate::str::contains("=== Suffix"));
}

#[test]
fn test_single_syllable_corpus_is_insufficient() {
	let temp = TempDir::new().unwrap();
	let path = corpus(&temp, "a\nbo\ntri\n");

	syl_gen()
		.args(["generate", "-n", "3"])
		.arg(&path)
		.assert()
		.failure()
		.stderr(predicate::str::contains("insufficient data"))
		.stderr(predicate::str::contains("middle"));
}

#[test]
fn test_blank_corpus_has_no_records() {
	let temp = TempDir::new().unwrap();
	let path = corpus(&temp, "\n  \n");

	syl_gen()
		.args(["generate", "-n", "3"])
		.arg(&path)
		.assert()
		.failure()
		.stderr(predicate::str::contains("no input records"));
}

#[test]
fn test_missing_corpus() {
	let temp = TempDir::new().unwrap();

	syl_gen()
		.args(["generate", "-n", "3"])
		.arg(temp.path().join("missing.txt"))
		.assert()
		.failure()
		.stderr(predicate::str::contains("cannot read file"));
}

#[test]
fn test_unsatisfiable_bounds_print_nothing() {
	let temp = TempDir::new().unwrap();
	let path = corpus(&temp, ITALIAN);

	syl_gen()
		.args(["generate", "-n", "5", "-m", "1000", "-x", "1000"])
		.arg(&path)
		.assert()
		.failure()
		.stdout(predicate::str::is_empty())
		.stderr(predicate::str::contains("generation aborted after 0 of 5 names"));
}

#[test]
fn test_invalid_bounds() {
	let temp = TempDir::new().unwrap();
	let path = corpus(&temp, ITALIAN);

	syl_gen()
		.args(["generate", "-n", "5", "-m", "9", "-x", "3"])
		.arg(&path)
		.assert()
		.failure()
		.stderr(predicate::str::contains("invalid length bounds"));
}

#[test]
fn test_cache_file_is_written() {
	let temp = TempDir::new().unwrap();
	let path = corpus(&temp, ITALIAN);

	syl_gen()
		.args(["generate", "-n", "1", "--cache"])
		.arg(&path)
		.assert()
		.success();

	assert!(temp.path().join("chapter.bin").exists());
}

#[test]
fn test_clean_writes_deduplicated_corpus() {
	let temp = TempDir::new().unwrap();
	let raw = temp.path().join("raw.txt");
	let ready = temp.path().join("chapters").join("ready.txt");
	fs::write(&raw, "Names of chapter 3\nAnna\nAnna\nSt. Clair\n\nElena\n").unwrap();

	syl_gen()
		.arg("clean")
		.arg(&raw)
		.arg(&ready)
		.arg("--skip-header")
		.assert()
		.success()
		.stdout(predicate::str::contains("Cleaned 2 names"));

	assert_eq!(fs::read_to_string(&ready).unwrap(), "Anna\nElena\n");
}

#[cfg(unix)]
#[test]
fn test_interrupt_stops_unbounded_generation() {
	use std::io::{BufRead, BufReader, Read};
	use std::process::{Command as Process, Stdio};

	let temp = TempDir::new().unwrap();
	let path = corpus(&temp, ITALIAN);

	let mut child = Process::new(cargo::cargo_bin!("syl-gen"))
		.args(["generate", "-n", "0", "-s", "5"])
		.arg(&path)
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.unwrap();

	// A first name means generation has started with the listener in place
	let mut stdout = BufReader::new(child.stdout.take().unwrap());
	let mut first = String::new();
	stdout.read_line(&mut first).unwrap();
	assert!(!first.trim().is_empty());

	let status = Process::new("kill")
		.args(["-INT", &child.id().to_string()])
		.status()
		.unwrap();
	assert!(status.success());

	let mut rest = String::new();
	stdout.read_to_string(&mut rest).unwrap();
	let output = child.wait_with_output().unwrap();

	assert!(output.status.success());
	let stderr = String::from_utf8(output.stderr).unwrap();
	assert!(stderr.contains("Generating forever"));
	assert!(stderr.contains("Exiting. Goodbye!"));
}
