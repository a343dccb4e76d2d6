//! Shared fixture corpus builders for integration tests.
//!
//! Fixture notebooks carry shell code and every run passes `--interpreter
//! sh`, so the tests need neither Python nor the network.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

pub fn harness_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_nbcheck"))
}

/// Run the built harness with `args` and wait for it to finish.
pub fn run_harness(args: &[&str]) -> Output {
    Command::new(harness_binary())
        .args(args)
        .output()
        .expect("run nbcheck")
}

/// Spawn the built harness with captured output, for tests that signal it
/// mid-run.
pub fn spawn_harness(args: &[&str]) -> std::process::Child {
    Command::new(harness_binary())
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn nbcheck")
}

/// Write a single-code-cell notebook whose cell holds shell code.
pub fn write_notebook(dir: &Path, name: &str, code: &str) {
    let notebook = serde_json::json!({
        "nbformat": 4,
        "nbformat_minor": 5,
        "metadata": {},
        "cells": [
            {
                "cell_type": "code",
                "metadata": {},
                "execution_count": null,
                "outputs": [],
                "source": [code]
            }
        ]
    });
    write_file(
        &dir.join(name),
        &serde_json::to_string_pretty(&notebook).expect("serialize notebook"),
    );
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write fixture file");
}

pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}
