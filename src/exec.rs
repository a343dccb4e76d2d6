//! Isolated execution of converted notebook code.
//!
//! Each document gets a freshly spawned interpreter with the document's own
//! directory as the child working directory, passed at spawn time rather than
//! via process-global state, so nothing leaks between documents. Both output
//! streams are captured fully before the exit status is inspected.

use crate::scan::Document;
use anyhow::{Context, Result};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Set by the SIGINT handler; checked between documents and while a child
/// process runs. Cancellation is global: one interrupt aborts the whole run.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

extern "C" fn handle_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT through the interrupt flag so an active child can be reaped
/// before the run stops.
pub fn install_interrupt_handler() {
    let handler = handle_interrupt as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}

/// Result of running one document's code in a child process.
#[derive(Debug)]
pub enum ExecutionOutcome {
    Passed,
    Failed { stdout: String, stderr: String },
    TimedOut,
    Interrupted,
}

enum Wait {
    Exited(ExitStatus),
    TimedOut,
    Interrupted,
}

/// Spawns converted code under a configured interpreter command.
#[derive(Debug, Clone)]
pub struct Runner {
    interpreter: Vec<String>,
    timeout: Option<Duration>,
}

impl Runner {
    pub fn new(interpreter: Vec<String>, timeout: Option<Duration>) -> Self {
        Runner {
            interpreter,
            timeout,
        }
    }

    /// Run `code` for `doc` and classify the outcome.
    ///
    /// The child environment is the parent environment plus an override that
    /// forces any plotting backend into a no-output mode, so examples that
    /// draw figures neither block on a display nor write image files.
    pub fn run(&self, doc: &Document, code: &str) -> Result<ExecutionOutcome> {
        let code = strip_coding_lines(code);
        let (program, args) = self
            .interpreter
            .split_first()
            .context("interpreter command is empty")?;

        tracing::debug!(path = %doc.path.display(), interpreter = %program, "spawn child");
        let mut child = Command::new(program)
            .args(args)
            .arg("-c")
            .arg(code)
            .current_dir(&doc.dir)
            .env("MPLBACKEND", "Template")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn interpreter {program}"))?;

        // Drain both pipes on threads so a chatty child cannot fill one and
        // deadlock against the wait loop.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let waited = self.wait(&mut child)?;
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        Ok(match waited {
            Wait::Exited(status) if status.success() => ExecutionOutcome::Passed,
            Wait::Exited(_) => ExecutionOutcome::Failed {
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            },
            Wait::TimedOut => ExecutionOutcome::TimedOut,
            Wait::Interrupted => ExecutionOutcome::Interrupted,
        })
    }

    fn wait(&self, child: &mut Child) -> Result<Wait> {
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        loop {
            if let Some(status) = child.try_wait().context("poll child process")? {
                return Ok(Wait::Exited(status));
            }
            if interrupted() {
                kill_and_reap(child)?;
                return Ok(Wait::Interrupted);
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                kill_and_reap(child)?;
                return Ok(Wait::TimedOut);
            }
            thread::sleep(Duration::from_millis(25));
        }
    }
}

fn kill_and_reap(child: &mut Child) -> Result<()> {
    // A child that exited between the poll and the kill is fine; reaping is
    // what matters.
    child.kill().ok();
    child.wait().context("reap terminated child")?;
    Ok(())
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut stream) = stream {
            stream.read_to_end(&mut buffer).ok();
        }
        buffer
    })
}

/// Drop encoding-declaration lines left over from conversion. Pure string
/// filtering: an absent declaration is not an error.
fn strip_coding_lines(code: &str) -> String {
    code.lines()
        .filter(|line| !line.starts_with("# coding"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{strip_coding_lines, ExecutionOutcome, Runner};
    use crate::scan::{Document, DocumentKind};
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn shell_runner(timeout: Option<Duration>) -> Runner {
        Runner::new(vec!["sh".to_string()], timeout)
    }

    fn document_in(dir: &Path) -> Document {
        Document {
            path: dir.join("example.ipynb"),
            dir: dir.to_path_buf(),
            kind: DocumentKind::Notebook,
        }
    }

    #[test]
    fn zero_exit_is_a_pass() {
        let dir = TempDir::new().expect("temp dir");
        let outcome = shell_runner(None)
            .run(&document_in(dir.path()), "exit 0")
            .expect("run child");
        assert!(matches!(outcome, ExecutionOutcome::Passed));
    }

    #[test]
    fn nonzero_exit_fails_with_captured_streams() {
        let dir = TempDir::new().expect("temp dir");
        let outcome = shell_runner(None)
            .run(&document_in(dir.path()), "echo partial; echo boom >&2; exit 3")
            .expect("run child");
        match outcome {
            ExecutionOutcome::Failed { stdout, stderr } => {
                assert!(stdout.contains("partial"));
                assert!(stderr.contains("boom"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn child_runs_in_the_document_directory() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("data.txt"), "sibling").expect("write data file");
        let outcome = shell_runner(None)
            .run(&document_in(dir.path()), "cat data.txt")
            .expect("run child");
        assert!(matches!(outcome, ExecutionOutcome::Passed));
    }

    #[test]
    fn overrunning_children_time_out() {
        let dir = TempDir::new().expect("temp dir");
        let outcome = shell_runner(Some(Duration::from_millis(200)))
            .run(&document_in(dir.path()), "exec sleep 10")
            .expect("run child");
        assert!(matches!(outcome, ExecutionOutcome::TimedOut));
    }

    #[test]
    fn coding_lines_are_stripped() {
        let code = "# coding: utf-8\nprint(1)\n# coding=latin-1\nprint(2)";
        assert_eq!(strip_coding_lines(code), "print(1)\nprint(2)");
    }
}
