//! Run driver: one corpus scan feeding either the execution tester or the
//! link checker, with per-document outcomes streamed to the reporter.
//!
//! Per-document failures never stop the run; only an unreadable corpus or a
//! user interrupt does.

use crate::config::HarnessConfig;
use crate::convert::{Convert, NotebookConverter};
use crate::exec::{self, ExecutionOutcome, Runner};
use crate::links::{LinkChecker, UreqResolver};
use crate::report::Reporter;
use crate::scan::{scan, ScanMode};
use crate::util::display_path;
use anyhow::Result;
use std::path::Path;

/// Aggregate result of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    Failed(usize),
    Interrupted,
}

impl RunStatus {
    /// Zero only when every document passed.
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::Passed => 0,
            RunStatus::Failed(_) | RunStatus::Interrupted => 1,
        }
    }
}

/// Execute every notebook under `root` in isolation.
pub fn run_test(root: &Path, config: &HarnessConfig, verbose: bool) -> Result<RunStatus> {
    let documents = scan(root, &config.ignore_set(), ScanMode::Execution)?;
    if verbose {
        eprintln!("test: {} notebook(s) discovered", documents.len());
    }
    let converter = NotebookConverter;
    let runner = Runner::new(config.interpreter_argv()?, config.timeout());
    let mut reporter = Reporter::default();

    for doc in &documents {
        if exec::interrupted() {
            reporter.abort();
            break;
        }
        let path = display_path(&doc.path, Some(root));
        reporter.begin(&path);
        let code = match converter.to_code(doc) {
            Ok(code) => code,
            Err(error) => {
                reporter.fail(&path, format!("{error:#}"));
                continue;
            }
        };
        match runner.run(doc, &code)? {
            ExecutionOutcome::Passed => reporter.pass(),
            ExecutionOutcome::Failed { stdout, stderr } => {
                reporter.fail(&path, format!("{stdout}{stderr}"));
            }
            ExecutionOutcome::TimedOut => {
                let timeout = config.timeout_secs.unwrap_or_default();
                reporter.timeout(&path, format!("Timed out after {timeout} second(s)."));
            }
            ExecutionOutcome::Interrupted => {
                reporter.interrupt();
                break;
            }
        }
    }

    Ok(finish(&reporter))
}

/// Validate every link referenced by the corpus under `root`.
pub fn run_links(root: &Path, config: &HarnessConfig, verbose: bool) -> Result<RunStatus> {
    let documents = scan(root, &config.ignore_set(), ScanMode::Links)?;
    if verbose {
        eprintln!("links: {} document(s) discovered", documents.len());
    }
    let converter = NotebookConverter;
    let checker = LinkChecker::new(
        root,
        config.mirror_prefixes.clone(),
        Box::new(UreqResolver::new()),
    );
    let mut reporter = Reporter::default();

    for doc in &documents {
        if exec::interrupted() {
            reporter.abort();
            break;
        }
        let path = display_path(&doc.path, Some(root));
        reporter.begin(&path);
        match converter.to_markdown(doc) {
            Ok(markdown) => {
                let diagnostics = checker.check(doc, &markdown);
                if diagnostics.is_empty() {
                    reporter.pass();
                } else {
                    reporter.fail(&path, diagnostics.join("\n"));
                }
            }
            Err(error) => reporter.fail(&path, format!("{error:#}")),
        }
    }

    Ok(finish(&reporter))
}

fn finish(reporter: &Reporter) -> RunStatus {
    reporter.finish();
    if reporter.interrupted() {
        RunStatus::Interrupted
    } else if reporter.failure_count() > 0 {
        RunStatus::Failed(reporter.failure_count())
    } else {
        RunStatus::Passed
    }
}
