//! Streaming progress lines and the final corpus report.
//!
//! Progress is printed as each document runs, not buffered: a long corpus run
//! should show where it is. Failure detail is held back until the end so the
//! progress column stays readable.

use std::io::{self, Write};

const PROGRESS_WIDTH: usize = 70;
const SEPARATOR_WIDTH: usize = 79;

/// One failed document and its full diagnostic text.
#[derive(Debug)]
pub struct Failure {
    pub path: String,
    pub detail: String,
}

/// Collects per-document outcomes and prints progress as the run advances.
#[derive(Debug, Default)]
pub struct Reporter {
    failures: Vec<Failure>,
    interrupted: bool,
}

impl Reporter {
    /// Print the progress line for `path` without a trailing newline, flushed
    /// so it is visible while the document runs.
    pub fn begin(&self, path: &str) {
        print!("Testing {path}{}", progress_dots(path));
        io::stdout().flush().ok();
    }

    pub fn pass(&mut self) {
        println!("ok");
    }

    pub fn fail(&mut self, path: &str, detail: String) {
        println!("FAIL");
        self.failures.push(Failure {
            path: path.to_string(),
            detail,
        });
    }

    pub fn timeout(&mut self, path: &str, detail: String) {
        println!("TIMEOUT");
        self.failures.push(Failure {
            path: path.to_string(),
            detail,
        });
    }

    /// Record a run-level interruption that landed while a document was
    /// active. The remaining scan is abandoned by the caller;
    /// everything collected so far is still reported.
    pub fn interrupt(&mut self) {
        println!("INTERRUPTED");
        self.interrupted = true;
    }

    /// Record an interruption noticed between documents, with no progress
    /// line open.
    pub fn abort(&mut self) {
        self.interrupted = true;
    }

    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Print failure blocks and the summary; `true` when every document
    /// passed and the run was not interrupted.
    pub fn finish(&self) -> bool {
        for failure in &self.failures {
            println!("{}", "-".repeat(SEPARATOR_WIDTH));
            println!("Error output for: {}", failure.path);
            println!("{}", failure.detail.trim());
            println!();
        }

        if self.failures.is_empty() && !self.interrupted {
            println!("Test passed.");
            return true;
        }

        println!("{}", "-".repeat(SEPARATOR_WIDTH));
        if self.interrupted {
            println!("Run interrupted.");
        }
        if !self.failures.is_empty() {
            println!("Test failed ({}) error(s).", self.failures.len());
        }
        false
    }
}

fn progress_dots(path: &str) -> String {
    ".".repeat(PROGRESS_WIDTH.saturating_sub(path.len()))
}

#[cfg(test)]
mod tests {
    use super::progress_dots;

    #[test]
    fn short_paths_pad_to_a_fixed_column() {
        assert_eq!(
            format!("Testing {}{}", "a.ipynb", progress_dots("a.ipynb")).len(),
            "Testing ".len() + 70
        );
    }

    #[test]
    fn overlong_paths_get_no_padding() {
        assert_eq!(progress_dots(&"x".repeat(90)), "");
    }
}
