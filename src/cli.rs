//! CLI argument parsing for the corpus harness.
//!
//! The CLI is intentionally thin: mode selection plus configuration
//! overrides, with all policy living in the library modules.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for the corpus harness.
#[derive(Parser, Debug)]
#[command(
    name = "nbcheck",
    version,
    about = "Regression test harness for notebook example corpora",
    after_help = "Commands:\n  test [ROOT]   Run every notebook in isolation and report failures\n  links [ROOT]  Validate every link referenced by the corpus\n\nExamples:\n  nbcheck test\n  nbcheck test examples --timeout-secs 3600\n  nbcheck links --config harness.json\n  nbcheck links --mirror-prefix https://viewer.example/corpus/blob/main/",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level harness modes, selected once for the whole run.
#[derive(Subcommand, Debug)]
pub enum Command {
    Test(TestArgs),
    Links(LinksArgs),
}

/// Execution-mode inputs.
#[derive(Parser, Debug)]
#[command(about = "Run every notebook in isolation and report failures")]
pub struct TestArgs {
    /// Corpus root directory to scan
    #[arg(value_name = "ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Harness config JSON file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Additional file or directory names to skip
    #[arg(long, value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Interpreter command for converted notebook code
    #[arg(long, value_name = "CMD")]
    pub interpreter: Option<String>,

    /// Kill a document's child process after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Emit a verbose transcript of the run
    #[arg(long)]
    pub verbose: bool,
}

/// Link-check-mode inputs.
#[derive(Parser, Debug)]
#[command(about = "Validate every link referenced by the corpus")]
pub struct LinksArgs {
    /// Corpus root directory to scan
    #[arg(value_name = "ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Harness config JSON file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Additional file or directory names to skip
    #[arg(long, value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Hosted-viewer URL prefix rewritten to a corpus-local path
    /// (PREFIX or PREFIX=REPLACEMENT)
    #[arg(long, value_name = "PREFIX")]
    pub mirror_prefix: Vec<String>,

    /// Emit a verbose transcript of the run
    #[arg(long)]
    pub verbose: bool,
}
