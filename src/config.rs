//! Harness configuration: defaults, an optional JSON file, and command-line
//! overrides merged in that order.

use crate::scan::IgnoreSet;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Names skipped unconditionally during scans: generated figure and model
/// directories plus local virtualenvs.
const DEFAULT_IGNORE: &[&str] = &["figures", "models", "venv"];

const DEFAULT_INTERPRETER: &str = "python3";

/// Corpus-specific harness settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Bare file or directory names the scanner skips.
    pub ignore: Vec<String>,
    /// Hosted-viewer URL prefixes rewritten to corpus-local paths before
    /// link validation.
    pub mirror_prefixes: BTreeMap<String, String>,
    /// Interpreter command for converted notebook code, split shell-style.
    pub interpreter: String,
    /// Kill a document's child process after this many seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            ignore: DEFAULT_IGNORE.iter().map(|name| name.to_string()).collect(),
            mirror_prefixes: BTreeMap::new(),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            timeout_secs: None,
        }
    }
}

/// Load a config JSON file over the defaults.
pub fn load_config(path: &Path) -> Result<HarnessConfig> {
    let bytes =
        fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("parse harness config {}", path.display()))
}

impl HarnessConfig {
    /// Fold command-line flags in. List-valued flags are additive; scalar
    /// flags replace the file/default value.
    pub fn merge_overrides(
        &mut self,
        ignore: &[String],
        mirror_prefixes: &[String],
        interpreter: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<()> {
        self.ignore.extend(ignore.iter().cloned());
        for entry in mirror_prefixes {
            let (prefix, replacement) = match entry.split_once('=') {
                Some((prefix, replacement)) => (prefix, replacement),
                None => (entry.as_str(), ""),
            };
            if prefix.is_empty() {
                return Err(anyhow!("empty mirror prefix in {entry:?}"));
            }
            self.mirror_prefixes
                .insert(prefix.to_string(), replacement.to_string());
        }
        if let Some(interpreter) = interpreter {
            self.interpreter = interpreter.to_string();
        }
        if timeout_secs.is_some() {
            self.timeout_secs = timeout_secs;
        }
        Ok(())
    }

    pub fn ignore_set(&self) -> IgnoreSet {
        IgnoreSet::new(self.ignore.iter().cloned())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Interpreter argv: shell-split, with a bare program name resolved on
    /// PATH so spawn failures surface here with a usable message.
    pub fn interpreter_argv(&self) -> Result<Vec<String>> {
        let mut argv = shell_words::split(&self.interpreter)
            .with_context(|| format!("parse interpreter command: {}", self.interpreter))?;
        let program = argv
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("interpreter command is empty"))?;
        if !program.contains('/') {
            let resolved = which::which(&program)
                .with_context(|| format!("locate interpreter {program} on PATH"))?;
            argv[0] = resolved.display().to_string();
        }
        Ok(argv)
    }
}

#[cfg(test)]
mod tests {
    use super::{load_config, HarnessConfig};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_cover_the_corpus_conventions() {
        let config = HarnessConfig::default();
        assert!(config.ignore.contains(&"figures".to_string()));
        assert!(config.ignore.contains(&"venv".to_string()));
        assert_eq!(config.interpreter, "python3");
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("harness.json");
        fs::write(
            &path,
            r#"{
                "ignore": ["wip.ipynb"],
                "mirror_prefixes": {"https://viewer.example/blob/main/": ""},
                "interpreter": "python3 -u",
                "timeout_secs": 3600
            }"#,
        )
        .expect("write config");

        let config = load_config(&path).expect("load config");
        assert_eq!(config.ignore, vec!["wip.ipynb"]);
        assert_eq!(config.timeout_secs, Some(3600));
        assert!(config
            .mirror_prefixes
            .contains_key("https://viewer.example/blob/main/"));
    }

    #[test]
    fn unknown_config_fields_are_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("harness.json");
        fs::write(&path, r#"{"ignores": []}"#).expect("write config");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn cli_overrides_are_additive_for_lists() {
        let mut config = HarnessConfig::default();
        config
            .merge_overrides(
                &["extra".to_string()],
                &["https://m.example/=".to_string()],
                Some("sh"),
                Some(5),
            )
            .expect("merge");
        assert!(config.ignore.contains(&"figures".to_string()));
        assert!(config.ignore.contains(&"extra".to_string()));
        assert_eq!(
            config.mirror_prefixes.get("https://m.example/"),
            Some(&String::new())
        );
        assert_eq!(config.interpreter, "sh");
        assert_eq!(config.timeout_secs, Some(5));
    }

    #[test]
    fn interpreter_argv_is_shell_split_and_resolved() {
        let mut config = HarnessConfig::default();
        config.interpreter = "sh -e".to_string();
        let argv = config.interpreter_argv().expect("resolve interpreter");
        assert_eq!(argv.len(), 2);
        assert!(argv[0].ends_with("/sh"));
        assert_eq!(argv[1], "-e");
    }
}
