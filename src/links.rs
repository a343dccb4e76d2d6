//! Link extraction and validation for rendered corpus documents.
//!
//! Targets are classified once: remote URLs go through a run-scoped cache so
//! each URL is probed over the network at most once, and everything else is
//! resolved against the working tree. A configured mirror-prefix table maps
//! hosted-viewer deep links back to corpus-local paths so they are validated
//! on disk instead of over the network.

use crate::scan::Document;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Matches `[display](target)`; a target containing whitespace is not a link.
const LINK_PATTERN: &str = r"\[([^\]]*)\]\(([^)\s]+)\)";

/// A hung remote probe must not stall the run.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues one HEAD-equivalent probe per URL. Swapped for a scripted
/// implementation in tests.
pub trait Resolve {
    /// HTTP status for `url`; transport failures are errors and are treated
    /// by the caller as a broken link, never as a fatal condition.
    fn resolve(&self, url: &str) -> Result<u16>;
}

/// Production resolver: HEAD request with a bounded timeout. Redirects are
/// not followed so permanent/temporary moves surface as their own statuses.
pub struct UreqResolver {
    agent: ureq::Agent,
}

impl UreqResolver {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .timeout_global(Some(PROBE_TIMEOUT))
            .build();
        UreqResolver {
            agent: config.new_agent(),
        }
    }
}

impl Default for UreqResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolve for UreqResolver {
    fn resolve(&self, url: &str) -> Result<u16> {
        let response = self
            .agent
            .head(url)
            .call()
            .with_context(|| format!("probe {url}"))?;
        Ok(response.status().as_u16())
    }
}

/// Cached resolution status of one remote URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemoteStatus {
    Code(u16),
    Unreachable,
}

impl RemoteStatus {
    fn resolved(self) -> bool {
        matches!(self, RemoteStatus::Code(200 | 301 | 302))
    }
}

enum LinkTarget {
    Local(PathBuf),
    Remote(String),
}

/// Validates every link referenced by one document.
///
/// The cache is owned here and injected alongside the resolver, so a whole
/// run shares one probe history without any module-level state.
pub struct LinkChecker {
    root: PathBuf,
    mirror_prefixes: BTreeMap<String, String>,
    pattern: Regex,
    cache: Mutex<HashMap<String, RemoteStatus>>,
    resolver: Box<dyn Resolve>,
}

impl LinkChecker {
    pub fn new(
        root: &Path,
        mirror_prefixes: BTreeMap<String, String>,
        resolver: Box<dyn Resolve>,
    ) -> Self {
        LinkChecker {
            root: root.to_path_buf(),
            mirror_prefixes,
            pattern: Regex::new(LINK_PATTERN).expect("regex for markdown links"),
            cache: Mutex::new(HashMap::new()),
            resolver,
        }
    }

    /// All broken-link diagnostics for one rendered document; empty = pass.
    pub fn check(&self, doc: &Document, markdown: &str) -> Vec<String> {
        let mut diagnostics = Vec::new();
        for capture in self.pattern.captures_iter(markdown) {
            let display = &capture[1];
            let target = &capture[2];
            if is_figure_artifact(display, target) {
                continue;
            }
            match self.classify(doc, target) {
                LinkTarget::Remote(url) => {
                    let status = self.remote_status(&url);
                    if !status.resolved() {
                        diagnostics.push(match status {
                            RemoteStatus::Code(code) => format!("HTTP {code}: {url}"),
                            RemoteStatus::Unreachable => format!("HTTP error: {url}"),
                        });
                    }
                }
                LinkTarget::Local(path) => {
                    if !path.exists() {
                        diagnostics.push(format!("Unknown path: {}", path.display()));
                    }
                }
            }
        }
        diagnostics
    }

    fn classify(&self, doc: &Document, target: &str) -> LinkTarget {
        // Deep links into the hosted viewer are validated against the local
        // working tree instead of the network.
        for (prefix, replacement) in &self.mirror_prefixes {
            if let Some(rest) = target.strip_prefix(prefix.as_str()) {
                let rewritten = format!("{replacement}{rest}");
                let rooted = if rewritten.starts_with('/') {
                    rewritten
                } else {
                    format!("/{rewritten}")
                };
                return LinkTarget::Local(self.rooted_path(&rooted));
            }
        }

        let lowered = target.to_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            LinkTarget::Remote(target.to_string())
        } else if target.starts_with('/') {
            LinkTarget::Local(self.rooted_path(target))
        } else {
            LinkTarget::Local(doc.dir.join(target))
        }
    }

    fn rooted_path(&self, target: &str) -> PathBuf {
        self.root.join(target.trim_start_matches('/'))
    }

    fn remote_status(&self, url: &str) -> RemoteStatus {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(status) = cache.get(url) {
            tracing::debug!(url, "link cache hit");
            return *status;
        }
        let status = match self.resolver.resolve(url) {
            Ok(code) => RemoteStatus::Code(code),
            Err(error) => {
                tracing::debug!(url, error = %error, "link probe failed");
                RemoteStatus::Unreachable
            }
        };
        cache.insert(url.to_string(), status);
        status
    }
}

/// Notebook rendering names generated figures `output_*.png` / `output_*.svg`
/// and labels them with the bare image kind; those are artifacts of the
/// rendering, not authored references.
fn is_figure_artifact(display: &str, target: &str) -> bool {
    let convention = target.starts_with("output_")
        && (target.ends_with(".png") || target.ends_with(".svg"));
    convention && (display == "png" || display == "svg")
}
