//! Preflight checks run before anything is patched or built.
//!
//! Source roots are hard requirements. Missing tools are only warnings:
//! the iRTSS build runs with its own PATH, and a tool absent here may still
//! be found there.

use std::path::Path;

use crate::config::Config;

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check failed - setup cannot start.
    Fail,
    /// Check passed but with a warning.
    Warn,
}

impl CheckResult {
    fn pass_with(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: Some(details.to_string()),
        }
    }

    fn fail(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            details: Some(details.to_string()),
        }
    }

    fn warn(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warn,
            details: Some(details.to_string()),
        }
    }
}

/// Results of all preflight checks.
#[derive(Debug, Clone)]
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Returns true if no check failed.
    pub fn all_passed(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Failed checks, in the order they ran.
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| c.status == CheckStatus::Fail)
    }

    /// One diagnostic line per failed check.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures()
            .map(|c| c.details.clone().unwrap_or_else(|| c.name.clone()))
            .collect()
    }

    /// Emit passed and warned checks through the log. Failures are left to
    /// the caller, which reports them once with `failure_messages`.
    pub fn log(&self) {
        for check in &self.checks {
            let details = check.details.as_deref().unwrap_or("");
            match check.status {
                CheckStatus::Pass => tracing::debug!(check = %check.name, "{}", details),
                CheckStatus::Warn => tracing::warn!(check = %check.name, "{}", details),
                CheckStatus::Fail => {}
            }
        }
    }
}

/// Which external tools the upcoming run will invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolNeeds {
    /// The iRTSS platform build runs (`build4platform.pl`, perl).
    pub irtss_build: bool,
}

/// Run all preflight checks.
pub fn run_preflight(config: &Config, needs: ToolNeeds) -> PreflightReport {
    let mut checks = check_source_roots(config);

    // Tool checks only make sense once the roots are known to exist.
    if checks.iter().all(|c| c.status != CheckStatus::Fail) {
        checks.extend(check_host_tools(config, needs));
    }

    PreflightReport { checks }
}

fn check_source_roots(config: &Config) -> Vec<CheckResult> {
    [("x10i", &config.x10i_root), ("irtss", &config.irtss_root)]
        .into_iter()
        .map(|(name, root)| check_dir(name, root))
        .collect()
}

fn check_dir(name: &str, dir: &Path) -> CheckResult {
    if dir.is_dir() {
        CheckResult::pass_with(name, &dir.display().to_string())
    } else {
        CheckResult::fail(name, &format!("No {} found: {}", name, dir.display()))
    }
}

fn check_host_tools(config: &Config, needs: ToolNeeds) -> Vec<CheckResult> {
    let mut results = vec![
        check_tool("sh", "Required to run build scripts"),
        check_tool("ant", "Required to build x10i"),
    ];

    if needs.irtss_build {
        let build_path = config.build_path();
        for tool in ["perl", "build4platform.pl"] {
            let found = which::which_in(tool, Some(&build_path), &config.irtss_root);
            results.push(match found {
                Ok(path) => CheckResult::pass_with(tool, &path.display().to_string()),
                Err(_) => CheckResult::warn(
                    tool,
                    &format!("Not found in build PATH {}", build_path),
                ),
            });
        }
    }

    results
}

fn check_tool(tool: &str, purpose: &str) -> CheckResult {
    match which::which(tool) {
        Ok(path) => CheckResult::pass_with(tool, &path.display().to_string()),
        Err(_) => CheckResult::warn(tool, &format!("Not found. {}", purpose)),
    }
}
