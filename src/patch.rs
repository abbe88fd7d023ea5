//! iRTSS configuration patching.
//!
//! Feature flags live as literal lines in generated iRTSS configuration
//! files. Each flag has exactly two literal forms; a [`PatchRule`] rewrites
//! one form into the other. Rules are applied in order, one read/rewrite
//! pass per file, and every line is re-emitted unchanged apart from the
//! matched text.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::error::SetupError;
use crate::target::Target;

/// Debug/feature header, relative to the iRTSS root.
pub const DEBUG_CFG: &str = "src/lib/debug-cfg.h";
/// Multitile x86guest release configuration, relative to the iRTSS root.
pub const MULTITILE_CONFIG: &str =
    "app/release.x86guest.multitile/release.x86guest.multitile.config";

const TELEMETRY_ON: &str = "SUB_AGENT_TELEMETRY_ON  1";
const TELEMETRY_OFF: &str = "SUB_AGENT_TELEMETRY_ON  0";
const AGENT_ON: &str = "SUB_AGENT_ON  1";
const AGENT_OFF: &str = "SUB_AGENT_ON  0";
const GUI_DISABLED: &str = "# CONFIG_cf_gui_enabled is not set";
const GUI_ENABLED: &str = "CONFIG_cf_gui_enabled=y";

/// One literal substitution in one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchRule {
    /// File relative to the iRTSS root.
    pub file: &'static str,
    pub old: &'static str,
    pub new: &'static str,
}

/// Flags the patcher converges the configuration files to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchFlags {
    pub debug_agent: bool,
    pub visualize: bool,
}

impl PatchFlags {
    /// Validate the flags for `target`. Visualization is only wired up for
    /// the primary x86guest target.
    pub fn for_target(
        target: Target,
        debug_agent: bool,
        visualize: bool,
    ) -> Result<Self, SetupError> {
        if visualize && target != Target::PRIMARY {
            return Err(SetupError::VisualizeUnsupported {
                target,
                expected: Target::PRIMARY,
            });
        }
        Ok(Self {
            debug_agent,
            visualize,
        })
    }

    /// Ordered rule set for these flags.
    pub fn rules(&self) -> Vec<PatchRule> {
        let rule = |file, old, new| PatchRule { file, old, new };

        vec![
            rule(DEBUG_CFG, TELEMETRY_ON, TELEMETRY_OFF),
            // Agent debugging turns SUB_AGENT_ON *off*. Inverted relative to the
            // telemetry flag, kept as the iRTSS tree expects it.
            if self.debug_agent {
                rule(DEBUG_CFG, AGENT_ON, AGENT_OFF)
            } else {
                rule(DEBUG_CFG, AGENT_OFF, AGENT_ON)
            },
            if self.visualize {
                rule(MULTITILE_CONFIG, GUI_DISABLED, GUI_ENABLED)
            } else {
                rule(MULTITILE_CONFIG, GUI_ENABLED, GUI_DISABLED)
            },
        ]
    }
}

/// What happened to a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub rule: PatchRule,
    /// Lines in which `old` was replaced.
    pub lines_changed: usize,
    /// `new` is present in the file after patching.
    pub converged: bool,
}

impl RuleOutcome {
    /// Neither literal form was found: the flag cannot take effect.
    pub fn is_noop(&self) -> bool {
        self.lines_changed == 0 && !self.converged
    }
}

/// Outcome of a patch run.
#[derive(Debug, Clone, Default)]
pub struct PatchReport {
    pub outcomes: Vec<RuleOutcome>,
}

impl PatchReport {
    /// Rules whose markers were missing from their file.
    pub fn noops(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.outcomes.iter().filter(|o| o.is_noop())
    }

    pub fn lines_changed(&self) -> usize {
        self.outcomes.iter().map(|o| o.lines_changed).sum()
    }
}

/// Apply `rules` to the files below `root`.
///
/// Missing files are errors. Missing markers are not: the file is left as
/// is and the rule is reported as a no-op with a warning.
pub fn apply(root: &Path, rules: &[PatchRule]) -> Result<PatchReport> {
    let mut report = PatchReport::default();

    let mut files: Vec<&'static str> = Vec::new();
    for rule in rules {
        if !files.contains(&rule.file) {
            files.push(rule.file);
        }
    }

    for file in files {
        let path = root.join(file);
        let file_rules: Vec<PatchRule> =
            rules.iter().copied().filter(|r| r.file == file).collect();
        let outcomes = patch_file(&path, &file_rules)?;
        for outcome in &outcomes {
            if outcome.is_noop() {
                tracing::warn!(
                    file = %path.display(),
                    marker = outcome.rule.old,
                    "neither '{}' nor '{}' found; flag left unchanged",
                    outcome.rule.old,
                    outcome.rule.new
                );
            }
        }
        report.outcomes.extend(outcomes);
    }

    Ok(report)
}

fn patch_file(path: &Path, rules: &[PatchRule]) -> Result<Vec<RuleOutcome>> {
    let original =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut counts = vec![0usize; rules.len()];
    let mut patched = String::with_capacity(original.len());

    for line in original.split_inclusive('\n') {
        let mut line = line.to_string();
        for (rule, count) in rules.iter().zip(counts.iter_mut()) {
            if line.contains(rule.old) {
                line = line.replace(rule.old, rule.new);
                *count += 1;
            }
        }
        patched.push_str(&line);
    }

    if patched != original {
        tracing::debug!(file = %path.display(), "rewrite");
        fs::write(path, &patched)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(rules
        .iter()
        .zip(counts)
        .map(|(rule, lines_changed)| RuleOutcome {
            rule: *rule,
            lines_changed,
            converged: patched.contains(rule.new),
        })
        .collect())
}
