//! x10i application build.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::process::Cmd;
use crate::target::Target;
use crate::timing::Timer;

/// Ant command building the firm distribution for `target`.
pub fn ant_command(target: Target) -> String {
    format!("ant dist-firm -DTARGET={}", target)
}

/// Build x10i against the installed iRTSS release.
pub fn build(config: &Config, target: Target) -> Result<()> {
    let dist = config.x10_dist();
    if !dist.is_dir() {
        bail!("x10i distribution directory not found: {}", dist.display());
    }

    tracing::info!("Build x10i {}", target);
    let t = Timer::start("Build x10i");
    Cmd::shell(ant_command(target))
        .dir(&dist)
        .error_msg(format!("Building x10i for {} failed", target))
        .run()?;
    t.finish();
    Ok(())
}

/// What the user runs once setup is done.
pub fn activation_hint(target: Target) -> String {
    format!("Now use `x10-firm -mtarget={}`", target)
}
