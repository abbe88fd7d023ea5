//! Setup command - obtains iRTSS, builds x10i and prints the next step.

use anyhow::Result;

use crate::config::Config;
use crate::irtss;
use crate::plan::{IrtssMode, SetupPlan};
use crate::release::ReleaseDate;
use crate::x10i;

/// Execute a full setup run. Returns the activated release date.
pub fn cmd_setup(config: &Config, plan: &SetupPlan) -> Result<ReleaseDate> {
    tracing::debug!(?plan, "setup");

    let date = match plan.mode {
        IrtssMode::Tarball => irtss::fetch(config, plan)?,
        IrtssMode::Build { .. } => irtss::build(config, plan)?,
    };

    x10i::build(config, plan.target)?;

    println!("{}", x10i::activation_hint(plan.target));
    Ok(date)
}
