//! iRTSS runtime: build from source or fetch a prebuilt release, then
//! activate it in x10i's release store.

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::patch;
use crate::plan::SetupPlan;
use crate::process::Cmd;
use crate::release::{ReleaseDate, ReleaseStore};
use crate::target::Arch;
use crate::timing::Timer;

/// Variant generator, relative to the iRTSS root.
const GENERATE_VARIANTS: &str = "platform/generateVariants.sh";
/// Where the platform build leaves its release trees, relative to the iRTSS root.
const BUILD_OUTPUT: &str = "releases/git";
/// x10i's tarball fetch script, run from the x10i root.
const FETCH_SCRIPT: &str = "./fetch_octopos.sh";
/// Shell config written by the fetch script.
const FETCH_CONFIG: &str = "octopos_config.sh";

/// Patch, build, install and activate iRTSS for `plan`.
///
/// When the plan skips the build, the external tools are left out but
/// patching, installation and activation still happen. A failing external
/// step returns before anything is installed.
pub fn build(config: &Config, plan: &SetupPlan) -> Result<ReleaseDate> {
    tracing::info!("build irtss");

    let t = Timer::start("Patch iRTSS config");
    let report = patch::apply(&config.irtss_root, &plan.patch.rules())?;
    tracing::debug!(lines = report.lines_changed(), "patched");
    t.finish();

    if !plan.builds_irtss() {
        tracing::info!("skip irtss build");
    } else {
        tracing::info!("Build {}.{}", plan.arch, plan.variant);

        let t = Timer::start("Generate variants");
        generate_variants(config)?;
        t.finish();

        let t = Timer::start("Build platform");
        build_platform(config, plan.arch, plan.variant)?;
        t.finish();
    }

    tracing::info!("Install to {}", config.x10i_root.display());
    let t = Timer::start("Install release");
    let date = ReleaseDate::today();
    let store = ReleaseStore::new(config.release_store());
    store.install_tree(&date, plan.arch, &release_tree(config, plan.arch))?;
    store.activate(&date, plan.arch, plan.variant)?;
    t.finish();

    Ok(date)
}

/// Fetch the prebuilt iRTSS tarball and activate the release it contains.
///
/// The fetch script unpacks into the release store itself; only the
/// activation links are written here.
pub fn fetch(config: &Config, plan: &SetupPlan) -> Result<ReleaseDate> {
    tracing::info!("Install iRTSS tarball");

    let t = Timer::start("Fetch iRTSS tarball");
    Cmd::shell(FETCH_SCRIPT)
        .dir(&config.x10i_root)
        .error_msg("Fetching the iRTSS tarball failed")
        .run()?;
    t.finish();

    let date = ReleaseDate::read_shell_config(&config.x10i_root.join(FETCH_CONFIG))?;
    tracing::info!("tarball date: {}", date);

    ReleaseStore::new(config.release_store()).activate(&date, plan.arch, plan.variant)?;
    Ok(date)
}

/// Produced release tree for `arch`.
pub fn release_tree(config: &Config, arch: Arch) -> PathBuf {
    config.irtss_root.join(BUILD_OUTPUT).join(arch.name())
}

/// Platform description handed to the build driver.
pub fn platform_file(arch: Arch, variant: &str) -> String {
    format!("platform/release.{}.{}.pm", arch, variant)
}

fn generate_variants(config: &Config) -> Result<()> {
    let script = config.irtss_root.join(GENERATE_VARIANTS);
    if !script.is_file() {
        bail!("Variant generator not found: {}", script.display());
    }
    Cmd::new(script.to_string_lossy())
        .dir(&config.irtss_root)
        .path_only(config.build_path())
        .error_msg("Generating iRTSS variants failed")
        .run()?;
    Ok(())
}

fn build_platform(config: &Config, arch: Arch, variant: &str) -> Result<()> {
    Cmd::shell(format!("build4platform.pl {}", platform_file(arch, variant)))
        .dir(&config.irtss_root)
        .path_only(config.build_path())
        .error_msg(format!("Building iRTSS {}.{} failed", arch, variant))
        .run()?;
    Ok(())
}
