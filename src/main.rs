//! x10i-setup - build x10i and iRTSS for InvasIC targets.
//!
//! Obtains an iRTSS release (built from source or fetched as a tarball),
//! activates it in x10i's release store via the `current`/`default` links,
//! builds x10i for the target and prints the command to use next.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use x10i_setup::commands;
use x10i_setup::config::Config;
use x10i_setup::plan::{IrtssMode, SetupPlan};
use x10i_setup::preflight::{self, ToolNeeds};
use x10i_setup::target::Target;

#[derive(Parser)]
#[command(name = "x10i-setup")]
#[command(about = "Build x10i and iRTSS for certain systems.")]
#[command(
    after_help = "ENVIRONMENT:\n  X10I_PATH            x10i checkout (default: ~/git/x10i)\n  IRTSS_PATH           iRTSS checkout (default: ~/git/irtss)\n  SPARC_TOOLCHAIN_BIN  sparc-elf toolchain bin/ directory"
)]
struct Cli {
    /// Target to build for
    #[arg(default_value = Target::PRIMARY.name())]
    target: String,

    /// Show debug output
    #[arg(long)]
    debug: bool,

    /// Do not build iRTSS (config patching and activation still happen)
    #[arg(long)]
    skip_irtss: bool,

    /// Use the iRTSS from the x10i tarball instead of the git repo
    #[arg(long)]
    tarball_irtss: bool,

    /// Make agent system send out visualization data (only for
    /// i686-invasic-irtss, also rejected with --tarball-irtss for other targets)
    #[arg(long)]
    visualize: bool,

    /// Make agent system log debug info
    #[arg(long)]
    debug_agent: bool,

    /// Number of tiles
    #[arg(long, value_name = "T", default_value_t = 4)]
    tilecount: u32,

    /// List installed iRTSS releases and exit
    #[arg(long)]
    list_releases: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();

    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = Config::load();
    if cli.debug {
        config.print();
    }

    if cli.list_releases {
        return commands::cmd_list_releases(&config);
    }

    let mode = if cli.tarball_irtss {
        IrtssMode::Tarball
    } else {
        IrtssMode::Build {
            skip_build: cli.skip_irtss,
        }
    };
    let plan = SetupPlan::new(
        &cli.target,
        cli.tilecount,
        mode,
        cli.debug_agent,
        cli.visualize,
    )?;

    let report = preflight::run_preflight(
        &config,
        ToolNeeds {
            irtss_build: plan.builds_irtss(),
        },
    );
    report.log();
    if !report.all_passed() {
        for message in report.failure_messages() {
            eprintln!("{}", message);
        }
        std::process::exit(1);
    }

    commands::cmd_setup(&config, &plan)?;
    Ok(())
}
