//! Configuration management for x10i-setup.
//!
//! Reads source locations and the SPARC toolchain path from environment
//! variables. `main` loads `.env` into the environment first, so real
//! environment variables take precedence over the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default checkout of the x10i compiler.
pub const DEFAULT_X10I_PATH: &str = "~/git/x10i";
/// Default checkout of iRTSS.
pub const DEFAULT_IRTSS_PATH: &str = "~/git/irtss";
/// Default location of the sparc-elf cross compiler binaries.
pub const DEFAULT_SPARC_TOOLCHAIN_BIN: &str = "/data1/zwinkau/sparc-elf-6.1.0/bin";

/// System directories appended to the build PATH.
const SYSTEM_PATH: &str = "/usr/sbin:/sbin:/usr/bin:/bin";

/// x10i-setup configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// x10i source root (contains `x10.dist/` and `octopos-app/releases/`)
    pub x10i_root: PathBuf,
    /// iRTSS source root (contains `platform/` and `src/lib/debug-cfg.h`)
    pub irtss_root: PathBuf,
    /// sparc-elf toolchain `bin/` directory, first entry of the build PATH
    pub sparc_toolchain_bin: PathBuf,
    /// Home directory used for `~` expansion and `~/bin`
    pub home: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Self {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars, dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")))
    }

    /// Build configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>, home: PathBuf) -> Self {
        let path_var = |key: &str, default: &str| {
            let raw = vars.get(key).map(String::as_str).unwrap_or(default);
            expand_home(raw, &home)
        };

        Self {
            x10i_root: path_var("X10I_PATH", DEFAULT_X10I_PATH),
            irtss_root: path_var("IRTSS_PATH", DEFAULT_IRTSS_PATH),
            sparc_toolchain_bin: path_var("SPARC_TOOLCHAIN_BIN", DEFAULT_SPARC_TOOLCHAIN_BIN),
            home: home.clone(),
        }
    }

    /// Directory holding dated iRTSS releases for x10i.
    pub fn release_store(&self) -> PathBuf {
        self.x10i_root.join("octopos-app/releases")
    }

    /// Directory the x10i distribution is built from.
    pub fn x10_dist(&self) -> PathBuf {
        self.x10i_root.join("x10.dist")
    }

    /// PATH used for iRTSS builds: toolchain first, then iRTSS tools,
    /// `~/bin` and the system directories.
    pub fn build_path(&self) -> String {
        [
            self.sparc_toolchain_bin.clone(),
            self.irtss_root.join("tools/bin"),
            self.home.join("bin"),
        ]
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .chain(std::iter::once(SYSTEM_PATH.to_string()))
        .collect::<Vec<_>>()
        .join(":")
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  X10I_PATH: {}", self.x10i_root.display());
        println!("  IRTSS_PATH: {}", self.irtss_root.display());
        println!("  SPARC_TOOLCHAIN_BIN: {}", self.sparc_toolchain_bin.display());
    }
}

fn expand_home(raw: &str, home: &Path) -> PathBuf {
    match raw.strip_prefix("~") {
        Some("") => home.to_path_buf(),
        Some(rest) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(raw),
    }
}
