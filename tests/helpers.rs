//! Shared test utilities for x10i-setup tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use x10i_setup::config::Config;
use x10i_setup::patch::{DEBUG_CFG, MULTITILE_CONFIG};

pub const DEBUG_CFG_TEXT: &str = "\
#ifndef DEBUG_CFG_H
#define DEBUG_CFG_H
#define SUB_AGENT_TELEMETRY_ON  1
#define SUB_AGENT_ON  1
#endif
";

pub const MULTITILE_TEXT: &str = "\
CONFIG_cf_tiles=4
# CONFIG_cf_gui_enabled is not set
CONFIG_cf_agent=y
";

/// Fake x10i and iRTSS checkouts in a temporary directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    pub x10i: PathBuf,
    pub irtss: PathBuf,
    pub home: PathBuf,
}

impl TestEnv {
    /// Create source roots with the configuration files and a release
    /// store, but no tool scripts.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let x10i = base.join("x10i");
        let irtss = base.join("irtss");
        let home = base.join("home");

        for dir in [
            x10i.join("x10.dist"),
            x10i.join("octopos-app/releases"),
            irtss.join("platform"),
            irtss.join("tools/bin"),
            home.clone(),
        ] {
            fs::create_dir_all(dir).expect("Failed to create source dir");
        }
        write_file(&irtss.join(DEBUG_CFG), DEBUG_CFG_TEXT);
        write_file(&irtss.join(MULTITILE_CONFIG), MULTITILE_TEXT);

        Self {
            _temp_dir: temp_dir,
            x10i,
            irtss,
            home,
        }
    }

    /// Configuration pointing at the fake roots.
    pub fn config(&self) -> Config {
        let vars: HashMap<String, String> = [
            ("X10I_PATH", &self.x10i),
            ("IRTSS_PATH", &self.irtss),
            ("SPARC_TOOLCHAIN_BIN", &self._temp_dir.path().join("sparc/bin")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.display().to_string()))
        .collect();
        Config::from_vars(&vars, self.home.clone())
    }

    pub fn store(&self) -> PathBuf {
        self.x10i.join("octopos-app/releases")
    }

    /// Install a variant generator that succeeds.
    pub fn with_generate_variants(&self, body: &str) -> &Self {
        write_script(&self.irtss.join("platform/generateVariants.sh"), body);
        self
    }

    /// Install a platform build driver on the iRTSS tools PATH.
    pub fn with_build_driver(&self, body: &str) -> &Self {
        write_script(&self.irtss.join("tools/bin/build4platform.pl"), body);
        self
    }

    /// Install x10i's tarball fetch script.
    pub fn with_fetch_script(&self, body: &str) -> &Self {
        write_script(&self.x10i.join("fetch_octopos.sh"), body);
        self
    }

    /// Scripts for a build that produces `releases/git/<arch>/<variant>/`.
    pub fn with_working_build(&self) -> &Self {
        self.with_generate_variants("echo generated > platform/.variants\n")
            .with_build_driver(
                "pm=$(basename \"$1\" .pm)\n\
                 arch=$(echo \"$pm\" | cut -d. -f2)\n\
                 variant=$(echo \"$pm\" | cut -d. -f3-)\n\
                 mkdir -p releases/git/$arch/$variant/lib\n\
                 echo \"$PATH\" > releases/git/$arch/$variant/lib/built-with-path\n",
            )
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).expect("Failed to read file")
    }
}

/// Write a file, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Write an executable `/bin/sh` script.
pub fn write_script(path: &Path, body: &str) {
    write_file(path, &format!("#!/bin/sh\n{}", body));
    let mut perms = fs::metadata(path).expect("Failed to get metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("Failed to set permissions");
}

/// Assert that a symlink exists and points to the expected target.
pub fn assert_symlink(path: &Path, expected_target: &str) {
    assert!(
        path.is_symlink(),
        "Expected symlink at {}, but it's not a symlink",
        path.display()
    );

    let target = fs::read_link(path).expect("Failed to read symlink");
    assert_eq!(
        target.to_string_lossy(),
        expected_target,
        "Symlink {} points to {:?}, expected {}",
        path.display(),
        target,
        expected_target
    );
}

/// Names of the entries directly inside `dir`, sorted.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
