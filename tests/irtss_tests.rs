//! iRTSS build and fetch against fake source trees.
//!
//! External tools are shell scripts placed where the real ones live, so
//! every test runs the actual process plumbing.

mod helpers;

use helpers::{assert_symlink, entries, write_file, TestEnv, DEBUG_CFG_TEXT, MULTITILE_TEXT};
use std::fs;
use x10i_setup::irtss;
use x10i_setup::patch::{DEBUG_CFG, MULTITILE_CONFIG};
use x10i_setup::plan::{IrtssMode, SetupPlan};
use x10i_setup::release::ReleaseDate;

const BUILD: IrtssMode = IrtssMode::Build { skip_build: false };
const SKIP: IrtssMode = IrtssMode::Build { skip_build: true };

fn plan(target: &str, mode: IrtssMode) -> SetupPlan {
    SetupPlan::new(target, 4, mode, false, false).unwrap()
}

// =============================================================================
// Build mode
// =============================================================================

#[test]
fn test_build_primary_target_activates_today() {
    let env = TestEnv::new();
    env.with_working_build();

    let date = irtss::build(&env.config(), &plan("i686-invasic-irtss", BUILD)).unwrap();
    assert_eq!(date, ReleaseDate::today());

    let store = env.store();
    assert_symlink(&store.join("current"), date.as_str());
    assert_symlink(&store.join("current/x86guest/default"), "generic");
    assert!(store.join("current/x86guest/default/lib/built-with-path").is_file());
}

#[test]
fn test_build_patches_config_before_building() {
    let env = TestEnv::new();
    env.with_working_build();

    let plan = SetupPlan::new("i686-invasic-irtss", 4, BUILD, true, true).unwrap();
    irtss::build(&env.config(), &plan).unwrap();

    let debug_cfg = env.read(&env.irtss.join(DEBUG_CFG));
    assert!(debug_cfg.contains("#define SUB_AGENT_TELEMETRY_ON  0\n"));
    assert!(debug_cfg.contains("#define SUB_AGENT_ON  0\n"));
    assert!(env
        .read(&env.irtss.join(MULTITILE_CONFIG))
        .contains("\nCONFIG_cf_gui_enabled=y\n"));
}

#[test]
fn test_build_runs_with_toolchain_path() {
    let env = TestEnv::new();
    env.with_working_build();
    let config = env.config();

    irtss::build(&config, &plan("i686-invasic-irtss", BUILD)).unwrap();

    let path = env.read(&env.store().join("current/x86guest/generic/lib/built-with-path"));
    assert_eq!(path.trim(), config.build_path());
    assert!(path.starts_with(&config.sparc_toolchain_bin.display().to_string()));
}

#[test]
fn test_sparc_build_uses_leon_variant() {
    let env = TestEnv::new();
    env.with_working_build();

    irtss::build(&env.config(), &plan("sparc-invasic-irtss", BUILD)).unwrap();

    assert_symlink(
        &env.store().join("current/leon/default"),
        "4t5c-chipit-w-iotile",
    );
    assert!(env
        .store()
        .join("current/leon/4t5c-chipit-w-iotile")
        .is_dir());
}

#[test]
fn test_build_driver_failure_leaves_store_untouched() {
    let env = TestEnv::new();
    env.with_generate_variants("exit 0\n")
        .with_build_driver("echo 'undefined symbol sched_yield'\nexit 2\n");

    let err = irtss::build(&env.config(), &plan("i686-invasic-irtss", BUILD)).unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("x86guest.generic"), "{msg}");
    assert!(msg.contains("exit code 2"), "{msg}");

    assert!(entries(&env.store()).is_empty());
}

#[test]
fn test_variant_generator_failure_stops_before_build_driver() {
    let env = TestEnv::new();
    env.with_generate_variants("exit 1\n")
        .with_build_driver("touch driver-ran\n");

    assert!(irtss::build(&env.config(), &plan("i686-invasic-irtss", BUILD)).is_err());
    assert!(!env.irtss.join("driver-ran").exists());
    assert!(entries(&env.store()).is_empty());
}

#[test]
fn test_missing_variant_generator_is_error() {
    let env = TestEnv::new();
    env.with_build_driver("exit 0\n");

    let err = irtss::build(&env.config(), &plan("i686-invasic-irtss", BUILD)).unwrap_err();
    assert!(err.to_string().contains("generateVariants.sh"), "{err}");
}

#[test]
fn test_skip_build_still_patches_and_activates() {
    let env = TestEnv::new();
    // Tools that would fail if they ran.
    env.with_generate_variants("exit 1\n").with_build_driver("exit 1\n");
    write_file(
        &env.irtss.join("releases/git/x86guest/generic/lib/prebuilt"),
        "old build\n",
    );

    let date = irtss::build(&env.config(), &plan("i686-invasic-irtss", SKIP)).unwrap();

    assert_symlink(&env.store().join("current"), date.as_str());
    assert_symlink(&env.store().join("current/x86guest/default"), "generic");
    assert!(env.store().join("current/x86guest/generic/lib/prebuilt").is_file());
    assert_ne!(env.read(&env.irtss.join(DEBUG_CFG)), DEBUG_CFG_TEXT);
}

#[test]
fn test_skip_build_without_release_tree_fails() {
    let env = TestEnv::new();
    let err = irtss::build(&env.config(), &plan("i686-invasic-irtss", SKIP)).unwrap_err();
    assert!(err.to_string().contains("Release tree not found"), "{err}");
}

#[test]
fn test_rebuild_same_day_replaces_dated_directory() {
    let env = TestEnv::new();
    env.with_working_build();
    let config = env.config();
    let plan = plan("i686-invasic-irtss", BUILD);

    let date = irtss::build(&config, &plan).unwrap();
    let stale = env.store().join(date.as_str()).join("x86guest/stale-file");
    write_file(&stale, "left over\n");

    irtss::build(&config, &plan).unwrap();

    assert!(!stale.exists());
    assert_eq!(entries(&env.store()), vec![date.to_string(), "current".to_string()]);
    assert_eq!(
        entries(&env.store().join("current/x86guest")),
        vec!["default".to_string(), "generic".to_string()]
    );
}

#[test]
fn test_visualize_off_restores_multitile_config() {
    let env = TestEnv::new();
    env.with_working_build();
    let config = env.config();

    let on = SetupPlan::new("i686-invasic-irtss", 4, SKIP, false, true).unwrap();
    write_file(&env.irtss.join("releases/git/x86guest/generic/x"), "");
    irtss::build(&config, &on).unwrap();
    irtss::build(&config, &plan("i686-invasic-irtss", SKIP)).unwrap();

    assert_eq!(env.read(&env.irtss.join(MULTITILE_CONFIG)), MULTITILE_TEXT);
}

// =============================================================================
// Fetch mode
// =============================================================================

const FETCH_LEON: &str = "\
mkdir -p octopos-app/releases/2017-03-14/leon/4t5c-chipit-w-iotile
cat > octopos_config.sh <<'CFG'
RELEASE_URL=\"https://example.invalid/octopos.tar.bz2\"
RELEASE_DATE=\"2017-03-14\"
CFG
";

#[test]
fn test_fetch_activates_tarball_date() {
    let env = TestEnv::new();
    env.with_fetch_script(FETCH_LEON);

    let date = irtss::fetch(&env.config(), &plan("sparc-invasic-irtss", IrtssMode::Tarball)).unwrap();

    assert_eq!(date.as_str(), "2017-03-14");
    assert_symlink(&env.store().join("current"), "2017-03-14");
    assert_symlink(
        &env.store().join("current/leon/default"),
        "4t5c-chipit-w-iotile",
    );
}

#[test]
fn test_fetch_does_not_patch_config() {
    let env = TestEnv::new();
    env.with_fetch_script(FETCH_LEON);

    irtss::fetch(&env.config(), &plan("sparc-invasic-irtss", IrtssMode::Tarball)).unwrap();
    assert_eq!(env.read(&env.irtss.join(DEBUG_CFG)), DEBUG_CFG_TEXT);
}

#[test]
fn test_fetch_failure_prints_and_aborts() {
    let env = TestEnv::new();
    env.with_fetch_script("echo 'curl: (6) Could not resolve host'\nexit 6\n");

    let err = irtss::fetch(&env.config(), &plan("sparc-invasic-irtss", IrtssMode::Tarball))
        .unwrap_err();
    assert!(err.to_string().contains("exit code 6"), "{err}");
    assert!(entries(&env.store()).is_empty());
}

#[test]
fn test_fetch_without_release_date_fails() {
    let env = TestEnv::new();
    env.with_fetch_script("echo 'RELEASE_URL=x' > octopos_config.sh\n");

    let err = irtss::fetch(&env.config(), &plan("sparc-invasic-irtss", IrtssMode::Tarball))
        .unwrap_err();
    assert!(format!("{:#}", err).contains("RELEASE_DATE"), "{err:#}");
    assert!(!env.store().join("current").exists());
}

#[test]
fn test_fetch_for_missing_architecture_fails_after_current() {
    let env = TestEnv::new();
    env.with_fetch_script(FETCH_LEON);

    let err = irtss::fetch(&env.config(), &plan("i686-invasic-irtss", IrtssMode::Tarball))
        .unwrap_err();
    assert!(err.to_string().contains("x86guest"), "{err}");
    // No rollback: `current` already moved.
    assert_symlink(&env.store().join("current"), "2017-03-14");
    assert!(fs::symlink_metadata(env.store().join("2017-03-14/x86guest/default")).is_err());
}
