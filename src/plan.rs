//! Validated setup request.
//!
//! Every configuration error surfaces here, before any file is patched or
//! any external tool is started.

use crate::error::SetupError;
use crate::patch::PatchFlags;
use crate::target::{Arch, Target};

/// How the iRTSS release is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrtssMode {
    /// Patch the iRTSS config, build it (unless `skip_build`), install the
    /// release tree under today's date and activate it.
    Build { skip_build: bool },
    /// Download the prebuilt release with x10i's fetch script and activate
    /// the date it reports.
    Tarball,
}

/// Everything a setup run needs to know, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPlan {
    pub target: Target,
    pub arch: Arch,
    pub variant: &'static str,
    pub tiles: u32,
    pub mode: IrtssMode,
    pub patch: PatchFlags,
}

impl SetupPlan {
    pub fn new(
        target: &str,
        tiles: u32,
        mode: IrtssMode,
        debug_agent: bool,
        visualize: bool,
    ) -> Result<Self, SetupError> {
        let target: Target = target.parse()?;
        let arch = target.arch();
        let variant = arch.variant(tiles)?;
        let patch = PatchFlags::for_target(target, debug_agent, visualize)?;

        Ok(Self {
            target,
            arch,
            variant,
            tiles,
            mode,
            patch,
        })
    }

    /// True when the platform build driver will run.
    pub fn builds_irtss(&self) -> bool {
        self.mode == IrtssMode::Build { skip_build: false }
    }
}
