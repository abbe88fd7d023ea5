//! Target resolution.
//!
//! Maps a logical target name to its iRTSS architecture, and an
//! (architecture, tile count) pair to the platform variant that gets built.
//! Both tables are static; lookups are pure.

use std::fmt;
use std::str::FromStr;

use crate::error::SetupError;

/// Logical build targets understood by the x10i toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    I686InvasicIrtss,
    I686InvasicOctopos,
    SparcInvasicIrtss,
}

/// iRTSS platform families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86Guest,
    Leon,
    X64Native,
}

/// (architecture, tiles) → variant.
const VARIANTS: &[(Arch, u32, &str)] = &[
    (Arch::X86Guest, 4, "generic"),
    (Arch::X86Guest, 6, "generic"),
    (Arch::X86Guest, 8, "generic"),
    // Matches the 2017-03 iRTSS; newer trees call this generic-swcpy-w-iotile.
    (Arch::Leon, 4, "4t5c-chipit-w-iotile"),
];

impl Target {
    /// Target used when none is given, and the only one that can visualize.
    pub const PRIMARY: Target = Target::I686InvasicIrtss;

    pub const ALL: [Target; 3] = [
        Target::I686InvasicIrtss,
        Target::I686InvasicOctopos,
        Target::SparcInvasicIrtss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Target::I686InvasicIrtss => "i686-invasic-irtss",
            Target::I686InvasicOctopos => "i686-invasic-octopos",
            Target::SparcInvasicIrtss => "sparc-invasic-irtss",
        }
    }

    /// Architecture the target runs on.
    pub fn arch(self) -> Arch {
        match self {
            Target::I686InvasicIrtss | Target::I686InvasicOctopos => Arch::X86Guest,
            Target::SparcInvasicIrtss => Arch::Leon,
        }
    }

    pub(crate) fn known_names() -> String {
        Self::ALL.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for Target {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| SetupError::UnknownTarget(s.to_string()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Arch {
    pub fn name(self) -> &'static str {
        match self {
            Arch::X86Guest => "x86guest",
            Arch::Leon => "leon",
            Arch::X64Native => "x64native",
        }
    }

    /// Look up the platform variant built for `tiles` tiles.
    pub fn variant(self, tiles: u32) -> Result<&'static str, SetupError> {
        VARIANTS
            .iter()
            .find(|(arch, t, _)| *arch == self && *t == tiles)
            .map(|(_, _, variant)| *variant)
            .ok_or(SetupError::UnsupportedTileCount { arch: self, tiles })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a target name to its architecture.
pub fn resolve_arch(target: &str) -> Result<Arch, SetupError> {
    Ok(target.parse::<Target>()?.arch())
}
