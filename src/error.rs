//! Configuration errors that abort a run before anything is touched.

use thiserror::Error;

use crate::target::{Arch, Target};

/// Errors raised while validating the requested setup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("unknown target '{0}' (known: {})", Target::known_names())]
    UnknownTarget(String),

    #[error("unsupported tile count {tiles} for architecture {arch}")]
    UnsupportedTileCount { arch: Arch, tiles: u32 },

    #[error("--visualize is only supported for {expected}, not {target}")]
    VisualizeUnsupported { target: Target, expected: Target },
}
