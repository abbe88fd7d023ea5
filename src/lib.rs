//! x10i-setup library exports.
//!
//! The binary is a thin CLI over these modules; integration tests drive
//! them directly against temporary source trees.

pub mod commands;
pub mod config;
pub mod error;
pub mod irtss;
pub mod patch;
pub mod plan;
pub mod preflight;
pub mod process;
pub mod release;
pub mod target;
pub mod timing;
pub mod x10i;

pub use error::SetupError;
