//! CLI command handlers.
//!
//! - `setup` - Obtain iRTSS, build x10i, print the activation hint
//! - `releases` - List installed iRTSS releases

pub mod releases;
pub mod setup;

pub use releases::cmd_list_releases;
pub use setup::cmd_setup;
