//! CLI commands

mod init;
mod ipa;

pub use init::InitCommand;
pub use ipa::IpaCommand;
