//! Application package inspection for Tarmac
//!
//! Reads iOS application archives (`.ipa`) without unpacking them: the
//! bundle's `Info.plist` and `embedded.mobileprovision` are read straight
//! from the zip container and exposed as typed, memoized properties.
//!
//! ## Usage
//!
//! ```ignore
//! use tarmac_packages::Ipa;
//!
//! let ipa = Ipa::new("build/MyApp.ipa")?;
//! println!("{} {}", ipa.bundle_identifier()?, ipa.version());
//! let summary = ipa.summary()?;
//! ```
//!
//! Some large archives store entries with compression methods the in-process
//! zip reader cannot decode. Those entries are read through an [`Unzipper`],
//! by default the system `unzip` binary.

pub mod error;
pub mod ipa;
pub mod summary;
pub mod unzip;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::{PackageError, Result};
pub use ipa::Ipa;
pub use summary::PackageSummary;
pub use unzip::{SystemUnzip, Unzipper};
