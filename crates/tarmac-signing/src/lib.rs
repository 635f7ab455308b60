//! Tarmac Signing - Apple signing artifacts for release tooling
//!
//! This crate decodes the signing material found inside iOS application
//! packages:
//! - Provisioning profiles (`embedded.mobileprovision`)
//! - Developer certificates referenced by those profiles
//! - The distribution method a profile implies (ad hoc, App Store, ...)

pub mod archive_method;
pub mod certificate;
pub mod error;
pub mod profile;

pub use archive_method::ArchiveMethod;
pub use certificate::{Certificate, CertificateKind};
pub use error::{Result, SigningError};
pub use profile::ProvisioningProfile;
