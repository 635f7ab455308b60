//! iOS application archives (`.ipa`)
//!
//! An `.ipa` is a zip container holding a single application bundle at
//! `Payload/<name>.app/`. The bundle's `Info.plist` is decoded when the
//! package is opened; the embedded provisioning profile and its signing
//! certificate are decoded on first use. All of them are cached for the
//! lifetime of the [`Ipa`].

use std::cell::OnceCell;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use plist::{Dictionary, Value};
use tarmac_signing::{ArchiveMethod, Certificate, ProvisioningProfile};
use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::{CompressionMethod, ZipArchive};

use crate::error::{PackageError, Result};
use crate::summary::PackageSummary;
use crate::unzip::{SystemUnzip, Unzipper};

const PAYLOAD_DIR: &str = "Payload";
const APP_EXTENSION: &str = ".app";
const INFO_PLIST: &str = "Info.plist";
const EMBEDDED_PROFILE: &str = "embedded.mobileprovision";

#[cfg(unix)]
const OWNER_WRITE: u32 = 0o200;

/// Compression methods the in-process reader decodes
const DECODABLE_METHODS: [CompressionMethod; 2] =
    [CompressionMethod::Stored, CompressionMethod::Deflated];

/// An iOS application package on disk
pub struct Ipa<U: Unzipper = SystemUnzip> {
    path: PathBuf,
    unzipper: U,
    info_plist: Dictionary,
    embedded_profile: OnceCell<Option<ProvisioningProfile>>,
    certificate: OnceCell<Option<Certificate>>,
}

impl Ipa {
    /// Open a package, falling back to the system `unzip` when needed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_unzipper(path, SystemUnzip::default())
    }
}

impl<U: Unzipper> Ipa<U> {
    /// Open a package with a custom external decompressor.
    ///
    /// Fails with [`PackageError::InvalidPackage`] when the file is not a
    /// zip container or holds no readable `Payload/*.app/Info.plist`.
    pub fn with_unzipper(path: impl Into<PathBuf>, unzipper: U) -> Result<Self> {
        let path = path.into();
        debug!(path = %path.display(), "opening application package");

        let info_plist = read_bundle_file(&path, &unzipper, INFO_PLIST)
            .and_then(|content| Ok(plist::from_bytes::<Dictionary>(&content)?))
            .map_err(|e| match e {
                PackageError::CommandFailed { .. } => e,
                other => PackageError::InvalidPackage {
                    path: path.clone(),
                    reason: other.to_string(),
                },
            })?;

        Ok(Self {
            path,
            unzipper,
            info_plist,
            embedded_profile: OnceCell::new(),
            certificate: OnceCell::new(),
        })
    }

    /// Path of the package on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Contents of `Payload/*.app/<filename>`
    pub fn read_app_file(&self, filename: &str) -> Result<Vec<u8>> {
        read_bundle_file(&self.path, &self.unzipper, filename)
    }

    /// Extract the application bundle into `target_directory`.
    ///
    /// Returns the path of the extracted `Payload/<name>.app` directory.
    pub fn extract_app(&self, target_directory: &Path) -> Result<PathBuf> {
        info!(
            path = %self.path.display(),
            target = %target_directory.display(),
            "extracting application bundle"
        );
        let mut archive = open_archive(&self.path)?;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if !is_app_entry(entry.name()) {
                continue;
            }

            let Some(relative_path) = entry.enclosed_name() else {
                warn!(entry = entry.name(), "skipping entry outside the target directory");
                continue;
            };
            let out_path = target_directory.join(relative_path);

            if entry.is_dir() {
                fs::create_dir_all(&out_path)?;
                continue;
            }

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out_file = File::create(&out_path)?;
            io::copy(&mut entry, &mut out_file)?;

            if let Some(mode) = entry.unix_mode() {
                set_mode(&out_path, mode)?;
            }
        }

        find_app_dir(&target_directory.join(PAYLOAD_DIR)).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!(
                    "Failed to extract {}/*{} from {}",
                    PAYLOAD_DIR,
                    APP_EXTENSION,
                    self.path.display()
                ),
            )
            .into()
        })
    }

    /// The decoded `Info.plist`
    pub fn info_plist(&self) -> &Dictionary {
        &self.info_plist
    }

    /// `CFBundleIdentifier`
    pub fn bundle_identifier(&self) -> Result<&str> {
        self.info_plist
            .get("CFBundleIdentifier")
            .and_then(Value::as_string)
            .ok_or_else(|| PackageError::MissingKey("CFBundleIdentifier".to_string()))
    }

    /// `CFBundleDisplayName`, else `CFBundleName`, else empty
    pub fn app_name(&self) -> &str {
        self.non_empty_string("CFBundleDisplayName")
            .or_else(|| self.non_empty_string("CFBundleName"))
            .unwrap_or_default()
    }

    /// `CFBundleShortVersionString`, else the version code
    pub fn version(&self) -> &str {
        self.non_empty_string("CFBundleShortVersionString")
            .unwrap_or_else(|| self.version_code())
    }

    /// `CFBundleVersion`
    pub fn version_code(&self) -> &str {
        self.string("CFBundleVersion")
    }

    /// `MinimumOSVersion`
    pub fn minimum_os_version(&self) -> &str {
        self.string("MinimumOSVersion")
    }

    /// `CFBundleSupportedPlatforms`
    pub fn supported_platforms(&self) -> Vec<String> {
        self.info_plist
            .get("CFBundleSupportedPlatforms")
            .and_then(Value::as_array)
            .map(|platforms| {
                platforms
                    .iter()
                    .filter_map(Value::as_string)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether any supported platform looks like tvOS
    pub fn is_for_tvos(&self) -> bool {
        self.supported_platforms()
            .iter()
            .any(|platform| platform.to_lowercase().contains("tv"))
    }

    /// The bundle's `embedded.mobileprovision`, if it has one
    pub fn embedded_provisioning_profile(&self) -> Result<Option<&ProvisioningProfile>> {
        if let Some(profile) = self.embedded_profile.get() {
            return Ok(profile.as_ref());
        }

        let profile = match self.read_app_file(EMBEDDED_PROFILE) {
            Ok(content) => Some(ProvisioningProfile::from_content(&content)?),
            Err(PackageError::FileNotFound { .. }) => {
                debug!(path = %self.path.display(), "package has no embedded provisioning profile");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(self.embedded_profile.get_or_init(|| profile).as_ref())
    }

    /// First certificate of the embedded provisioning profile
    pub fn certificate(&self) -> Result<Option<&Certificate>> {
        if let Some(certificate) = self.certificate.get() {
            return Ok(certificate.as_ref());
        }

        let certificate = match self.embedded_provisioning_profile()? {
            Some(profile) => profile.certificates()?.into_iter().next(),
            None => None,
        };

        Ok(self.certificate.get_or_init(|| certificate).as_ref())
    }

    /// Distribution method implied by the embedded profile
    pub fn archive_method(&self) -> Result<ArchiveMethod> {
        Ok(ArchiveMethod::from_profiles(
            self.embedded_provisioning_profile()?,
        ))
    }

    /// Devices the embedded profile is provisioned for
    pub fn provisioned_devices(&self) -> Result<&[String]> {
        Ok(self
            .embedded_provisioning_profile()?
            .map(|profile| profile.provisioned_devices.as_slice())
            .unwrap_or_default())
    }

    /// Whether the embedded profile provisions all devices
    pub fn provisions_all_devices(&self) -> Result<bool> {
        Ok(self
            .embedded_provisioning_profile()?
            .is_some_and(|profile| profile.provisions_all_devices))
    }

    /// Flat summary for display
    pub fn summary(&self) -> Result<PackageSummary> {
        Ok(PackageSummary {
            app_name: self.app_name().to_string(),
            bundle_identifier: self.bundle_identifier()?.to_string(),
            certificate_expires: self
                .certificate()?
                .map(|certificate| PackageSummary::format_expiry(&certificate.expires_at)),
            distribution_type: self.archive_method()?.display_name().to_string(),
            min_os_version: self.minimum_os_version().to_string(),
            provisioned_devices: self.provisioned_devices()?.to_vec(),
            provisions_all_devices: self.provisions_all_devices()?,
            supported_platforms: self.supported_platforms(),
            version: self.version().to_string(),
            version_code: self.version_code().to_string(),
        })
    }

    fn string(&self, key: &str) -> &str {
        self.info_plist
            .get(key)
            .and_then(Value::as_string)
            .unwrap_or_default()
    }

    fn non_empty_string(&self, key: &str) -> Option<&str> {
        self.info_plist
            .get(key)
            .and_then(Value::as_string)
            .filter(|value| !value.is_empty())
    }
}

impl<U: Unzipper> std::fmt::Debug for Ipa<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ipa").field("path", &self.path).finish()
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path)?;
    Ok(ZipArchive::new(file)?)
}

/// Read `Payload/*.app/<filename>`, handing entries with undecodable
/// compression methods to the external unzipper
fn read_bundle_file(path: &Path, unzipper: &impl Unzipper, filename: &str) -> Result<Vec<u8>> {
    let mut archive = open_archive(path)?;

    let entry_name = archive
        .file_names()
        .find(|name| is_bundle_file(name, filename))
        .map(str::to_string)
        .ok_or_else(|| PackageError::FileNotFound {
            pattern: format!("{}/*{}/{}", PAYLOAD_DIR, APP_EXTENSION, filename),
            path: path.to_path_buf(),
        })?;

    let err = match archive.by_name(&entry_name) {
        Ok(mut entry) => {
            let mut content = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut content)?;
            return Ok(content);
        }
        Err(err) => err,
    };

    if !matches!(err, ZipError::UnsupportedArchive(_)) {
        return Err(err.into());
    }

    let compression = archive
        .index_for_name(&entry_name)
        .map(|index| archive.by_index_raw(index).map(|entry| entry.compression()))
        .transpose()?;
    match compression {
        Some(method) if !DECODABLE_METHODS.contains(&method) => {
            debug!(
                entry = %entry_name,
                ?method,
                "compression method not supported in-process, using external unzip"
            );
            drop(archive);
            unzipper.extract_entry(path, &entry_name)
        }
        _ => Err(err.into()),
    }
}

/// `Payload/<name>.app/<filename>`
fn is_bundle_file(entry_name: &str, filename: &str) -> bool {
    entry_name
        .strip_prefix(PAYLOAD_DIR)
        .and_then(|rest| rest.strip_prefix('/'))
        .and_then(|rest| rest.split_once('/'))
        .is_some_and(|(app_dir, rest)| app_dir.ends_with(APP_EXTENSION) && rest == filename)
}

/// Entries whose first two components are `Payload` and `<name>.app`
fn is_app_entry(entry_name: &str) -> bool {
    let mut components = entry_name.split('/');
    match (components.next(), components.next()) {
        (Some(PAYLOAD_DIR), Some(app_dir)) => app_dir.ends_with(APP_EXTENSION),
        _ => false,
    }
}

/// Apply archived permission bits, keeping the file owner-writable so a
/// later extraction into the same target can overwrite it
#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = (mode & 0o7777) | OWNER_WRITE;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

fn find_app_dir(payload_dir: &Path) -> Option<PathBuf> {
    fs::read_dir(payload_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_dir() && path.extension().and_then(|e| e.to_str()) == Some("app")
        })
        .min()
}
