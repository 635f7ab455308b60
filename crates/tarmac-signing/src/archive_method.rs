//! Distribution method implied by provisioning profiles

use serde::Serialize;

use crate::profile::ProvisioningProfile;

/// How an archive was exported for distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveMethod {
    /// Registered devices only
    AdHoc,
    /// App Store / TestFlight
    AppStore,
    /// Development builds (debugger attachable)
    Development,
    /// In-house enterprise distribution
    Enterprise,
}

impl ArchiveMethod {
    /// Resolution order when several profiles disagree
    const PRIORITY: [Self; 4] = [
        Self::Development,
        Self::AdHoc,
        Self::Enterprise,
        Self::AppStore,
    ];

    /// Export options value (`ad-hoc`, `app-store`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdHoc => "ad-hoc",
            Self::AppStore => "app-store",
            Self::Development => "development",
            Self::Enterprise => "enterprise",
        }
    }

    /// Human readable name (`Ad Hoc`, `App Store`, ...)
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AdHoc => "Ad Hoc",
            Self::AppStore => "App Store",
            Self::Development => "Development",
            Self::Enterprise => "Enterprise",
        }
    }

    /// Classify a single profile
    pub fn from_profile(profile: &ProvisioningProfile) -> Self {
        if profile.get_task_allow() {
            Self::Development
        } else if profile.provisions_all_devices {
            Self::Enterprise
        } else if !profile.provisioned_devices.is_empty() {
            Self::AdHoc
        } else {
            Self::AppStore
        }
    }

    /// Classify a set of profiles. Without any profile the build is treated
    /// as a development build.
    pub fn from_profiles<'a, I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = &'a ProvisioningProfile>,
    {
        let methods: Vec<Self> = profiles.into_iter().map(Self::from_profile).collect();

        Self::PRIORITY
            .into_iter()
            .find(|method| methods.contains(method))
            .unwrap_or(Self::Development)
    }
}

impl std::fmt::Display for ArchiveMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
