//! Provisioning profile decoding
//!
//! A `.mobileprovision` file is a CMS signed envelope around an XML property
//! list. The envelope is not verified here; the plist is located by its
//! markers and decoded directly.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use plist::{Dictionary, Value};
use serde::Serialize;
use tracing::debug;

use crate::certificate::Certificate;
use crate::error::{Result, SigningError};

const XML_START: &[u8] = b"<?xml";
const PLIST_START: &[u8] = b"<plist";
const PLIST_END: &[u8] = b"</plist>";

/// A decoded provisioning profile
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisioningProfile {
    /// Profile name
    pub name: String,
    /// Profile UUID
    pub uuid: String,
    /// App ID name
    pub app_id_name: String,
    /// Team identifier
    pub team_identifier: String,
    /// Team name
    pub team_name: String,
    /// Platforms the profile applies to (`iOS`, `tvOS`, ...)
    pub platforms: Vec<String>,
    /// When the profile was created
    pub creation_date: Option<DateTime<Utc>>,
    /// When the profile expires
    pub expiration_date: Option<DateTime<Utc>>,
    /// UDIDs of provisioned devices
    pub provisioned_devices: Vec<String>,
    /// Enterprise profiles provision every device
    pub provisions_all_devices: bool,
    /// Entitlements dictionary
    pub entitlements: Dictionary,
    #[serde(skip)]
    developer_certificates: Vec<Vec<u8>>,
}

impl ProvisioningProfile {
    /// Decode a profile from the raw `.mobileprovision` bytes
    pub fn from_content(content: &[u8]) -> Result<Self> {
        let plist_data = embedded_plist(content)?;
        let value = Value::from_reader_xml(plist_data)?;
        let dict = value.into_dictionary().ok_or_else(|| {
            SigningError::ProvisioningProfile("profile plist is not a dictionary".to_string())
        })?;

        let profile = Self::from_dictionary(dict);
        debug!(
            name = %profile.name,
            uuid = %profile.uuid,
            devices = profile.provisioned_devices.len(),
            certificates = profile.developer_certificates.len(),
            "decoded provisioning profile"
        );
        Ok(profile)
    }

    /// Read and decode a profile from a file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read(path).map_err(|source| SigningError::ProfileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_content(&content)
    }

    fn from_dictionary(mut dict: Dictionary) -> Self {
        let entitlements = dict
            .remove("Entitlements")
            .and_then(Value::into_dictionary)
            .unwrap_or_default();

        let developer_certificates = dict
            .get("DeveloperCertificates")
            .and_then(Value::as_array)
            .map(|certs| {
                certs
                    .iter()
                    .filter_map(Value::as_data)
                    .map(<[u8]>::to_vec)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: string(&dict, "Name"),
            uuid: string(&dict, "UUID"),
            app_id_name: string(&dict, "AppIDName"),
            team_identifier: string_list(&dict, "TeamIdentifier")
                .into_iter()
                .next()
                .unwrap_or_default(),
            team_name: string(&dict, "TeamName"),
            platforms: string_list(&dict, "Platform"),
            creation_date: date(&dict, "CreationDate"),
            expiration_date: date(&dict, "ExpirationDate"),
            provisioned_devices: string_list(&dict, "ProvisionedDevices"),
            provisions_all_devices: dict
                .get("ProvisionsAllDevices")
                .and_then(Value::as_boolean)
                .unwrap_or(false),
            entitlements,
            developer_certificates,
        }
    }

    /// Whether the profile allows debugger attachment (development builds)
    pub fn get_task_allow(&self) -> bool {
        self.entitlements
            .get("get-task-allow")
            .and_then(Value::as_boolean)
            .unwrap_or(false)
    }

    /// Bundle identifier from `application-identifier`, without the team prefix
    pub fn bundle_id(&self) -> String {
        let Some(app_id) = self
            .entitlements
            .get("application-identifier")
            .and_then(Value::as_string)
        else {
            return String::new();
        };

        app_id
            .split_once('.')
            .map(|(_, bundle_id)| bundle_id)
            .unwrap_or(app_id)
            .to_string()
    }

    /// Number of embedded developer certificates
    pub fn certificate_count(&self) -> usize {
        self.developer_certificates.len()
    }

    /// Decode the embedded developer certificates, in profile order
    pub fn certificates(&self) -> Result<Vec<Certificate>> {
        self.developer_certificates
            .iter()
            .map(|der| Certificate::from_der(der))
            .collect()
    }

    /// Check if the profile is expired
    pub fn is_expired(&self) -> bool {
        self.expiration_date
            .map(|expires| expires < Utc::now())
            .unwrap_or(false)
    }
}

/// Slice out the XML plist from the CMS envelope
fn embedded_plist(content: &[u8]) -> Result<&[u8]> {
    let start = find(content, XML_START)
        .or_else(|| find(content, PLIST_START))
        .ok_or_else(|| {
            SigningError::ProvisioningProfile("no property list found in profile".to_string())
        })?;

    let end = content
        .windows(PLIST_END.len())
        .rposition(|w| w == PLIST_END)
        .filter(|&pos| pos > start)
        .ok_or_else(|| {
            SigningError::ProvisioningProfile("unterminated property list in profile".to_string())
        })?
        + PLIST_END.len();

    Ok(&content[start..end])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn string(dict: &Dictionary, key: &str) -> String {
    dict.get(key)
        .and_then(Value::as_string)
        .unwrap_or_default()
        .to_string()
}

fn string_list(dict: &Dictionary, key: &str) -> Vec<String> {
    dict.get(key)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_string)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn date(dict: &Dictionary, key: &str) -> Option<DateTime<Utc>> {
    dict.get(key)
        .and_then(Value::as_date)
        .map(|d| DateTime::<Utc>::from(SystemTime::from(d)))
}
