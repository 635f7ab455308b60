//! Test archives built on the fly

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, SystemTime};

use plist::{Dictionary, Value};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub(crate) const APP_DIR: &str = "Payload/Example.app/";
pub(crate) const INFO_PLIST_ENTRY: &str = "Payload/Example.app/Info.plist";
pub(crate) const PROFILE_ENTRY: &str = "Payload/Example.app/embedded.mobileprovision";
pub(crate) const DISTRIBUTION_DER: &[u8] =
    include_bytes!("../../tarmac-signing/testdata/distribution.der");

/// Compression method number no zip reader build supports
pub(crate) const UNSUPPORTED_METHOD: u16 = 97;

pub(crate) struct IpaBuilder {
    entries: Vec<(String, Vec<u8>, Option<u32>)>,
    compression: CompressionMethod,
}

impl IpaBuilder {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            compression: CompressionMethod::Deflated,
        }
    }

    pub(crate) fn stored(mut self) -> Self {
        self.compression = CompressionMethod::Stored;
        self
    }

    pub(crate) fn file(mut self, name: &str, content: &[u8]) -> Self {
        self.entries.push((name.to_string(), content.to_vec(), None));
        self
    }

    /// Add a file with explicit unix permissions
    pub(crate) fn file_with_mode(mut self, name: &str, content: &[u8], mode: u32) -> Self {
        self.entries
            .push((name.to_string(), content.to_vec(), Some(mode)));
        self
    }

    pub(crate) fn info_plist(self, dict: Dictionary) -> Self {
        let xml = plist_xml(dict);
        self.file(INFO_PLIST_ENTRY, &xml)
    }

    /// Write the manifest as a binary plist, the way Xcode ships it
    pub(crate) fn binary_info_plist(self, dict: Dictionary) -> Self {
        let mut bytes = Vec::new();
        Value::Dictionary(dict).to_writer_binary(&mut bytes).unwrap();
        self.file(INFO_PLIST_ENTRY, &bytes)
    }

    pub(crate) fn profile(self, dict: Dictionary) -> Self {
        let content = profile_envelope(dict);
        self.file(PROFILE_ENTRY, &content)
    }

    pub(crate) fn write(&self, path: &Path) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default().compression_method(self.compression);

        if self.entries.iter().any(|(name, _, _)| name.starts_with(APP_DIR)) {
            zip.add_directory("Payload/", options).unwrap();
            zip.add_directory(APP_DIR, options).unwrap();
        }
        for (name, content, mode) in &self.entries {
            let options = match mode {
                Some(mode) => options.unix_permissions(*mode),
                None => options,
            };
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }
}

pub(crate) fn plist_xml(dict: Dictionary) -> Vec<u8> {
    let mut xml = Vec::new();
    Value::Dictionary(dict).to_writer_xml(&mut xml).unwrap();
    xml
}

pub(crate) fn info_plist(entries: &[(&str, &str)]) -> Dictionary {
    let mut dict = Dictionary::new();
    for (key, value) in entries {
        dict.insert((*key).to_string(), Value::String((*value).to_string()));
    }
    dict
}

pub(crate) fn sample_info_plist() -> Dictionary {
    let mut dict = info_plist(&[
        ("CFBundleIdentifier", "com.example.app"),
        ("CFBundleDisplayName", "MyApp"),
        ("CFBundleName", "my_app"),
        ("CFBundleShortVersionString", "1.4.0"),
        ("CFBundleVersion", "42"),
        ("MinimumOSVersion", "15.0"),
    ]);
    dict.insert(
        "CFBundleSupportedPlatforms".to_string(),
        Value::Array(vec![Value::String("iPhoneOS".to_string())]),
    );
    dict
}

/// Profile dictionary with the fixture distribution certificate
pub(crate) fn profile_dict(devices: &[&str], all_devices: bool) -> Dictionary {
    let mut entitlements = Dictionary::new();
    entitlements.insert(
        "application-identifier".to_string(),
        Value::String("ABCDE12345.com.example.app".to_string()),
    );
    entitlements.insert("get-task-allow".to_string(), Value::Boolean(false));

    let mut dict = Dictionary::new();
    dict.insert("Name".to_string(), Value::String("Example Profile".to_string()));
    dict.insert(
        "TeamIdentifier".to_string(),
        Value::Array(vec![Value::String("ABCDE12345".to_string())]),
    );
    dict.insert(
        "ExpirationDate".to_string(),
        Value::Date((SystemTime::now() + Duration::from_secs(86_400)).into()),
    );
    dict.insert(
        "DeveloperCertificates".to_string(),
        Value::Array(vec![Value::Data(DISTRIBUTION_DER.to_vec())]),
    );
    dict.insert("Entitlements".to_string(), Value::Dictionary(entitlements));
    if !devices.is_empty() {
        dict.insert(
            "ProvisionedDevices".to_string(),
            Value::Array(
                devices
                    .iter()
                    .map(|d| Value::String((*d).to_string()))
                    .collect(),
            ),
        );
    }
    dict.insert(
        "ProvisionsAllDevices".to_string(),
        Value::Boolean(all_devices),
    );
    dict
}

/// Wrap the profile plist in bytes shaped like a CMS envelope
pub(crate) fn profile_envelope(dict: Dictionary) -> Vec<u8> {
    let mut content = vec![0x30, 0x82, 0x2b, 0x11, 0x06, 0x09];
    content.extend_from_slice(&plist_xml(dict));
    content.extend_from_slice(&[0xa0, 0x82, 0x0d, 0x3f]);
    content
}

/// Rewrite every entry's compression method, in both the local headers and
/// the central directory
pub(crate) fn set_compression_method(path: &Path, method: u16) {
    let mut bytes = std::fs::read(path).unwrap();
    patch_u16_after(&mut bytes, b"PK\x03\x04", 8, method);
    patch_u16_after(&mut bytes, b"PK\x01\x02", 10, method);
    std::fs::write(path, bytes).unwrap();
}

fn patch_u16_after(bytes: &mut [u8], signature: &[u8], offset: usize, value: u16) {
    let positions: Vec<usize> = bytes
        .windows(signature.len())
        .enumerate()
        .filter(|(_, w)| *w == signature)
        .map(|(i, _)| i)
        .collect();
    for pos in positions {
        bytes[pos + offset..pos + offset + 2].copy_from_slice(&value.to_le_bytes());
    }
}

/// Flip the first byte of an entry's stored data
pub(crate) fn corrupt_entry_data(path: &Path, entry: &str) {
    let mut bytes = std::fs::read(path).unwrap();
    let name_pos = bytes
        .windows(entry.len())
        .position(|w| w == entry.as_bytes())
        .unwrap();
    let header = name_pos - 30;
    let extra_len = u16::from_le_bytes([bytes[header + 28], bytes[header + 29]]) as usize;
    let data_start = name_pos + entry.len() + extra_len;
    bytes[data_start] ^= 0xff;
    std::fs::write(path, bytes).unwrap();
}
