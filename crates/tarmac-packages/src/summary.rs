//! Flat package summaries for CLI display

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything worth showing about a package, as plain values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
    pub app_name: String,
    pub bundle_identifier: String,
    pub certificate_expires: Option<String>,
    pub distribution_type: String,
    pub min_os_version: String,
    pub provisioned_devices: Vec<String>,
    pub provisions_all_devices: bool,
    pub supported_platforms: Vec<String>,
    pub version: String,
    pub version_code: String,
}

impl PackageSummary {
    /// Millisecond precision with a fixed UTC offset, e.g.
    /// `2036-10-14T17:21:51.000+0000`
    pub fn format_expiry(expires_at: &DateTime<Utc>) -> String {
        expires_at.format("%Y-%m-%dT%H:%M:%S%.3f+0000").to_string()
    }

    /// Labelled values in display order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("App name", self.app_name.clone()),
            ("Bundle identifier", self.bundle_identifier.clone()),
            (
                "Certificate expires",
                self.certificate_expires
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            ("Distribution type", self.distribution_type.clone()),
            ("Min os version", self.min_os_version.clone()),
            ("Provisioned devices", list(&self.provisioned_devices)),
            (
                "Provisions all devices",
                if self.provisions_all_devices { "Yes" } else { "No" }.to_string(),
            ),
            ("Supported platforms", list(&self.supported_platforms)),
            ("Version", self.version.clone()),
            ("Version code", self.version_code.clone()),
        ]
    }
}

impl std::fmt::Display for PackageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = self.fields();
        let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        for (label, value) in fields {
            writeln!(f, "{:width$}  {}", format!("{}:", label), value, width = width + 1)?;
        }
        Ok(())
    }
}

fn list(values: &[String]) -> String {
    if values.is_empty() {
        "N/A".to_string()
    } else {
        values.join(", ")
    }
}
