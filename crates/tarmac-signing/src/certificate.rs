//! Developer certificates referenced by provisioning profiles

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use x509_certificate::X509Certificate;

use crate::error::{Result, SigningError};

/// Kind of Apple signing certificate, derived from its common name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateKind {
    /// Apple Development / iPhone Developer
    Development,
    /// Apple Distribution / iPhone Distribution
    Distribution,
    /// Developer ID Application
    DeveloperId,
    /// Anything else
    Generic,
}

impl CertificateKind {
    /// Classify a certificate from its subject common name
    pub fn from_common_name(name: &str) -> Self {
        if name.starts_with("Apple Development") || name.starts_with("iPhone Developer") {
            Self::Development
        } else if name.starts_with("Apple Distribution") || name.starts_with("iPhone Distribution")
        {
            Self::Distribution
        } else if name.starts_with("Developer ID Application") {
            Self::DeveloperId
        } else {
            Self::Generic
        }
    }
}

impl std::fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "Apple Development"),
            Self::Distribution => write!(f, "Apple Distribution"),
            Self::DeveloperId => write!(f, "Developer ID"),
            Self::Generic => write!(f, "Generic"),
        }
    }
}

/// A decoded X.509 signing certificate
#[derive(Debug, Clone, Serialize)]
pub struct Certificate {
    /// Subject common name, e.g. `Apple Distribution: Example Corp (ABCDE12345)`
    pub common_name: String,

    /// Issuer common name
    pub issuer: Option<String>,

    /// Team identifier taken from the common name suffix
    pub team_id: Option<String>,

    /// Certificate kind
    pub kind: CertificateKind,

    /// SHA-256 fingerprint of the DER encoding, upper-case hex
    pub fingerprint: String,

    /// Start of the validity period
    pub valid_from: DateTime<Utc>,

    /// End of the validity period
    pub expires_at: DateTime<Utc>,

    #[serde(skip)]
    der: Vec<u8>,
}

impl Certificate {
    /// Decode a DER-encoded certificate
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let cert = X509Certificate::from_der(der)
            .map_err(|e| SigningError::Certificate(format!("invalid DER certificate: {}", e)))?;

        let common_name = cert.subject_common_name().unwrap_or_default();
        let team_id = team_id_from_common_name(&common_name);

        Ok(Self {
            kind: CertificateKind::from_common_name(&common_name),
            issuer: cert.issuer_common_name(),
            team_id,
            fingerprint: fingerprint(der),
            valid_from: cert.validity_not_before(),
            expires_at: cert.validity_not_after(),
            common_name,
            der: der.to_vec(),
        })
    }

    /// Raw DER bytes
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Check if the certificate is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Days until expiration (negative once expired)
    pub fn days_until_expiration(&self) -> i64 {
        self.expires_at.signed_duration_since(Utc::now()).num_days()
    }

    /// Check if the certificate will expire within the given number of days
    pub fn expires_within_days(&self, days: i64) -> bool {
        self.days_until_expiration() <= days
    }
}

impl std::fmt::Display for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.common_name, self.kind)
    }
}

// "Apple Distribution: Example Corp (ABCDE12345)" -> "ABCDE12345"
fn team_id_from_common_name(name: &str) -> Option<String> {
    let start = name.rfind('(')?;
    let end = name.rfind(')')?;
    (end > start + 1).then(|| name[start + 1..end].to_string())
}

fn fingerprint(der: &[u8]) -> String {
    Sha256::digest(der)
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect()
}
