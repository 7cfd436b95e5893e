//! Probe configuration
//!
//! Tunables shared by both probe variants:
//! - Extra spoofing signatures and whether the built-in set applies
//! - Suspicious filesystem paths and the restricted write-probe location
//! - Deep-link scheme used as an elevated-access indicator
//! - API level below which the legacy mock-permission evidence is reported

use crate::signatures::SignatureSet;
use crate::ProbeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Paths whose presence indicates a jailbroken sandbox.
pub const DEFAULT_SUSPICIOUS_PATHS: &[&str] = &[
    "/Applications/Cydia.app",
    "/Library/MobileSubstrate/MobileSubstrate.dylib",
    "/bin/bash",
    "/usr/sbin/sshd",
    "/etc/apt",
    "/private/var/lib/apt/",
];

pub const DEFAULT_WRITE_PROBE_PATH: &str = "/private/jailbreak_test.txt";
pub const DEFAULT_DEEP_LINK: &str = "cydia://";

/// Android 6.0 (Marshmallow) replaced the global mock-location toggle with a
/// per-app selection.
pub const DEFAULT_LEGACY_PERMISSION_API_CUTOFF: u32 = 23;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Include the built-in signature set
    pub use_builtin_signatures: bool,
    /// Additional package-name fragments treated as spoofing tools
    pub extra_signatures: Vec<String>,
    /// Paths probed for existence on sandboxed platforms
    pub suspicious_paths: Vec<PathBuf>,
    /// File created and removed to test restricted-directory write access
    pub write_probe_path: PathBuf,
    /// URL whose resolvability indicates a jailbreak package manager
    pub deep_link: String,
    /// `appsWithMockPermission` is reported below this API level
    pub legacy_permission_api_cutoff: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            use_builtin_signatures: true,
            extra_signatures: Vec::new(),
            suspicious_paths: DEFAULT_SUSPICIOUS_PATHS.iter().map(PathBuf::from).collect(),
            write_probe_path: PathBuf::from(DEFAULT_WRITE_PROBE_PATH),
            deep_link: DEFAULT_DEEP_LINK.to_string(),
            legacy_permission_api_cutoff: DEFAULT_LEGACY_PERMISSION_API_CUTOFF,
        }
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<(), ProbeError> {
        if !self.use_builtin_signatures
            && self.extra_signatures.iter().all(|s| s.trim().is_empty())
        {
            return Err(ProbeError::InvalidConfig(
                "no signatures: enable the built-in set or add extra signatures".to_string(),
            ));
        }

        if self.write_probe_path.as_os_str().is_empty() {
            return Err(ProbeError::InvalidConfig(
                "write_probe_path cannot be empty".to_string(),
            ));
        }

        if self.write_probe_path.file_name().is_none() {
            return Err(ProbeError::InvalidConfig(format!(
                "write_probe_path must name a file: {}",
                self.write_probe_path.display()
            )));
        }

        if !self.deep_link.is_empty() && !self.deep_link.contains("://") {
            return Err(ProbeError::InvalidConfig(format!(
                "deep_link must be a URL with a scheme: {}",
                self.deep_link
            )));
        }

        Ok(())
    }

    /// Signature set the settings-capable probe matches against.
    pub fn signature_set(&self) -> SignatureSet {
        let base = if self.use_builtin_signatures {
            SignatureSet::builtin()
        } else {
            SignatureSet::default()
        };
        base.with_extra(&self.extra_signatures)
    }
}
