//! Host-side capability implementations
//!
//! - [`HostFilesystem`]: `std::fs` backed filesystem probes
//! - [`DeviceSnapshot`]: facts gathered by host code (settings flag, package
//!   list, resolvable URLs, OS release) replayed through the capability traits
//! - [`compose_probe`]: picks the probe variant for a snapshot's platform

use crate::capability::{
    AppLister, CapabilityError, CheckOutcome, DeviceInfo, FsProber, SettingsReader,
    UrlSchemeResolver,
};
use crate::config::ProbeConfig;
use crate::evidence::{OsVersion, Platform};
use crate::probe::{SandboxedProbe, SettingsCapableProbe, TrustSignalProbe};
use crate::ProbeError;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// FILESYSTEM
// ============================================================================

/// Probes the real filesystem of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFilesystem;

impl FsProber for HostFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(contents)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

// ============================================================================
// DEVICE SNAPSHOT
// ============================================================================

/// Raw device facts collected by host code. Missing facts surface as
/// `CapabilityError::Unavailable` when a probe asks for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceSnapshot {
    pub platform: Platform,
    pub api_level: Option<u32>,
    pub os_version: Option<String>,
    pub mock_location_enabled: Option<bool>,
    pub installed_packages: Option<Vec<String>>,
    /// Why the package listing could not be collected
    pub listing_error: Option<String>,
    /// URLs (or bare `scheme://` prefixes) the host can open
    pub resolvable_urls: Vec<String>,
    pub is_simulator: bool,
}

impl Default for DeviceSnapshot {
    fn default() -> Self {
        Self {
            platform: Platform::Android,
            api_level: None,
            os_version: None,
            mock_location_enabled: None,
            installed_packages: None,
            listing_error: None,
            resolvable_urls: Vec::new(),
            is_simulator: false,
        }
    }
}

impl DeviceSnapshot {
    /// Snapshot of the local machine. Only filesystem heuristics apply, so it
    /// is evaluated by the sandboxed variant.
    pub fn local() -> Self {
        Self {
            platform: Platform::Ios,
            os_version: Some(format!(
                "{}-{}",
                std::env::consts::OS,
                std::env::consts::ARCH
            )),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ProbeError> {
        serde_json::from_str(json).map_err(|e| ProbeError::Serialization(e.to_string()))
    }
}

impl SettingsReader for DeviceSnapshot {
    fn mock_location_enabled(&self) -> CheckOutcome<bool> {
        self.mock_location_enabled.ok_or_else(|| {
            CapabilityError::Unavailable("mock location setting not reported".to_string())
        })
    }
}

impl AppLister for DeviceSnapshot {
    fn installed_packages(&self) -> CheckOutcome<Vec<String>> {
        if let Some(ref reason) = self.listing_error {
            return Err(CapabilityError::Unavailable(reason.clone()));
        }
        self.installed_packages.clone().ok_or_else(|| {
            CapabilityError::Unavailable("installed package listing not reported".to_string())
        })
    }
}

impl UrlSchemeResolver for DeviceSnapshot {
    fn can_open(&self, url: &str) -> bool {
        let scheme = url_scheme(url);
        self.resolvable_urls.iter().any(|candidate| {
            candidate.eq_ignore_ascii_case(url)
                || (!scheme.is_empty() && url_scheme(candidate).eq_ignore_ascii_case(scheme))
        })
    }
}

impl DeviceInfo for DeviceSnapshot {
    fn os_version(&self) -> OsVersion {
        match (self.api_level, &self.os_version) {
            (Some(level), _) => OsVersion::ApiLevel(Some(level)),
            (None, Some(version)) => OsVersion::Version(version.clone()),
            (None, None) => match self.platform {
                Platform::Android => OsVersion::ApiLevel(None),
                Platform::Ios => OsVersion::Version("unknown".to_string()),
            },
        }
    }

    fn is_simulator(&self) -> bool {
        self.is_simulator
    }
}

fn url_scheme(url: &str) -> &str {
    url.split_once("://").map(|(scheme, _)| scheme).unwrap_or("")
}

/// Parse `pm list packages` output. Accepts bare identifiers, `package:<id>`
/// and the `-f` form `package:<apk path>=<id>`.
pub fn parse_package_listing(text: &str) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        let entry = line.strip_prefix("package:").unwrap_or(line);
        let id = entry.rsplit_once('=').map(|(_, id)| id).unwrap_or(entry).trim();
        if !id.is_empty() && !packages.iter().any(|p| p == id) {
            packages.push(id.to_string());
        }
    }
    packages
}

// ============================================================================
// COMPOSITION
// ============================================================================

/// Build the probe variant matching `snapshot.platform`.
pub fn compose_probe(
    snapshot: DeviceSnapshot,
    fs: Arc<dyn FsProber>,
    config: &ProbeConfig,
) -> Result<Box<dyn TrustSignalProbe>, ProbeError> {
    config.validate()?;
    let platform = snapshot.platform;
    let snapshot = Arc::new(snapshot);

    let probe: Box<dyn TrustSignalProbe> = match platform {
        Platform::Android => Box::new(SettingsCapableProbe::new(
            snapshot.clone(),
            snapshot.clone(),
            snapshot,
            config,
        )),
        Platform::Ios => Box::new(SandboxedProbe::new(
            fs,
            snapshot.clone(),
            snapshot,
            config,
        )),
    };
    tracing::debug!("Composed {} trust signal probe", platform);
    Ok(probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_listing_forms() {
        let listing = "package:com.android.chrome\n\
                       package:/data/app/~~x/base.apk=com.lexa.fakegps\n\
                       \n\
                       com.example.app\n\
                       package:com.android.chrome\n";
        assert_eq!(
            parse_package_listing(listing),
            vec!["com.android.chrome", "com.lexa.fakegps", "com.example.app"]
        );
    }

    #[test]
    fn test_snapshot_missing_facts_are_unavailable() {
        let snapshot = DeviceSnapshot::default();
        assert!(matches!(
            snapshot.mock_location_enabled(),
            Err(CapabilityError::Unavailable(_))
        ));
        assert!(matches!(
            snapshot.installed_packages(),
            Err(CapabilityError::Unavailable(_))
        ));
    }

    #[test]
    fn test_listing_error_wins_over_packages() {
        let snapshot = DeviceSnapshot {
            installed_packages: Some(vec!["com.a".to_string()]),
            listing_error: Some("package visibility restricted".to_string()),
            ..DeviceSnapshot::default()
        };
        assert_eq!(
            snapshot.installed_packages(),
            Err(CapabilityError::Unavailable(
                "package visibility restricted".to_string()
            ))
        );
    }

    #[test]
    fn test_can_open_matches_scheme() {
        let snapshot = DeviceSnapshot {
            resolvable_urls: vec!["Cydia://".to_string()],
            ..DeviceSnapshot::default()
        };
        assert!(snapshot.can_open("cydia://"));
        assert!(snapshot.can_open("cydia://package/com.example"));
        assert!(!snapshot.can_open("sileo://"));
    }

    #[test]
    fn test_os_version_selection() {
        let android = DeviceSnapshot {
            api_level: Some(34),
            ..DeviceSnapshot::default()
        };
        assert_eq!(android.os_version(), OsVersion::ApiLevel(Some(34)));

        let unreported = DeviceSnapshot::default();
        assert_eq!(unreported.os_version(), OsVersion::ApiLevel(None));

        let ios = DeviceSnapshot {
            platform: Platform::Ios,
            ..DeviceSnapshot::default()
        };
        assert_eq!(ios.os_version(), OsVersion::Version("unknown".to_string()));
    }

    #[test]
    fn test_snapshot_json_camel_case() {
        let snapshot = DeviceSnapshot::from_json(
            r#"{ "platform": "iOS", "osVersion": "17.4", "resolvableUrls": ["cydia://"] }"#,
        )
        .unwrap();
        assert_eq!(snapshot.platform, Platform::Ios);
        assert_eq!(snapshot.os_version.as_deref(), Some("17.4"));
        assert!(snapshot.can_open("cydia://"));
    }

    #[test]
    fn test_compose_probe_selects_variant() {
        let fs: Arc<dyn FsProber> = Arc::new(HostFilesystem);
        let config = ProbeConfig::default();

        let android = compose_probe(DeviceSnapshot::default(), fs.clone(), &config).unwrap();
        assert_eq!(android.platform(), Platform::Android);

        let ios = compose_probe(DeviceSnapshot::local(), fs, &config).unwrap();
        assert_eq!(ios.platform(), Platform::Ios);
    }

    #[test]
    fn test_compose_probe_rejects_invalid_config() {
        let config = ProbeConfig {
            deep_link: "not-a-url".to_string(),
            ..ProbeConfig::default()
        };
        let composed = compose_probe(DeviceSnapshot::default(), Arc::new(HostFilesystem), &config);
        assert!(composed.is_err());
    }
}
