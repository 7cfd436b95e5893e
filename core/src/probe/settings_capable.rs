//! Probe for platforms exposing developer settings and package enumeration

use super::{record, TrustSignalProbe};
use crate::capability::{AppLister, CheckOutcome, DeviceInfo, SettingsReader};
use crate::config::ProbeConfig;
use crate::evidence::{Details, DetectionResult, EvidenceValue, Platform, Verdict};
use crate::signatures::{match_identifiers, SignatureSet};
use std::sync::Arc;

/// Reported in `appsWithMockPermission` on releases with the global toggle.
pub const LEGACY_MOCK_PERMISSION_NOTE: &str = "Mock locations enabled in Developer Settings";

pub struct SettingsCapableProbe {
    settings: Arc<dyn SettingsReader>,
    apps: Arc<dyn AppLister>,
    device: Arc<dyn DeviceInfo>,
    signatures: SignatureSet,
    legacy_permission_api_cutoff: u32,
}

impl SettingsCapableProbe {
    pub fn new(
        settings: Arc<dyn SettingsReader>,
        apps: Arc<dyn AppLister>,
        device: Arc<dyn DeviceInfo>,
        config: &ProbeConfig,
    ) -> Self {
        Self {
            settings,
            apps,
            device,
            signatures: config.signature_set(),
            legacy_permission_api_cutoff: config.legacy_permission_api_cutoff,
        }
    }

    /// Installed packages containing a known signature.
    fn installed_mock_apps(&self) -> CheckOutcome<Vec<String>> {
        let installed = self.apps.installed_packages()?;
        let found = installed
            .into_iter()
            .filter(|package| match self.signatures.find_in(package) {
                Some(signature) => {
                    tracing::debug!("Package {} matches signature {}", package, signature);
                    true
                }
                None => false,
            })
            .collect();
        Ok(found)
    }

    /// Before per-app mock selection existed, the global toggle meant any
    /// app could inject locations.
    fn apps_with_mock_permission(&self, mock_enabled: bool) -> Vec<String> {
        match self.device.os_version().api_level() {
            Some(level) if level < self.legacy_permission_api_cutoff && mock_enabled => {
                vec![LEGACY_MOCK_PERMISSION_NOTE.to_string()]
            }
            _ => Vec::new(),
        }
    }
}

impl TrustSignalProbe for SettingsCapableProbe {
    fn platform(&self) -> Platform {
        Platform::Android
    }

    fn check_trust_signals(&self) -> Verdict {
        let mut details = Details::new();

        let mock_enabled = record(
            &mut details,
            "mockLocationEnabled",
            self.settings.mock_location_enabled(),
        )
        .unwrap_or(false);

        let mock_app_count = match self.installed_mock_apps() {
            Ok(apps) => {
                details.insert("mockAppsInstalled", !apps.is_empty());
                details.insert("mockAppCount", apps.len());
                apps.len()
            }
            Err(err) => {
                tracing::warn!("Installed package scan degraded: {}", err);
                details.insert("mockAppsInstalled", EvidenceValue::error(err.to_string()));
                details.insert_error("mockAppCount", err.to_string());
                0
            }
        };

        details.insert(
            "appsWithMockPermission",
            self.apps_with_mock_permission(mock_enabled),
        );

        let is_mock = mock_enabled || mock_app_count > 0;
        tracing::info!(
            "Trust signals ({}): is_mock={}, mock_enabled={}, mock_apps={}",
            self.platform(),
            is_mock,
            mock_enabled,
            mock_app_count
        );

        Verdict {
            is_mock,
            details,
            platform: self.platform(),
            os_version: self.device.os_version(),
        }
    }

    fn detect_known_signature_matches(&self, candidates: &[String]) -> DetectionResult {
        let installed = match self.apps.installed_packages() {
            Ok(installed) => installed,
            Err(err) => {
                tracing::warn!("Signature detection could not list packages: {}", err);
                return DetectionResult::failed(err.to_string());
            }
        };

        let matches = match_identifiers(&installed, candidates);
        tracing::debug!(
            "Signature detection: {} of {} packages matched {} candidates",
            matches.len(),
            installed.len(),
            candidates.len()
        );
        DetectionResult::from_matches(matches)
    }
}
