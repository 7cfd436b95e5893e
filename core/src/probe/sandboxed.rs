//! Probe for sandboxed platforms that cannot enumerate installed apps
//!
//! Elevated access is inferred from three indicators, checked in order and
//! short-circuiting on the first hit:
//! 1. A jailbreak package manager deep link resolves
//! 2. A suspicious filesystem path exists
//! 3. A new file can be created (and removed) in a restricted directory

use super::scratch::ScratchFile;
use super::TrustSignalProbe;
use crate::capability::{DeviceInfo, FsProber, UrlSchemeResolver};
use crate::config::ProbeConfig;
use crate::evidence::{Details, DetectionResult, Platform, Verdict};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

pub const JAILBREAK_INDICATOR_NOTE: &str = "Jailbreak detected - potential for mock location apps";

pub struct SandboxedProbe {
    fs: Arc<dyn FsProber>,
    urls: Arc<dyn UrlSchemeResolver>,
    device: Arc<dyn DeviceInfo>,
    suspicious_paths: Vec<PathBuf>,
    write_probe_path: PathBuf,
    deep_link: String,
}

impl SandboxedProbe {
    pub fn new(
        fs: Arc<dyn FsProber>,
        urls: Arc<dyn UrlSchemeResolver>,
        device: Arc<dyn DeviceInfo>,
        config: &ProbeConfig,
    ) -> Self {
        Self {
            fs,
            urls,
            device,
            suspicious_paths: config.suspicious_paths.clone(),
            write_probe_path: config.write_probe_path.clone(),
            deep_link: config.deep_link.clone(),
        }
    }

    /// Whether any elevated-access indicator fires.
    pub fn elevated_access(&self) -> bool {
        if !self.deep_link.is_empty() && self.urls.can_open(&self.deep_link) {
            tracing::debug!("Elevated access: {} resolves", self.deep_link);
            return true;
        }

        if let Some(path) = self.suspicious_paths.iter().find(|p| self.fs.exists(p)) {
            tracing::debug!("Elevated access: {} exists", path.display());
            return true;
        }

        self.restricted_write_succeeds()
    }

    /// A sandboxed process must not be able to write here. A file already
    /// present at the probe path is left untouched and counts as a hit.
    fn restricted_write_succeeds(&self) -> bool {
        let scratch = match ScratchFile::create(self.fs.as_ref(), &self.write_probe_path) {
            Ok(scratch) => scratch,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(
                    "Elevated access: {} already present",
                    self.write_probe_path.display()
                );
                return true;
            }
            Err(_) => return false,
        };
        tracing::debug!(
            "Elevated access: wrote {}",
            self.write_probe_path.display()
        );
        if let Err(err) = scratch.remove() {
            tracing::warn!(
                "Write probe {} created but not removed: {}",
                self.write_probe_path.display(),
                err
            );
        }
        true
    }

    /// App enumeration is not possible inside the sandbox, so there is
    /// nothing to correlate with the elevated-access indicator yet.
    fn suspicious_apps(&self) -> bool {
        false
    }
}

impl TrustSignalProbe for SandboxedProbe {
    fn platform(&self) -> Platform {
        Platform::Ios
    }

    fn check_trust_signals(&self) -> Verdict {
        let mut details = Details::new();

        let jailbroken = self.elevated_access();
        details.insert("isJailbroken", jailbroken);

        let suspicious_apps = self.suspicious_apps();
        details.insert("suspiciousAppsDetected", suspicious_apps);

        details.insert("isSimulator", self.device.is_simulator());

        // Requires both signals; with the app heuristic stubbed this is
        // never true.
        let is_mock = jailbroken && suspicious_apps;
        tracing::info!(
            "Trust signals ({}): is_mock={}, jailbroken={}",
            self.platform(),
            is_mock,
            jailbroken
        );

        Verdict {
            is_mock,
            details,
            platform: self.platform(),
            os_version: self.device.os_version(),
        }
    }

    fn detect_known_signature_matches(&self, _candidates: &[String]) -> DetectionResult {
        if self.elevated_access() {
            DetectionResult::from_matches(vec![JAILBREAK_INDICATOR_NOTE.to_string()])
        } else {
            DetectionResult::default()
        }
    }
}
