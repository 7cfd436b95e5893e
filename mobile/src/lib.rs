// trustprobe-mobile — Native mobile bindings for iOS and Android
// This crate exports the trust signal bridge via UniFFI

uniffi::setup_scaffolding!();

pub use trustprobe_core::*;

use serde_json::Value;
use std::sync::Arc;

// ============================================================================
// FFI TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum HostPlatform {
    Android,
    Ios,
}

impl From<HostPlatform> for Platform {
    fn from(platform: HostPlatform) -> Self {
        match platform {
            HostPlatform::Android => Platform::Android,
            HostPlatform::Ios => Platform::Ios,
        }
    }
}

/// Device facts gathered by the native shell before each call. Leave a
/// field `None` when the platform cannot report it.
#[derive(Debug, Clone, uniffi::Record)]
pub struct HostReport {
    pub platform: HostPlatform,
    pub api_level: Option<u32>,
    pub os_version: Option<String>,
    pub mock_location_enabled: Option<bool>,
    pub installed_packages: Option<Vec<String>>,
    pub listing_error: Option<String>,
    pub resolvable_urls: Vec<String>,
    pub is_simulator: bool,
}

impl From<HostReport> for DeviceSnapshot {
    fn from(report: HostReport) -> Self {
        DeviceSnapshot {
            platform: report.platform.into(),
            api_level: report.api_level,
            os_version: report.os_version,
            mock_location_enabled: report.mock_location_enabled,
            installed_packages: report.installed_packages,
            listing_error: report.listing_error,
            resolvable_urls: report.resolvable_urls,
            is_simulator: report.is_simulator,
        }
    }
}

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum TrustProbeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<ProbeError> for TrustProbeError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::InvalidConfig(msg) => TrustProbeError::InvalidConfig(msg),
            ProbeError::InvalidArgument(msg) | ProbeError::Serialization(msg) => {
                TrustProbeError::Serialization(msg)
            }
        }
    }
}

// ============================================================================
// BRIDGE OBJECT
// ============================================================================

/// Entry point held by the native shell. Probes run against the process's
/// own filesystem plus whatever the shell reports in [`HostReport`].
#[derive(uniffi::Object)]
pub struct TrustProbeBridge {
    config: ProbeConfig,
}

#[uniffi::export]
impl TrustProbeBridge {
    /// `config_json` overrides [`ProbeConfig`] fields; `None` uses defaults.
    #[uniffi::constructor]
    pub fn new(config_json: Option<String>) -> Result<Arc<Self>, TrustProbeError> {
        let config = match config_json.as_deref().map(str::trim) {
            None | Some("") => ProbeConfig::default(),
            Some(json) => serde_json::from_str(json)
                .map_err(|e| TrustProbeError::InvalidConfig(e.to_string()))?,
        };
        config.validate()?;
        Ok(Arc::new(Self { config }))
    }

    /// Dispatch one method call; always returns a JSON `MethodResponse`.
    pub fn handle(&self, method: String, arguments_json: String, report: HostReport) -> String {
        let arguments = match arguments_json.trim() {
            "" => Value::Null,
            raw => match serde_json::from_str(raw) {
                Ok(arguments) => arguments,
                Err(e) => {
                    return error_response("INVALID_ARGUMENT", &e.to_string());
                }
            },
        };

        let bridge = match self.bridge(report) {
            Ok(bridge) => bridge,
            Err(e) => return error_response("INVALID_CONFIG", &e.to_string()),
        };
        let response = bridge.handle(&MethodCall::new(method, arguments));
        serde_json::to_string(&response)
            .unwrap_or_else(|e| error_response("SERIALIZATION", &e.to_string()))
    }

    /// Verdict JSON for `report`.
    pub fn check_trust_signals(&self, report: HostReport) -> Result<String, TrustProbeError> {
        let verdict = self.bridge(report)?.probe().check_trust_signals();
        serde_json::to_string(&verdict).map_err(|e| TrustProbeError::Serialization(e.to_string()))
    }
}

impl TrustProbeBridge {
    fn bridge(&self, report: HostReport) -> Result<MethodBridge, ProbeError> {
        let probe = compose_probe(report.into(), Arc::new(HostFilesystem), &self.config)?;
        Ok(MethodBridge::new(probe))
    }
}

fn error_response(code: &str, message: &str) -> String {
    serde_json::json!({ "status": "error", "code": code, "message": message }).to_string()
}

/// Built-in spoofing app signatures, for shells that pass them back through
/// `detectKnownSignatureMatches`.
#[uniffi::export]
pub fn known_signatures() -> Vec<String> {
    KNOWN_SIGNATURES.iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn android_report() -> HostReport {
        HostReport {
            platform: HostPlatform::Android,
            api_level: Some(34),
            os_version: None,
            mock_location_enabled: Some(false),
            installed_packages: Some(vec!["com.lexa.fakegps".to_string()]),
            listing_error: None,
            resolvable_urls: vec![],
            is_simulator: false,
        }
    }

    #[test]
    fn test_mobile_check_trust_signals() {
        let bridge = TrustProbeBridge::new(None).expect("default config");
        let json = bridge.check_trust_signals(android_report()).unwrap();
        let verdict: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(verdict["isMock"], true);
        assert_eq!(verdict["platform"], "Android");
    }

    #[test]
    fn test_mobile_handle_detect() {
        let bridge = TrustProbeBridge::new(Some(String::new())).unwrap();
        let json = bridge.handle(
            "detectMockApps".to_string(),
            r#"{"signatures":["LEXA"]}"#.to_string(),
            android_report(),
        );
        let response: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(response["status"], "success");
        assert_eq!(response["result"]["apps"][0], "com.lexa.fakegps");
    }

    #[test]
    fn test_mobile_handle_unknown_method() {
        let bridge = TrustProbeBridge::new(None).unwrap();
        let json = bridge.handle("vibrate".to_string(), String::new(), android_report());
        let response: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(response["status"], "notImplemented");
    }

    #[test]
    fn test_mobile_bad_arguments() {
        let bridge = TrustProbeBridge::new(None).unwrap();
        let json = bridge.handle(
            "detectMockApps".to_string(),
            "{not json".to_string(),
            android_report(),
        );
        let response: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(response["code"], "INVALID_ARGUMENT");
    }

    #[test]
    fn test_mobile_rejects_bad_config() {
        let result = TrustProbeBridge::new(Some(r#"{"deep_link":"cydia"}"#.to_string()));
        assert!(matches!(result, Err(TrustProbeError::InvalidConfig(_))));
    }

    #[test]
    fn test_mobile_sandboxed_write_probe_in_tempdir() {
        let dir = tempfile::tempdir().unwrap();
        let probe_path = dir.path().join("probe.txt");
        let config = serde_json::json!({
            "suspicious_paths": [],
            "write_probe_path": probe_path,
        });
        let bridge = TrustProbeBridge::new(Some(config.to_string())).unwrap();

        let report = HostReport {
            platform: HostPlatform::Ios,
            api_level: None,
            os_version: Some("17.4".to_string()),
            mock_location_enabled: None,
            installed_packages: None,
            listing_error: None,
            resolvable_urls: vec![],
            is_simulator: true,
        };
        let verdict: Value =
            serde_json::from_str(&bridge.check_trust_signals(report).unwrap()).unwrap();
        assert_eq!(verdict["details"]["isJailbroken"], true);
        assert_eq!(verdict["details"]["isSimulator"], true);
        assert_eq!(verdict["isMock"], false);
        assert!(!probe_path.exists());
    }

    #[test]
    fn test_known_signatures_exported() {
        assert!(known_signatures().contains(&"com.fakegps.go".to_string()));
    }
}
