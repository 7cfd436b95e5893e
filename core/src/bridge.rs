//! Method-call bridge to the application shell
//!
//! The shell sends a method name plus JSON arguments and receives a JSON
//! result. Unknown methods get an explicit `NotImplemented` response, bad
//! arguments an `Error` response; nothing here panics on host input.

use crate::probe::TrustSignalProbe;
use crate::ProbeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const METHOD_CHECK_TRUST_SIGNALS: &str = "checkTrustSignals";
pub const METHOD_DETECT_SIGNATURES: &str = "detectKnownSignatureMatches";

// Names used by earlier shell releases.
const LEGACY_CHECK_MOCK_LOCATION: &str = "checkMockLocation";
const LEGACY_DETECT_MOCK_APPS: &str = "detectMockApps";

const SIGNATURES_ARG: &str = "signatures";

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success { result: Value },
    NotImplemented { method: String },
    Error { code: String, message: String },
}

impl MethodResponse {
    fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Operations the bridge understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeMethod {
    CheckTrustSignals,
    DetectKnownSignatureMatches,
}

impl BridgeMethod {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            METHOD_CHECK_TRUST_SIGNALS | LEGACY_CHECK_MOCK_LOCATION => {
                Some(Self::CheckTrustSignals)
            }
            METHOD_DETECT_SIGNATURES | LEGACY_DETECT_MOCK_APPS => {
                Some(Self::DetectKnownSignatureMatches)
            }
            _ => None,
        }
    }
}

/// Extract the `signatures` argument. Absent or null means no signatures.
pub fn signatures_argument(arguments: &Value) -> Result<Vec<String>, ProbeError> {
    let raw = match arguments {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => match map.get(SIGNATURES_ARG) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(raw) => raw,
        },
        other => {
            return Err(ProbeError::InvalidArgument(format!(
                "arguments must be an object, got {}",
                other
            )))
        }
    };

    serde_json::from_value(raw.clone()).map_err(|_| {
        ProbeError::InvalidArgument(format!("{} must be a list of strings", SIGNATURES_ARG))
    })
}

// ============================================================================
// DISPATCH
// ============================================================================

pub struct MethodBridge {
    probe: Box<dyn TrustSignalProbe>,
}

impl MethodBridge {
    pub fn new(probe: Box<dyn TrustSignalProbe>) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> &dyn TrustSignalProbe {
        self.probe.as_ref()
    }

    pub fn handle(&self, call: &MethodCall) -> MethodResponse {
        let Some(method) = BridgeMethod::parse(&call.method) else {
            tracing::warn!("Bridge method not implemented: {}", call.method);
            return MethodResponse::NotImplemented {
                method: call.method.clone(),
            };
        };
        tracing::debug!("Bridge call {:?}", method);

        let result = match method {
            BridgeMethod::CheckTrustSignals => {
                serde_json::to_value(self.probe.check_trust_signals())
            }
            BridgeMethod::DetectKnownSignatureMatches => {
                let signatures = match signatures_argument(&call.arguments) {
                    Ok(signatures) => signatures,
                    Err(err) => return MethodResponse::error("INVALID_ARGUMENT", err.to_string()),
                };
                serde_json::to_value(self.probe.detect_known_signature_matches(&signatures))
            }
        };

        match result {
            Ok(result) => MethodResponse::Success { result },
            Err(err) => MethodResponse::error("SERIALIZATION", err.to_string()),
        }
    }

    /// Text framing for bridges that only carry strings.
    pub fn handle_json(&self, request: &str) -> String {
        let response = match serde_json::from_str::<MethodCall>(request) {
            Ok(call) => self.handle(&call),
            Err(err) => MethodResponse::error("INVALID_REQUEST", err.to_string()),
        };
        serde_json::to_string(&response).unwrap_or_else(|err| {
            format!(
                r#"{{"status":"error","code":"SERIALIZATION","message":{}}}"#,
                Value::String(err.to_string())
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{Details, DetectionResult, OsVersion, Platform, Verdict};
    use serde_json::json;

    struct FixedProbe;

    impl TrustSignalProbe for FixedProbe {
        fn platform(&self) -> Platform {
            Platform::Android
        }

        fn check_trust_signals(&self) -> Verdict {
            let mut details = Details::new();
            details.insert("mockLocationEnabled", true);
            Verdict {
                is_mock: true,
                details,
                platform: Platform::Android,
                os_version: OsVersion::ApiLevel(Some(34)),
            }
        }

        fn detect_known_signature_matches(&self, candidates: &[String]) -> DetectionResult {
            DetectionResult::from_matches(candidates.to_vec())
        }
    }

    fn bridge() -> MethodBridge {
        MethodBridge::new(Box::new(FixedProbe))
    }

    #[test]
    fn test_check_trust_signals() {
        let response = bridge().handle(&MethodCall::new("checkTrustSignals", Value::Null));
        let MethodResponse::Success { result } = response else {
            panic!("expected success");
        };
        assert_eq!(result["isMock"], true);
        assert_eq!(result["apiLevel"], 34);
    }

    #[test]
    fn test_legacy_names_dispatch() {
        assert_eq!(
            BridgeMethod::parse("checkMockLocation"),
            Some(BridgeMethod::CheckTrustSignals)
        );
        assert_eq!(
            BridgeMethod::parse("detectMockApps"),
            Some(BridgeMethod::DetectKnownSignatureMatches)
        );
    }

    #[test]
    fn test_unknown_method_not_implemented() {
        let response = bridge().handle(&MethodCall::new("startTracking", Value::Null));
        assert_eq!(
            response,
            MethodResponse::NotImplemented {
                method: "startTracking".to_string()
            }
        );
    }

    #[test]
    fn test_detect_passes_signatures() {
        let response = bridge().handle(&MethodCall::new(
            "detectKnownSignatureMatches",
            json!({ "signatures": ["a", "b"] }),
        ));
        let MethodResponse::Success { result } = response else {
            panic!("expected success");
        };
        assert_eq!(result["count"], 2);
        assert_eq!(result["apps"], json!(["a", "b"]));
    }

    #[test]
    fn test_missing_signatures_is_empty_list() {
        assert!(signatures_argument(&json!({})).unwrap().is_empty());
        assert!(signatures_argument(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_signatures_rejected() {
        let response = bridge().handle(&MethodCall::new(
            "detectMockApps",
            json!({ "signatures": "fakegps" }),
        ));
        assert!(matches!(
            response,
            MethodResponse::Error { ref code, .. } if code == "INVALID_ARGUMENT"
        ));
    }

    #[test]
    fn test_handle_json_framing() {
        let bridge = bridge();

        let ok: Value =
            serde_json::from_str(&bridge.handle_json(r#"{"method":"checkTrustSignals"}"#)).unwrap();
        assert_eq!(ok["status"], "success");
        assert_eq!(ok["result"]["platform"], "Android");

        let missing: Value =
            serde_json::from_str(&bridge.handle_json(r#"{"method":"nope"}"#)).unwrap();
        assert_eq!(missing["status"], "notImplemented");

        let garbage: Value = serde_json::from_str(&bridge.handle_json("not json")).unwrap();
        assert_eq!(garbage["status"], "error");
        assert_eq!(garbage["code"], "INVALID_REQUEST");
    }
}
