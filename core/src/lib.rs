// Trust Probe Core — device trust signals for mobile shells
//
// Runs a fixed battery of heuristic checks (mock location settings, known
// spoofing apps, jailbreak indicators) against whatever the host platform can
// report, and always answers with a verdict plus raw evidence.

pub mod bridge;
pub mod capability;
pub mod config;
pub mod evidence;
pub mod host;
pub mod probe;
pub mod signatures;

use thiserror::Error;

pub use bridge::{BridgeMethod, MethodBridge, MethodCall, MethodResponse};
pub use capability::{
    AppLister, CapabilityError, CheckOutcome, DeviceInfo, FsProber, SettingsReader,
    UrlSchemeResolver,
};
pub use config::ProbeConfig;
pub use evidence::{Details, DetectionResult, EvidenceValue, OsVersion, Platform, Verdict};
pub use host::{compose_probe, parse_package_listing, DeviceSnapshot, HostFilesystem};
pub use probe::{SandboxedProbe, SettingsCapableProbe, TrustSignalProbe};
pub use signatures::{SignatureSet, KNOWN_SIGNATURES};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Errors raised while wiring up probes or decoding bridge input. Probe
/// operations themselves never return these; they report failures as
/// evidence instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
