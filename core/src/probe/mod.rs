//! Trust signal probes
//!
//! One contract, two variants chosen when the host wires up capabilities:
//! - [`SettingsCapableProbe`]: developer settings flag + installed-package scan
//! - [`SandboxedProbe`]: filesystem, write-access and deep-link heuristics
//!
//! Probes never fail outright. Every sub-check yields a
//! [`CheckOutcome`](crate::capability::CheckOutcome) that is folded into the
//! evidence map, so a broken capability degrades one field and nothing else.

pub mod sandboxed;
pub mod scratch;
pub mod settings_capable;

pub use sandboxed::SandboxedProbe;
pub use scratch::ScratchFile;
pub use settings_capable::SettingsCapableProbe;

use crate::capability::CheckOutcome;
use crate::evidence::{Details, DetectionResult, EvidenceValue, Platform, Verdict};

/// A battery of independent heuristic checks for one platform.
pub trait TrustSignalProbe: Send + Sync {
    /// Platform label stamped on every verdict.
    fn platform(&self) -> Platform;

    /// Run every sub-check and aggregate them into a verdict.
    fn check_trust_signals(&self) -> Verdict;

    /// Match installed application identifiers against caller-supplied
    /// signatures. Variants that cannot enumerate applications report
    /// generic elevated-access indicators instead.
    fn detect_known_signature_matches(&self, candidates: &[String]) -> DetectionResult;
}

/// Fold one sub-check into `details`. Returns the value on success; on
/// failure the field becomes an error marker and `None` is returned.
pub(crate) fn record<T>(details: &mut Details, key: &str, outcome: CheckOutcome<T>) -> Option<T>
where
    T: Clone + Into<EvidenceValue>,
{
    match outcome {
        Ok(value) => {
            details.insert(key, value.clone());
            Some(value)
        }
        Err(err) => {
            tracing::warn!("Sub-check {} degraded: {}", key, err);
            details.insert_error(key, err.to_string());
            None
        }
    }
}
