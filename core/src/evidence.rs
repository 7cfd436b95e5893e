//! Verdict and evidence types returned across the bridge
//!
//! Every value here is request-scoped: built fresh by a probe, serialized
//! for the host shell, then dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// EVIDENCE
// ============================================================================

/// Detail key for the aggregate error marker.
pub const ERROR_KEY: &str = "error";

/// A single piece of raw evidence produced by one sub-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvidenceValue {
    Bool(bool),
    Int(i64),
    List(Vec<String>),
    /// The sub-check failed; carries the stringified failure.
    Error { error: String },
}

impl EvidenceValue {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl From<bool> for EvidenceValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<usize> for EvidenceValue {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<Vec<String>> for EvidenceValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Evidence keyed by detail name. Ordered so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Details(BTreeMap<String, EvidenceValue>);

impl Details {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<EvidenceValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Record a degraded sub-check: the field itself carries the error marker
    /// and the aggregate `"error"` entry accumulates every message.
    pub fn insert_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        let aggregate = match self.0.get(ERROR_KEY) {
            Some(EvidenceValue::Error { error }) => format!("{}; {}", error, message),
            _ => message.clone(),
        };
        self.0.insert(key.into(), EvidenceValue::error(message));
        self.0
            .insert(ERROR_KEY.to_string(), EvidenceValue::error(aggregate));
    }

    pub fn get(&self, key: &str) -> Option<&EvidenceValue> {
        self.0.get(key)
    }

    pub fn has_error(&self) -> bool {
        self.0.contains_key(ERROR_KEY)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EvidenceValue)> {
        self.0.iter()
    }
}

// ============================================================================
// PLATFORM
// ============================================================================

/// Which probe variant produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Settings-capable platform: developer flag plus package enumeration
    Android,
    /// Sandboxed platform: filesystem and deep-link heuristics only
    #[serde(rename = "iOS")]
    Ios,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Android => write!(f, "Android"),
            Self::Ios => write!(f, "iOS"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// OS release identifier. Settings-capable platforms report a numeric API
/// level (`null` when the host did not report one), sandboxed ones a dotted
/// version string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsVersion {
    #[serde(rename = "apiLevel")]
    ApiLevel(Option<u32>),
    #[serde(rename = "osVersion")]
    Version(String),
}

impl OsVersion {
    pub fn api_level(&self) -> Option<u32> {
        match self {
            Self::ApiLevel(level) => *level,
            Self::Version(_) => None,
        }
    }
}

impl std::fmt::Display for OsVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiLevel(Some(level)) => write!(f, "API {}", level),
            Self::ApiLevel(None) => write!(f, "API unknown"),
            Self::Version(version) => write!(f, "{}", version),
        }
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of `check_trust_signals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_mock: bool,
    pub details: Details,
    pub platform: Platform,
    #[serde(flatten)]
    pub os_version: OsVersion,
}

/// Outcome of `detect_known_signature_matches`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub detected: bool,
    pub count: usize,
    #[serde(rename = "apps")]
    pub matches: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionResult {
    /// Build a result whose `detected` and `count` agree with `matches`.
    pub fn from_matches(matches: Vec<String>) -> Self {
        Self {
            detected: !matches.is_empty(),
            count: matches.len(),
            matches,
            error: None,
        }
    }

    /// Empty result carrying the reason the lookup could not run.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}
