//! Platform capabilities consumed by the probes
//!
//! Each trait covers one OS query. Host code (or a captured
//! [`DeviceSnapshot`](crate::host::DeviceSnapshot)) provides the
//! implementations; tests substitute mocks.

use crate::evidence::OsVersion;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Failure of a single capability query.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityError {
    /// The platform refuses or lacks the query (e.g. listing not permitted)
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<io::Error> for CapabilityError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::Unsupported => {
                CapabilityError::Unavailable(err.to_string())
            }
            _ => CapabilityError::Io(err.to_string()),
        }
    }
}

/// Result of one sub-check before it is folded into evidence.
pub type CheckOutcome<T> = Result<T, CapabilityError>;

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// Reads developer settings.
pub trait SettingsReader: Send + Sync {
    /// Whether "allow mock locations" is switched on.
    fn mock_location_enabled(&self) -> CheckOutcome<bool>;
}

/// Enumerates installed application identifiers.
pub trait AppLister: Send + Sync {
    fn installed_packages(&self) -> CheckOutcome<Vec<String>>;
}

/// Filesystem existence and write/delete probes.
pub trait FsProber: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    /// Create `path` with `contents`. Fails with `AlreadyExists` instead of
    /// touching a file that is already there.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Resolves deep-link URLs against installed handlers.
pub trait UrlSchemeResolver: Send + Sync {
    fn can_open(&self, url: &str) -> bool;
}

/// OS release and environment facts.
pub trait DeviceInfo: Send + Sync {
    fn os_version(&self) -> OsVersion;

    fn is_simulator(&self) -> bool {
        false
    }
}
