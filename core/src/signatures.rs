//! Known location-spoofing application signatures
//!
//! A signature is a lowercase package-identifier substring. The built-in set
//! is a process-wide static; callers may layer extra signatures on top via
//! [`SignatureSet::with_extra`].

/// Package-name fragments of well-known mock location tools.
static KNOWN_MOCK_APPS: &[&str] = &[
    "com.lexa.fakegps",
    "com.incorporateapps.fakegps.fre",
    "com.fakegps.mocklocation",
    "com.gps joystick",
    "com.location faker",
    "com.mock location",
    "com.fake.gps",
    "com.location.changer",
    "com.gps.emulator",
    "com.location.mockup",
    "com.fakegps.go",
    "com.gpsfaker",
    "com.locationfaker",
    "com.fake.location",
    "com.gps.location.mock",
];

/// Ordered, read-only view over the built-in signatures.
#[derive(Debug, Clone, Copy)]
pub struct KnownSignatureSet {
    entries: &'static [&'static str],
}

/// The built-in signature set.
pub static KNOWN_SIGNATURES: KnownSignatureSet = KnownSignatureSet {
    entries: KNOWN_MOCK_APPS,
};

impl KnownSignatureSet {
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Signatures actually used by a probe: optionally the built-in set plus
/// configured extras, lowercased and deduplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureSet {
    entries: Vec<String>,
}

impl SignatureSet {
    pub fn builtin() -> Self {
        Self::default().with_extra(KNOWN_SIGNATURES.iter())
    }

    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for signature in extra {
            let signature = signature.as_ref().trim().to_lowercase();
            if !signature.is_empty() && !self.entries.contains(&signature) {
                self.entries.push(signature);
            }
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First signature contained in `identifier`, ignoring case.
    pub fn find_in(&self, identifier: &str) -> Option<&str> {
        let identifier = identifier.to_lowercase();
        self.iter().find(|signature| identifier.contains(signature))
    }
}

// ============================================================================
// MATCHING
// ============================================================================

/// Bidirectional case-insensitive containment: either string contains the
/// other. Empty candidates never match.
pub fn matches_candidate(identifier: &str, candidate: &str) -> bool {
    if candidate.is_empty() || identifier.is_empty() {
        return false;
    }
    let identifier = identifier.to_lowercase();
    let candidate = candidate.to_lowercase();
    identifier.contains(&candidate) || candidate.contains(&identifier)
}

/// Installed identifiers matching any candidate, in listing order, each at
/// most once.
pub fn match_identifiers<S: AsRef<str>>(installed: &[String], candidates: &[S]) -> Vec<String> {
    let mut matches: Vec<String> = Vec::new();
    for identifier in installed {
        if matches.contains(identifier) {
            continue;
        }
        if candidates
            .iter()
            .any(|candidate| matches_candidate(identifier, candidate.as_ref()))
        {
            matches.push(identifier.clone());
        }
    }
    matches
}
