// Integration tests for signature matching on settings-capable devices
//
// Capabilities are mocked so each test pins exactly which OS queries run and
// what they return. Property tests cover the matching rules.

use mockall::mock;
use proptest::prelude::*;
use std::sync::Arc;
use trustprobe_core::signatures::match_identifiers;
use trustprobe_core::{
    AppLister, CapabilityError, CheckOutcome, DeviceSnapshot, EvidenceValue, ProbeConfig,
    SettingsCapableProbe, SettingsReader, TrustSignalProbe,
};

mock! {
    pub Settings {}
    impl SettingsReader for Settings {
        fn mock_location_enabled(&self) -> CheckOutcome<bool>;
    }
}

mock! {
    pub Lister {}
    impl AppLister for Lister {
        fn installed_packages(&self) -> CheckOutcome<Vec<String>>;
    }
}

fn device() -> Arc<DeviceSnapshot> {
    Arc::new(DeviceSnapshot {
        api_level: Some(33),
        ..DeviceSnapshot::default()
    })
}

fn probe(settings: MockSettings, lister: MockLister) -> SettingsCapableProbe {
    SettingsCapableProbe::new(
        Arc::new(settings),
        Arc::new(lister),
        device(),
        &ProbeConfig::default(),
    )
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_check_queries_each_capability_once() {
    let mut settings = MockSettings::new();
    settings
        .expect_mock_location_enabled()
        .times(1)
        .returning(|| Ok(false));

    let mut lister = MockLister::new();
    lister
        .expect_installed_packages()
        .times(1)
        .returning(|| Ok(owned(&["com.incorporateapps.fakegps.fre", "com.spotify.music"])));

    let verdict = probe(settings, lister).check_trust_signals();
    assert!(verdict.is_mock);
    assert_eq!(verdict.details.get("mockAppCount"), Some(&EvidenceValue::Int(1)));
}

#[test]
fn test_empty_signature_list() {
    let settings = MockSettings::new();
    let mut lister = MockLister::new();
    lister
        .expect_installed_packages()
        .returning(|| Ok(owned(&["com.fakegps.go"])));

    let result = probe(settings, lister).detect_known_signature_matches(&[]);
    assert!(!result.detected);
    assert_eq!(result.count, 0);
    assert!(result.matches.is_empty());
    assert!(result.error.is_none());
}

#[test]
fn test_listing_failure_does_not_touch_settings() {
    let mut settings = MockSettings::new();
    settings.expect_mock_location_enabled().times(0);

    let mut lister = MockLister::new();
    lister
        .expect_installed_packages()
        .returning(|| Err(CapabilityError::Io("package manager died".to_string())));

    let result = probe(settings, lister).detect_known_signature_matches(&owned(&["fakegps"]));
    assert!(!result.detected);
    assert_eq!(result.error.as_deref(), Some("I/O error: package manager died"));
}

#[test]
fn test_sibling_checks_survive_listing_failure() {
    let mut settings = MockSettings::new();
    settings
        .expect_mock_location_enabled()
        .returning(|| Ok(true));

    let mut lister = MockLister::new();
    lister
        .expect_installed_packages()
        .returning(|| Err(CapabilityError::Unavailable("restricted".to_string())));

    let verdict = probe(settings, lister).check_trust_signals();
    assert!(verdict.is_mock);
    assert_eq!(
        verdict.details.get("mockLocationEnabled"),
        Some(&EvidenceValue::Bool(true))
    );
    assert!(verdict.details.get("mockAppCount").unwrap().is_error());
}

proptest! {
    #[test]
    fn prop_substring_in_any_case_matches(
        identifier in "[a-z]{1,8}(\\.[a-z]{1,8}){1,3}",
        start in any::<prop::sample::Index>(),
        len in any::<prop::sample::Index>(),
        upper in any::<bool>(),
    ) {
        let start = start.index(identifier.len());
        let len = 1 + len.index(identifier.len() - start);
        let mut candidate = identifier[start..start + len].to_string();
        if upper {
            candidate = candidate.to_uppercase();
        }

        let installed = vec![identifier.clone()];
        prop_assert_eq!(match_identifiers(&installed, &[candidate.clone()]), installed.clone());
        // Reverse direction: the candidate contains the identifier.
        let wrapped = format!("X{}Y", identifier.to_uppercase());
        prop_assert_eq!(match_identifiers(&installed, &[wrapped]), installed);
    }

    #[test]
    fn prop_detection_counts_agree(
        installed in prop::collection::vec("[a-z.]{0,12}", 0..12),
        candidates in prop::collection::vec("[a-zA-Z.]{0,6}", 0..6),
    ) {
        let snapshot = Arc::new(DeviceSnapshot {
            installed_packages: Some(installed.clone()),
            ..DeviceSnapshot::default()
        });
        let probe = SettingsCapableProbe::new(
            snapshot.clone(),
            snapshot.clone(),
            snapshot,
            &ProbeConfig::default(),
        );

        let result = probe.detect_known_signature_matches(&candidates);
        prop_assert_eq!(result.count, result.matches.len());
        prop_assert_eq!(result.detected, !result.matches.is_empty());
        prop_assert!(result.matches.iter().all(|m| installed.contains(m)));
        if candidates.iter().all(|c| c.is_empty()) {
            prop_assert!(!result.detected);
        }
    }

    #[test]
    fn prop_check_always_produces_verdict(
        flag in proptest::option::of(any::<bool>()),
        packages in proptest::option::of(prop::collection::vec("[a-z.]{1,20}", 0..8)),
        listing_error in proptest::option::of("[a-z ]{1,16}"),
    ) {
        let snapshot = Arc::new(DeviceSnapshot {
            mock_location_enabled: flag,
            installed_packages: packages,
            listing_error,
            ..DeviceSnapshot::default()
        });
        let probe = SettingsCapableProbe::new(
            snapshot.clone(),
            snapshot.clone(),
            snapshot,
            &ProbeConfig::default(),
        );

        let verdict = probe.check_trust_signals();
        prop_assert!(!verdict.details.is_empty());
        if flag == Some(true) {
            prop_assert!(verdict.is_mock);
        }
    }
}
