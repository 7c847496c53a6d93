//! Integration tests for transport security URL checks.

mod common;

use common::env;
use dashprint_app::{ConfigError, ShellConfig, bridge_origin_pattern};
use url::Url;

#[test]
fn transport_security_tests_update_feed_must_use_https() {
    let config = ShellConfig::from_lookup(env(&[(
        "DASHPRINT_UPDATE_ENDPOINT",
        "https://updates.example.test/latest.json",
    )]))
    .expect("https feed should load");
    assert_eq!(
        config.update_endpoint.as_ref().map(Url::scheme),
        Some("https")
    );

    for insecure in [
        "http://updates.example.test/latest.json",
        "file:///tmp/latest.json",
    ] {
        let error = ShellConfig::from_lookup(env(&[("DASHPRINT_UPDATE_ENDPOINT", insecure)]))
            .expect_err("non-https feed must be rejected");
        assert!(
            matches!(error, ConfigError::InsecureUrl { .. }),
            "{insecure} gave {error}"
        );
    }
}

#[test]
fn transport_security_tests_bridge_is_scoped_to_dashboard_origin() {
    let dashboard = Url::parse("https://ecw.excelindia.com:8443/svkmprinttest/PrintDashboard")
        .expect("valid dashboard url");
    assert_eq!(
        bridge_origin_pattern(&dashboard),
        "https://ecw.excelindia.com:8443/*"
    );
}
