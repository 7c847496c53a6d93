//! Integration tests for VERSION propagation into runtime display.

use std::fs;

use dashprint_app::{about_info, app_version};

#[test]
fn version_display_tests_matches_root_version_file() {
    let root_version_path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../VERSION");
    let root_version = fs::read_to_string(root_version_path).expect("VERSION should be readable");
    assert_eq!(app_version(), root_version.trim());
}

#[test]
fn version_display_tests_about_dialog_shows_package_metadata() {
    let dialog = about_info().dialog();

    assert_eq!(dialog.title, "About");
    assert_eq!(dialog.message, "Print Dashboard");
    let detail = dialog.detail.expect("about dialog has detail");
    assert!(detail.starts_with(&format!("Version: {}\nAuthor: ", app_version())));
    assert!(detail.contains("\nDescription: Desktop shell hosting the remote print dashboard"));
    assert_eq!(dialog.buttons, vec!["OK".to_string()]);
}
