//! Validates contract fixtures and wire values against frozen JSON schemas.

use dashprint_contract_tests::{compile_validator, fixture_items};
use dashprint_core::{BridgeMessage, PrinterTarget};

const BRIDGE_SCHEMA: &str = "bridge-message.schema.json";

#[test]
fn bridge_fixtures_match_schema() {
    let validator = compile_validator(BRIDGE_SCHEMA);
    for fixture in fixture_items("fixtures/bridge-messages.valid.json") {
        assert!(
            validator.is_valid(&fixture),
            "bridge fixture should validate: {fixture}"
        );
    }
}

#[test]
fn bridge_rejects_malformed_messages() {
    let validator = compile_validator(BRIDGE_SCHEMA);
    for fixture in fixture_items("fixtures/bridge-messages.invalid.json") {
        assert!(
            !validator.is_valid(&fixture),
            "bridge fixture should be rejected: {fixture}"
        );
    }
}

#[test]
fn serialized_bridge_messages_match_schema() {
    let validator = compile_validator(BRIDGE_SCHEMA);
    let messages = [
        BridgeMessage::Print {
            printer: PrinterTarget::named("HP-LaserJet"),
        },
        BridgeMessage::PrintHtmlContent {
            html: "<p>Invoice</p>".to_string(),
            printer: PrinterTarget::system_default(),
        },
        BridgeMessage::PrintBytes {
            bytes: vec![0, 128, 255],
            printer: PrinterTarget::named("Zebra-ZD420"),
        },
    ];

    for message in messages {
        let value = serde_json::to_value(&message).expect("message should serialize");
        assert!(
            validator.is_valid(&value),
            "serialized {} message should validate: {value}",
            message.channel()
        );
    }
}

#[test]
fn bridge_fixtures_decode_into_messages() {
    for fixture in fixture_items("fixtures/bridge-messages.valid.json") {
        let raw = serde_json::to_vec(&fixture).expect("fixture should encode");
        let message = BridgeMessage::from_json_bytes(&raw).expect("fixture should decode");
        assert_eq!(fixture["channel"], message.channel());
    }
}
