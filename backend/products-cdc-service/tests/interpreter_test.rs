//! Interpreter tests against Debezium-shaped fixtures
//!
//! Covers every operation code, the error taxonomy, and decimal prices
//! encoded the way Debezium encodes `NUMERIC` columns.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use products_cdc_service::services::cdc::{
    interpret, interpret_bytes, ExactDecimal, Operation, RowChange, RowKey,
};
use products_cdc_service::CdcError;
use serde_json::{json, Value};

/// base64 of the minimal two's-complement big-endian bytes of `unscaled`
fn encoded(unscaled: i64) -> String {
    ExactDecimal::new(unscaled, 0).to_base64()
}

fn product_event(op: &str, id: i64, name: &str, unscaled: i64, scale: u32) -> Value {
    json!({
        "schema": {"type": "struct", "name": "pgdemo.public.products.Envelope"},
        "payload": {
            "before": null,
            "after": {
                "id": id,
                "name": name,
                "price": {"value": encoded(unscaled), "scale": scale}
            },
            "source": {
                "version": "2.5.0.Final",
                "connector": "postgresql",
                "name": "pgdemo",
                "db": "pgdemo",
                "schema": "public",
                "table": "products"
            },
            "op": op,
            "ts_ms": 1_700_000_000_123i64
        }
    })
}

#[test]
fn test_create_event() {
    let event = interpret(&product_event("c", 1, "Widget", 1050, 2)).unwrap();
    assert_eq!(event.operation(), Operation::Create);
    match &event.change {
        RowChange::Create(row) => {
            assert_eq!(row.id, 1);
            assert_eq!(row.name, "Widget");
            assert_eq!(row.price, 10.50);
            assert_eq!(row.exact_price, Some(ExactDecimal::new(1050, 2)));
        }
        other => panic!("expected create, got {:?}", other),
    }
    assert_eq!(event.table(), Some("products"));
    assert_eq!(event.ts_ms, Some(1_700_000_000_123));
}

#[test]
fn test_update_event() {
    let event = interpret(&product_event("u", 1, "Widget", 999, 2)).unwrap();
    match event.change {
        RowChange::Update(row) => {
            assert_eq!(row.id, 1);
            assert_eq!(row.name, "Widget");
            assert_eq!(row.price, 9.99);
        }
        other => panic!("expected update, got {:?}", other),
    }
}

#[test]
fn test_read_event_is_not_dropped() {
    let event = interpret(&product_event("r", 2, "Gadget", 500, 1)).unwrap();
    match event.change {
        RowChange::Read(row) => {
            assert_eq!(row.id, 2);
            assert_eq!(row.name, "Gadget");
            assert_eq!(row.price, 50.0);
        }
        other => panic!("expected read, got {:?}", other),
    }
}

#[test]
fn test_delete_event_only_carries_id() {
    let doc = json!({"payload": {"op": "d", "before": {"id": 1}, "after": null}});
    let event = interpret(&doc).unwrap();
    assert_eq!(event.change, RowChange::Delete(RowKey { id: 1 }));
    assert!(event.change.row().is_none());
}

#[test]
fn test_delete_ignores_extra_before_columns() {
    // REPLICA IDENTITY FULL sends the whole old row
    let doc = json!({
        "payload": {
            "op": "d",
            "before": {"id": 5, "name": "Old", "price": {"value": "!!", "scale": 2}}
        }
    });
    assert_eq!(
        interpret(&doc).unwrap().change,
        RowChange::Delete(RowKey { id: 5 })
    );
}

#[test]
fn test_negative_price() {
    let event = interpret(&product_event("c", 3, "Refund", -250, 2)).unwrap();
    let row = event.change.row().unwrap();
    assert_eq!(row.price, -2.5);
    assert_eq!(row.exact_price.as_ref().unwrap().to_string(), "-2.50");
}

#[test]
fn test_unknown_operation() {
    let doc = json!({"payload": {"op": "x", "after": {"id": 1}}});
    match interpret(&doc) {
        Err(CdcError::UnknownOperation(code)) => assert_eq!(code, "x"),
        other => panic!("expected UnknownOperation, got {:?}", other),
    }

    // truncate events are not row changes
    let doc = json!({"payload": {"op": "t"}});
    assert!(matches!(interpret(&doc), Err(CdcError::UnknownOperation(_))));
}

#[test]
fn test_missing_payload_is_malformed_event() {
    assert!(matches!(
        interpret(&json!({"schema": {}})),
        Err(CdcError::MalformedEvent(_))
    ));
    assert!(matches!(
        interpret(&json!({"payload": "c"})),
        Err(CdcError::MalformedEvent(_))
    ));
    assert!(matches!(
        interpret(&json!({"payload": null})),
        Err(CdcError::MalformedEvent(_))
    ));
    assert!(matches!(
        interpret(&json!([1, 2, 3])),
        Err(CdcError::MalformedEvent(_))
    ));
}

#[test]
fn test_missing_snapshot() {
    let doc = json!({"payload": {"op": "c", "before": null, "after": null}});
    match interpret(&doc) {
        Err(CdcError::MissingSnapshot { op, field }) => {
            assert_eq!(op, Operation::Create);
            assert_eq!(field, "after");
        }
        other => panic!("expected MissingSnapshot, got {:?}", other),
    }

    let doc = json!({"payload": {"op": "d"}});
    match interpret(&doc) {
        Err(CdcError::MissingSnapshot { op, field }) => {
            assert_eq!(op, Operation::Delete);
            assert_eq!(field, "before");
        }
        other => panic!("expected MissingSnapshot, got {:?}", other),
    }
}

#[test]
fn test_malformed_fields() {
    let cases = [
        (json!({"id": "one", "name": "Widget", "price": {"value": "BBo=", "scale": 2}}), "id"),
        (json!({"name": "Widget", "price": {"value": "BBo=", "scale": 2}}), "id"),
        (json!({"id": 1, "name": 42, "price": {"value": "BBo=", "scale": 2}}), "name"),
        (json!({"id": 1, "name": "Widget", "price": 10.5}), "price"),
        (json!({"id": 1, "name": "Widget", "price": {"value": "BBo="}}), "price"),
        (json!({"id": 1, "name": "Widget", "price": {"value": "BBo=", "scale": -2}}), "price"),
        (json!({"id": 1, "name": "Widget", "price": {"value": "BBo=", "scale": 2.5}}), "price"),
        (json!({"id": 1, "name": "Widget"}), "price"),
    ];

    for (after, expected_field) in cases {
        let doc = json!({"payload": {"op": "u", "after": after}});
        match interpret(&doc) {
            Err(CdcError::MalformedField { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected MalformedField({}), got {:?}", expected_field, other),
        }
    }
}

#[test]
fn test_integral_float_scale_and_id_are_coerced() {
    let doc = json!({
        "payload": {
            "op": "r",
            "after": {"id": 7.0, "name": "Widget", "price": {"value": "BBo=", "scale": 2.0}}
        }
    });
    let event = interpret(&doc).unwrap();
    let row = event.change.row().unwrap();
    assert_eq!(row.id, 7);
    assert_eq!(row.price, 10.5);
    assert_eq!(row.exact_price.as_ref().unwrap().to_string(), "10.50");
}

#[test]
fn test_price_scale_past_f64_range_is_zero() {
    let doc = json!({
        "payload": {
            "op": "c",
            "after": {"id": 8, "name": "Dust", "price": {"value": "AQ==", "scale": 65_536}}
        }
    });
    let event = interpret(&doc).unwrap();
    let row = event.change.row().unwrap();
    assert_eq!(row.price, 0.0);
    assert!(row.exact_price.is_some());
}

#[test]
fn test_undecodable_price_keeps_id_and_name() {
    let doc = json!({
        "payload": {
            "op": "c",
            "after": {"id": 9, "name": "Widget", "price": {"value": "not-base64!", "scale": 2}}
        }
    });
    let event = interpret(&doc).unwrap();
    let row = event.change.row().unwrap();
    assert_eq!(row.id, 9);
    assert_eq!(row.name, "Widget");
    assert_eq!(row.price, 0.0);
    assert!(row.exact_price.is_none());
}

#[test]
fn test_interpret_bytes() {
    let body = serde_json::to_vec(&product_event("c", 1, "Widget", 1050, 2)).unwrap();
    assert_eq!(interpret_bytes(&body).unwrap().id(), 1);

    assert!(matches!(
        interpret_bytes(b"Widget,10.50"),
        Err(CdcError::InvalidJson(_))
    ));
}

#[test]
fn test_fixture_encoding_matches_debezium() {
    // Debezium emits 10.50 with scale 2 as "BBo="
    assert_eq!(encoded(1050), "BBo=");
    assert_eq!(STANDARD.decode("BBo=").unwrap(), vec![0x04u8, 0x1A]);
}
